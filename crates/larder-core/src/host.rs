//! The live document tree the engine mutates.
//!
//! The reconciler never talks to a concrete DOM. Everything it needs from the
//! environment goes through [`HostDocument`], which addresses nodes by
//! [`NodeId`]. `MemoryDocument` is the headless implementation used by tests
//! and native tools; the web platform crate provides one over `web-sys`.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::error::{EventResult, HostError};
use crate::NodeId;

/// Vertical and horizontal scroll position of an element, in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrollOffset {
    pub top: i32,
    pub left: i32,
}

impl ScrollOffset {
    pub fn new(top: i32, left: i32) -> Self {
        Self { top, left }
    }
}

/// Caret or selection range inside a text control, as UTF-16 offsets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub start: u32,
    pub end: u32,
}

impl Selection {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn caret(at: u32) -> Self {
        Self { start: at, end: at }
    }

    pub fn clamp(self, len: u32) -> Self {
        Self {
            start: self.start.min(len),
            end: self.end.min(len),
        }
    }
}

/// Returns true for elements whose live `value` the engine must guard.
pub fn is_form_control(tag: &str) -> bool {
    matches!(tag, "input" | "textarea" | "select")
}

/// Event delivered to a listener installed through an `on<Name>` property.
#[derive(Debug)]
pub struct Event {
    name: String,
    target: NodeId,
    current_target: Cell<NodeId>,
    value: Option<String>,
    checked: Option<bool>,
    key: Option<String>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl Event {
    pub fn new(name: impl Into<String>, target: NodeId) -> Self {
        Self {
            name: name.into(),
            target,
            current_target: Cell::new(target),
            value: None,
            checked: None,
            key: None,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    /// Live value of the target control at dispatch time.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    /// Keyboard key for `keydown`/`keyup` events.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Node whose listener is currently running.
    pub fn current_target(&self) -> NodeId {
        self.current_target.get()
    }

    pub fn set_current_target(&self, node: NodeId) {
        self.current_target.set(node);
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn checked(&self) -> Option<bool> {
        self.checked
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

/// Shared event listener. Two handlers are the same listener only when they
/// share the same allocation.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event) -> EventResult>);

impl EventHandler {
    pub fn new(handler: impl Fn(&Event) -> EventResult + 'static) -> Self {
        Self(Rc::new(handler))
    }

    pub fn call(&self, event: &Event) -> EventResult {
        (self.0)(event)
    }

    pub fn ptr_eq(&self, other: &EventHandler) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// Operations the engine performs on the live document.
///
/// Node ids are allocated by the host. Insertion of a node that is already
/// attached moves it, like DOM `insertBefore`. Removal detaches the node and
/// releases its subtree.
pub trait HostDocument {
    fn create_element(&mut self, tag: &str) -> Result<NodeId, HostError>;
    fn create_text(&mut self, text: &str) -> NodeId;

    /// Lowercase tag name, `None` for text nodes.
    fn tag_name(&self, node: NodeId) -> Option<String>;
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn child_nodes(&self, parent: NodeId) -> Vec<NodeId>;

    fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.child_nodes(parent).get(index).copied()
    }

    /// Inserts `child` before the node currently at `index`, or appends when
    /// `index` is past the end.
    fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId)
        -> Result<(), HostError>;

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        self.insert_child(parent, usize::MAX, child)
    }

    fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> Result<(), HostError>;
    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), HostError>;
    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), HostError>;

    /// Sets one inline style property; `None` removes it.
    fn set_style_property(
        &mut self,
        node: NodeId,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), HostError>;
    /// Replaces the whole inline style declaration.
    fn set_style_text(&mut self, node: NodeId, text: &str) -> Result<(), HostError>;
    fn set_class_name(&mut self, node: NodeId, class_name: &str) -> Result<(), HostError>;

    fn value(&self, node: NodeId) -> Option<String>;
    fn set_value(&mut self, node: NodeId, value: &str) -> Result<(), HostError>;
    fn checked(&self, node: NodeId) -> Option<bool>;
    fn set_checked(&mut self, node: NodeId, checked: bool) -> Result<(), HostError>;

    /// Installs or removes the listener for `event` on `node`.
    fn set_listener(
        &mut self,
        node: NodeId,
        event: &str,
        handler: Option<EventHandler>,
    ) -> Result<(), HostError>;

    fn focused(&self) -> Option<NodeId>;
    fn focus(&mut self, node: NodeId) -> Result<(), HostError>;
    fn selection(&self, node: NodeId) -> Option<Selection>;
    fn set_selection(&mut self, node: NodeId, selection: Selection) -> Result<(), HostError>;
    fn scroll_offset(&self, node: NodeId) -> Option<ScrollOffset>;
    fn set_scroll_offset(&mut self, node: NodeId, offset: ScrollOffset)
        -> Result<(), HostError>;

    /// True when `node` is `ancestor` or lies inside it.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// First element under `root` (depth-first, root excluded) whose
    /// attribute `name` equals `value`.
    fn find_by_attribute(&self, root: NodeId, name: &str, value: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.child_nodes(root).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if self.attribute(node, name).as_deref() == Some(value) {
                return Some(node);
            }
            stack.extend(self.child_nodes(node).into_iter().rev());
        }
        None
    }

    /// Every element under `root` carrying attribute `name`, in document order.
    fn elements_with_attribute(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.child_nodes(root).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if self.attribute(node, name).is_some() {
                found.push(node);
            }
            stack.extend(self.child_nodes(node).into_iter().rev());
        }
        found
    }
}
