//! Browser host for Larder.
//!
//! [`WebDocument`] implements [`HostDocument`] over the page's DOM through
//! `web-sys`. It keeps its own mirror of the node tree it manages, so tree
//! queries made by the reconciler never cross into JavaScript; only the
//! mutations and live form state do.

use indexmap::IndexMap;
use larder_core::{
    Event, EventHandler, HostDocument, HostError, NodeId, RenderError, Runtime, ScrollOffset,
    Selection, VNode,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};

/// Expando property carrying a node's id on the JavaScript side.
const NODE_ID_PROPERTY: &str = "__larderNodeId";

fn platform_error(err: JsValue) -> HostError {
    HostError::Platform {
        message: err
            .as_string()
            .unwrap_or_else(|| format!("{err:?}")),
    }
}

/// Reads the id stamped on a DOM node by [`WebDocument`].
fn stamped_id(node: &JsValue) -> Option<NodeId> {
    js_sys::Reflect::get(node, &JsValue::from_str(NODE_ID_PROPERTY))
        .ok()?
        .as_f64()
        .map(|id| id as NodeId)
}

type Listener = Closure<dyn FnMut(web_sys::Event)>;

struct WebNode {
    node: web_sys::Node,
    /// Lowercase tag, `None` for text.
    tag: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listeners: IndexMap<String, Listener>,
}

/// Value, checked state and caret of whichever form control `node` is.
enum Control<'a> {
    Input(&'a HtmlInputElement),
    TextArea(&'a HtmlTextAreaElement),
    Select(&'a HtmlSelectElement),
}

impl<'a> Control<'a> {
    fn of(node: &'a web_sys::Node) -> Option<Self> {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            Some(Control::Input(input))
        } else if let Some(area) = node.dyn_ref::<HtmlTextAreaElement>() {
            Some(Control::TextArea(area))
        } else {
            node.dyn_ref::<HtmlSelectElement>().map(Control::Select)
        }
    }

    fn value(&self) -> String {
        match self {
            Control::Input(input) => input.value(),
            Control::TextArea(area) => area.value(),
            Control::Select(select) => select.value(),
        }
    }

    fn set_value(&self, value: &str) {
        match self {
            Control::Input(input) => input.set_value(value),
            Control::TextArea(area) => area.set_value(value),
            Control::Select(select) => select.set_value(value),
        }
    }

    fn selection(&self) -> Option<Selection> {
        let (start, end) = match self {
            Control::Input(input) => (input.selection_start(), input.selection_end()),
            Control::TextArea(area) => (area.selection_start(), area.selection_end()),
            Control::Select(_) => return None,
        };
        Some(Selection::new(start.ok()??, end.ok()??))
    }

    fn set_selection(&self, selection: Selection) -> Result<(), JsValue> {
        match self {
            Control::Input(input) => input.set_selection_range(selection.start, selection.end),
            Control::TextArea(area) => area.set_selection_range(selection.start, selection.end),
            Control::Select(_) => Ok(()),
        }
    }
}

/// Translates a DOM event into the engine's event for the listener on
/// `current`.
fn translate(event: &web_sys::Event, current: NodeId) -> Event {
    let target = event.target();
    let target_id = target
        .as_ref()
        .and_then(|target| stamped_id(target.as_ref()))
        .unwrap_or(current);
    let mut translated = Event::new(event.type_(), target_id);
    translated.set_current_target(current);
    if let Some(node) = target.as_ref().and_then(|target| target.dyn_ref::<web_sys::Node>()) {
        if let Some(control) = Control::of(node) {
            translated = translated.with_value(control.value());
        }
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            translated = translated.with_checked(input.checked());
        }
    }
    if let Some(keyboard) = event.dyn_ref::<web_sys::KeyboardEvent>() {
        translated = translated.with_key(keyboard.key());
    }
    translated
}

/// [`HostDocument`] over the browser DOM.
pub struct WebDocument {
    document: web_sys::Document,
    nodes: Vec<Option<WebNode>>,
}

impl WebDocument {
    /// Host over the current window's document.
    pub fn new() -> Result<Self, HostError> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| HostError::Platform {
                message: "no document on the global window".to_string(),
            })?;
        Ok(Self::from_document(document))
    }

    pub fn from_document(document: web_sys::Document) -> Self {
        Self {
            document,
            nodes: Vec::new(),
        }
    }

    /// Registers the element with the given id as a container. Its existing
    /// children are registered too, so a first mount can clear them.
    pub fn mount_point(&mut self, element_id: &str) -> Result<NodeId, HostError> {
        let element = self
            .document
            .get_element_by_id(element_id)
            .ok_or_else(|| HostError::Platform {
                message: format!("no element with id {element_id:?}"),
            })?;
        let container = self.adopt(element.into(), None)?;
        let mut child = self
            .slot(container)?
            .node
            .first_child();
        while let Some(node) = child {
            child = node.next_sibling();
            let id = self.adopt(node, Some(container))?;
            self.slot_mut(container)?.children.push(id);
        }
        Ok(container)
    }

    fn adopt(&mut self, node: web_sys::Node, parent: Option<NodeId>) -> Result<NodeId, HostError> {
        let id = self.nodes.len();
        js_sys::Reflect::set(
            node.as_ref(),
            &JsValue::from_str(NODE_ID_PROPERTY),
            &JsValue::from_f64(id as f64),
        )
        .map_err(platform_error)?;
        let tag = node
            .dyn_ref::<web_sys::Element>()
            .map(|element| element.local_name());
        self.nodes.push(Some(WebNode {
            node,
            tag,
            parent,
            children: Vec::new(),
            listeners: IndexMap::new(),
        }));
        Ok(id)
    }

    fn slot(&self, id: NodeId) -> Result<&WebNode, HostError> {
        self.nodes
            .get(id)
            .and_then(Option::as_ref)
            .ok_or(HostError::Missing { id })
    }

    fn slot_mut(&mut self, id: NodeId) -> Result<&mut WebNode, HostError> {
        self.nodes
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or(HostError::Missing { id })
    }

    fn element(&self, id: NodeId) -> Result<&web_sys::Element, HostError> {
        self.slot(id)?
            .node
            .dyn_ref::<web_sys::Element>()
            .ok_or(HostError::NotAnElement { id })
    }

    fn html_element(&self, id: NodeId) -> Result<&HtmlElement, HostError> {
        self.slot(id)?
            .node
            .dyn_ref::<HtmlElement>()
            .ok_or(HostError::NotAnElement { id })
    }

    fn control(&self, id: NodeId) -> Option<Control<'_>> {
        Control::of(&self.slot(id).ok()?.node)
    }

    fn detach(&mut self, child: NodeId) -> Result<(), HostError> {
        if let Some(parent) = self.slot(child)?.parent {
            self.slot_mut(parent)?.children.retain(|&c| c != child);
            self.slot_mut(child)?.parent = None;
        }
        Ok(())
    }

    /// Forgets `root` and its subtree, unhooking every listener.
    fn free(&mut self, root: NodeId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(slot) = self.nodes.get_mut(id).and_then(Option::take) else {
                continue;
            };
            for (event, listener) in &slot.listeners {
                if let Err(err) = slot.node.remove_event_listener_with_callback(
                    event,
                    listener.as_ref().unchecked_ref(),
                ) {
                    log::debug!("failed to unhook {event} on node {id}: {err:?}");
                }
            }
            stack.extend(slot.children);
        }
    }
}

impl HostDocument for WebDocument {
    fn create_element(&mut self, tag: &str) -> Result<NodeId, HostError> {
        let element = self
            .document
            .create_element(tag)
            .map_err(|_| HostError::InvalidTag {
                tag: tag.to_string(),
            })?;
        self.adopt(element.into(), None)
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        let node: web_sys::Node = self.document.create_text_node(text).into();
        let id = self.nodes.len();
        if let Err(err) = js_sys::Reflect::set(
            node.as_ref(),
            &JsValue::from_str(NODE_ID_PROPERTY),
            &JsValue::from_f64(id as f64),
        ) {
            log::debug!("text node {id} left unstamped: {err:?}");
        }
        self.nodes.push(Some(WebNode {
            node,
            tag: None,
            parent: None,
            children: Vec::new(),
            listeners: IndexMap::new(),
        }));
        id
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.slot(node).ok()?.tag.clone()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.slot(node).ok()?.parent
    }

    fn child_nodes(&self, parent: NodeId) -> Vec<NodeId> {
        self.slot(parent)
            .map(|slot| slot.children.clone())
            .unwrap_or_default()
    }

    fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.slot(parent).ok()?.children.get(index).copied()
    }

    fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), HostError> {
        self.element(parent)?;
        if self.contains(child, parent) {
            return Err(HostError::Platform {
                message: format!("inserting node {child} into node {parent} would create a cycle"),
            });
        }
        let reference = self.slot(parent)?.children.get(index).copied();
        if reference == Some(child) {
            return Ok(());
        }
        let reference_node = match reference {
            Some(id) => Some(self.slot(id)?.node.clone()),
            None => None,
        };
        self.slot(parent)?
            .node
            .insert_before(&self.slot(child)?.node, reference_node.as_ref())
            .map_err(platform_error)?;

        self.detach(child)?;
        let siblings = &mut self.slot_mut(parent)?.children;
        let position = reference
            .and_then(|r| siblings.iter().position(|&c| c == r))
            .unwrap_or(siblings.len());
        siblings.insert(position, child);
        self.slot_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> Result<(), HostError> {
        if new_child == old_child {
            return Ok(());
        }
        if self.slot(old_child)?.parent != Some(parent) {
            return Err(HostError::NotAChild {
                parent,
                child: old_child,
            });
        }
        self.slot(parent)?
            .node
            .replace_child(&self.slot(new_child)?.node, &self.slot(old_child)?.node)
            .map_err(platform_error)?;

        self.detach(new_child)?;
        let siblings = &mut self.slot_mut(parent)?.children;
        if let Some(position) = siblings.iter().position(|&c| c == old_child) {
            siblings[position] = new_child;
        }
        self.slot_mut(new_child)?.parent = Some(parent);
        self.free(old_child);
        Ok(())
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        if self.slot(child)?.parent != Some(parent) {
            return Err(HostError::NotAChild { parent, child });
        }
        self.slot(parent)?
            .node
            .remove_child(&self.slot(child)?.node)
            .map_err(platform_error)?;
        self.detach(child)?;
        self.free(child);
        Ok(())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node).ok()?.get_attribute(name)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), HostError> {
        self.element(node)?
            .set_attribute(name, value)
            .map_err(platform_error)
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), HostError> {
        self.element(node)?
            .remove_attribute(name)
            .map_err(platform_error)
    }

    fn set_style_property(
        &mut self,
        node: NodeId,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), HostError> {
        let style = self.html_element(node)?.style();
        match value {
            Some(value) => style.set_property(name, value),
            None => style.remove_property(name).map(|_| ()),
        }
        .map_err(platform_error)
    }

    fn set_style_text(&mut self, node: NodeId, text: &str) -> Result<(), HostError> {
        self.set_attribute(node, "style", text)
    }

    fn set_class_name(&mut self, node: NodeId, class_name: &str) -> Result<(), HostError> {
        let element = self.element(node)?;
        if class_name.is_empty() {
            element.remove_attribute("class").map_err(platform_error)
        } else {
            element.set_class_name(class_name);
            Ok(())
        }
    }

    fn value(&self, node: NodeId) -> Option<String> {
        self.control(node).map(|control| control.value())
    }

    fn set_value(&mut self, node: NodeId, value: &str) -> Result<(), HostError> {
        match self.control(node) {
            Some(control) => {
                control.set_value(value);
                Ok(())
            }
            None => self.set_attribute(node, "value", value),
        }
    }

    fn checked(&self, node: NodeId) -> Option<bool> {
        self.slot(node)
            .ok()?
            .node
            .dyn_ref::<HtmlInputElement>()
            .map(HtmlInputElement::checked)
    }

    fn set_checked(&mut self, node: NodeId, checked: bool) -> Result<(), HostError> {
        let slot = self.slot(node)?;
        let input = slot
            .node
            .dyn_ref::<HtmlInputElement>()
            .ok_or(HostError::NotAnElement { id: node })?;
        input.set_checked(checked);
        Ok(())
    }

    fn set_listener(
        &mut self,
        node: NodeId,
        event: &str,
        handler: Option<EventHandler>,
    ) -> Result<(), HostError> {
        let slot = self.slot_mut(node)?;
        if let Some(previous) = slot.listeners.shift_remove(event) {
            slot.node
                .remove_event_listener_with_callback(
                    event,
                    previous.as_ref().unchecked_ref(),
                )
                .map_err(platform_error)?;
        }
        let Some(handler) = handler else {
            return Ok(());
        };
        let closure = Closure::wrap(Box::new(move |dom_event: web_sys::Event| {
            let translated = translate(&dom_event, node);
            if let Err(err) = handler.call(&translated) {
                log::error!("{} listener on node {node} failed: {err}", translated.name());
            }
            if translated.default_prevented() {
                dom_event.prevent_default();
            }
            if translated.propagation_stopped() {
                dom_event.stop_propagation();
            }
        }) as Box<dyn FnMut(web_sys::Event)>);
        slot.node
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(platform_error)?;
        slot.listeners.insert(event.to_string(), closure);
        Ok(())
    }

    fn focused(&self) -> Option<NodeId> {
        let active = self.document.active_element()?;
        let id = stamped_id(active.as_ref())?;
        self.slot(id).ok().map(|_| id)
    }

    fn focus(&mut self, node: NodeId) -> Result<(), HostError> {
        self.html_element(node)?.focus().map_err(platform_error)
    }

    fn selection(&self, node: NodeId) -> Option<Selection> {
        self.control(node)?.selection()
    }

    fn set_selection(&mut self, node: NodeId, selection: Selection) -> Result<(), HostError> {
        match self.control(node) {
            Some(control) => control.set_selection(selection).map_err(platform_error),
            None => Err(HostError::NotAnElement { id: node }),
        }
    }

    fn scroll_offset(&self, node: NodeId) -> Option<ScrollOffset> {
        let element = self.element(node).ok()?;
        Some(ScrollOffset::new(element.scroll_top(), element.scroll_left()))
    }

    fn set_scroll_offset(
        &mut self,
        node: NodeId,
        offset: ScrollOffset,
    ) -> Result<(), HostError> {
        let element = self.element(node)?;
        element.set_scroll_top(offset.top);
        element.set_scroll_left(offset.left);
        Ok(())
    }
}

/// Renders `description` into the element with id `element_id` and hands
/// back the runtime, which must be kept alive for the page to stay
/// interactive.
pub fn start(
    element_id: &str,
    description: impl Into<VNode>,
) -> Result<Runtime<WebDocument>, RenderError> {
    let mut document = WebDocument::new()?;
    let container = document.mount_point(element_id)?;
    let runtime = Runtime::new(document);
    log::debug!("mounting into #{element_id} (node {container})");
    runtime.render(description, container)?;
    Ok(runtime)
}
