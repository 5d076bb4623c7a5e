//! Mount and patch of description trees against the host document.
//!
//! [`Mounted`] mirrors what is live: one record per description node, each
//! holding the host node it produced. Component records also keep their
//! [`Instance`], so instances are found by walking the mirror rather than by
//! tagging host nodes.

use std::rc::Rc;

use crate::apply::apply_props;
use crate::collections::map::{HashMap, HashSet};
use crate::element::{Element, Kind, VNode};
use crate::error::HostError;
use crate::hooks::PendingEffect;
use crate::host::HostDocument;
use crate::instance::{Instance, InstanceHandle};
use crate::props::{PropValue, REF};
use crate::runtime::RootHandle;
use crate::{Key, NodeId};

pub(crate) enum Mounted {
    /// Text node. `value` is `VNode::Empty` or `VNode::Text`.
    Text { node: NodeId, value: VNode },
    Element {
        node: NodeId,
        element: Rc<Element>,
        children: Vec<Mounted>,
    },
    Component {
        element: Rc<Element>,
        instance: Rc<Instance>,
        child: Box<Mounted>,
    },
}

impl Mounted {
    /// Host node this record renders to. Components resolve to their
    /// rendered child.
    pub(crate) fn node(&self) -> NodeId {
        match self {
            Mounted::Text { node, .. } | Mounted::Element { node, .. } => *node,
            Mounted::Component { child, .. } => child.node(),
        }
    }

    fn key(&self) -> Option<Key> {
        match self {
            Mounted::Text { .. } => None,
            Mounted::Element { element, .. } | Mounted::Component { element, .. } => {
                element.key()
            }
        }
    }

    fn is_compatible(&self, next: &VNode) -> bool {
        match (self, next) {
            (Mounted::Text { value, .. }, next) => value.is_compatible(next),
            (
                Mounted::Element { element, .. } | Mounted::Component { element, .. },
                VNode::Element(next),
            ) => element.kind() == next.kind(),
            _ => false,
        }
    }

    /// Component instances in this subtree, parents before children.
    pub(crate) fn collect_instances(&self, out: &mut Vec<InstanceHandle>) {
        match self {
            Mounted::Text { .. } => {}
            Mounted::Element { children, .. } => {
                for child in children {
                    child.collect_instances(out);
                }
            }
            Mounted::Component {
                instance, child, ..
            } => {
                out.push(InstanceHandle(Rc::clone(instance)));
                child.collect_instances(out);
            }
        }
    }

    pub(crate) fn instance(&self) -> Option<InstanceHandle> {
        match self {
            Mounted::Component { instance, .. } => Some(InstanceHandle(Rc::clone(instance))),
            _ => None,
        }
    }
}

/// Runs every effect cleanup under `mounted`, children before parents, and
/// clears the refs bound to its nodes. Host nodes are left to the caller.
pub(crate) fn release(mounted: Mounted) {
    match mounted {
        Mounted::Text { .. } => {}
        Mounted::Element {
            node,
            element,
            children,
        } => {
            for child in children {
                release(child);
            }
            if let Some(PropValue::Ref(node_ref)) = element.props().get(REF) {
                node_ref.release(node);
            }
        }
        Mounted::Component {
            instance, child, ..
        } => {
            release(*child);
            instance.dispose();
        }
    }
}

/// Keys are used only when every child on both sides carries one and
/// neither side repeats a key.
fn keyed_children(old: &[Mounted], next: &[VNode]) -> bool {
    fn unique(keys: impl Iterator<Item = Option<Key>>) -> bool {
        let mut seen = HashSet::default();
        for key in keys {
            match key {
                Some(key) if seen.insert(key) => {}
                _ => return false,
            }
        }
        true
    }
    !next.is_empty() && unique(old.iter().map(Mounted::key)) && unique(next.iter().map(VNode::key))
}

pub(crate) struct Reconciler<'a, D: HostDocument + ?Sized> {
    document: &'a mut D,
    root: &'a RootHandle,
    effects: &'a mut Vec<PendingEffect>,
}

impl<'a, D: HostDocument + ?Sized> Reconciler<'a, D> {
    pub(crate) fn new(
        document: &'a mut D,
        root: &'a RootHandle,
        effects: &'a mut Vec<PendingEffect>,
    ) -> Self {
        Self {
            document,
            root,
            effects,
        }
    }

    pub(crate) fn document(&mut self) -> &mut D {
        &mut *self.document
    }

    pub(crate) fn mount(&mut self, description: &VNode) -> Result<Mounted, HostError> {
        let element = match description {
            VNode::Empty => {
                return Ok(Mounted::Text {
                    node: self.document.create_text(""),
                    value: VNode::Empty,
                })
            }
            VNode::Text(text) => {
                return Ok(Mounted::Text {
                    node: self.document.create_text(&text.to_string()),
                    value: description.clone(),
                })
            }
            VNode::Element(element) => element,
        };
        match element.kind() {
            Kind::Component(component) => {
                let instance = Instance::new(component.clone(), self.root.container());
                log::trace!("mounting component {}", component.name());
                let output = instance.render(element.props(), self.root, self.effects);
                let child = self.mount(&output)?;
                Ok(Mounted::Component {
                    element: Rc::clone(element),
                    instance,
                    child: Box::new(child),
                })
            }
            Kind::Tag(tag) => {
                let node = self.document.create_element(tag)?;
                apply_props(self.document, node, tag, None, element.props())?;
                let mut children = Vec::with_capacity(element.children().len());
                for child in element.children() {
                    let mounted = self.mount(child)?;
                    self.document.append_child(node, mounted.node())?;
                    children.push(mounted);
                }
                self.sync_select_value(node, element)?;
                Ok(Mounted::Element {
                    node,
                    element: Rc::clone(element),
                    children,
                })
            }
        }
    }

    /// Returns the record for `next`, reusing `previous` where compatible.
    /// When the resulting node differs from the previous one the caller
    /// swaps it into the parent.
    pub(crate) fn patch(&mut self, previous: Mounted, next: &VNode) -> Result<Mounted, HostError> {
        if !previous.is_compatible(next) {
            log::trace!("node {} replaced by an incompatible description", previous.node());
            let mounted = self.mount(next)?;
            release(previous);
            return Ok(mounted);
        }
        let VNode::Element(element) = next else {
            return Ok(previous);
        };
        match previous {
            Mounted::Component {
                instance, child, ..
            } => {
                let output = instance.render(element.props(), self.root, self.effects);
                let child = self.patch(*child, &output)?;
                Ok(Mounted::Component {
                    element: Rc::clone(element),
                    instance,
                    child: Box::new(child),
                })
            }
            Mounted::Element {
                node,
                element: old,
                children,
            } => {
                let tag = element.kind().tag().unwrap_or_default();
                apply_props(self.document, node, tag, Some(old.props()), element.props())?;
                let children = self.reconcile_children(node, children, element.children())?;
                self.sync_select_value(node, element)?;
                Ok(Mounted::Element {
                    node,
                    element: Rc::clone(element),
                    children,
                })
            }
            text @ Mounted::Text { .. } => Ok(text),
        }
    }

    /// A select only accepts a value once the matching option exists, so
    /// its value is written again after the children are in place.
    fn sync_select_value(&mut self, node: NodeId, element: &Element) -> Result<(), HostError> {
        if element.kind().tag() != Some("select") {
            return Ok(());
        }
        let Some(value) = element.props().get("value") else {
            return Ok(());
        };
        let value = value.attribute_text().unwrap_or_default();
        if self.document.value(node).as_deref() != Some(value.as_str()) {
            self.document.set_value(node, &value)?;
        }
        Ok(())
    }

    fn reconcile_children(
        &mut self,
        parent: NodeId,
        old: Vec<Mounted>,
        next: &[VNode],
    ) -> Result<Vec<Mounted>, HostError> {
        if keyed_children(&old, next) {
            return self.reconcile_keyed(parent, old, next);
        }
        let mut old = old.into_iter();
        let mut out = Vec::with_capacity(next.len());
        for (index, child) in next.iter().enumerate() {
            let mounted = match old.next() {
                Some(previous) => self.patch_in_place(parent, previous, child)?,
                None => {
                    let mounted = self.mount(child)?;
                    self.document.insert_child(parent, index, mounted.node())?;
                    mounted
                }
            };
            out.push(mounted);
        }
        for leftover in old {
            self.remove(parent, leftover)?;
        }
        Ok(out)
    }

    fn reconcile_keyed(
        &mut self,
        parent: NodeId,
        old: Vec<Mounted>,
        next: &[VNode],
    ) -> Result<Vec<Mounted>, HostError> {
        let order: Vec<Key> = old.iter().filter_map(Mounted::key).collect();
        let mut by_key: HashMap<Key, Mounted> = HashMap::default();
        for mounted in old {
            if let Some(key) = mounted.key() {
                by_key.insert(key, mounted);
            }
        }
        let mut out = Vec::with_capacity(next.len());
        for (index, child) in next.iter().enumerate() {
            let mounted = match child.key().and_then(|key| by_key.remove(&key)) {
                Some(previous) => self.patch_in_place(parent, previous, child)?,
                None => self.mount(child)?,
            };
            if self.document.child_at(parent, index) != Some(mounted.node()) {
                log::trace!("keyed child node {} placed at {index}", mounted.node());
                self.document.insert_child(parent, index, mounted.node())?;
            }
            out.push(mounted);
        }
        for key in order {
            if let Some(leftover) = by_key.remove(&key) {
                self.remove(parent, leftover)?;
            }
        }
        Ok(out)
    }

    fn patch_in_place(
        &mut self,
        parent: NodeId,
        previous: Mounted,
        next: &VNode,
    ) -> Result<Mounted, HostError> {
        let before = previous.node();
        let patched = self.patch(previous, next)?;
        if patched.node() != before {
            self.document.replace_child(parent, patched.node(), before)?;
        }
        Ok(patched)
    }

    fn remove(&mut self, parent: NodeId, mounted: Mounted) -> Result<(), HostError> {
        let node = mounted.node();
        release(mounted);
        self.document.remove_child(parent, node)
    }
}

#[cfg(test)]
#[path = "tests/reconcile_tests.rs"]
mod tests;
