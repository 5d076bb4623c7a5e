//! Headless [`HostDocument`] backed by a node arena.
//!
//! Besides the trait it exposes what a browser user would do (typing into a
//! field, ticking a checkbox, scrolling) and counts every write the engine
//! performs, so tests can assert that a patch touched nothing.

use std::fmt::Write as _;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::error::HostError;
use crate::host::{EventHandler, HostDocument, ScrollOffset, Selection};
use crate::props::css_property_name;
use crate::NodeId;

/// Writes performed through [`HostDocument`] since the last reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteStats {
    pub attribute_writes: usize,
    pub style_writes: usize,
    pub value_writes: usize,
    pub checked_writes: usize,
    pub listener_writes: usize,
    pub nodes_created: usize,
    pub nodes_removed: usize,
}

impl WriteStats {
    /// Attribute, style, value, checked and listener writes combined.
    pub fn property_writes(&self) -> usize {
        self.attribute_writes
            + self.style_writes
            + self.value_writes
            + self.checked_writes
            + self.listener_writes
    }
}

#[derive(Default)]
struct ElementData {
    tag: String,
    attributes: IndexMap<String, String>,
    style: IndexMap<String, String>,
    value: String,
    checked: bool,
    selection: Selection,
    scroll: ScrollOffset,
    listeners: IndexMap<String, EventHandler>,
}

impl ElementData {
    fn style_text(&self) -> String {
        self.style
            .iter()
            .map(|(name, value)| format!("{name}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

enum NodeData {
    Element(Box<ElementData>),
    Text(String),
}

struct MemoryNode {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// In-memory document tree. Node `0` is the `body` element.
pub struct MemoryDocument {
    nodes: Vec<Option<MemoryNode>>,
    focused: Option<NodeId>,
    stats: WriteStats,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

fn utf16_len(text: &str) -> u32 {
    text.encode_utf16().count() as u32
}

fn is_valid_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_alphabetic())
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
}

impl MemoryDocument {
    pub fn new() -> Self {
        let body = MemoryNode {
            data: NodeData::Element(Box::new(ElementData {
                tag: "body".to_string(),
                ..ElementData::default()
            })),
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![Some(body)],
            focused: None,
            stats: WriteStats::default(),
        }
    }

    /// Document whose body holds a single `div` with the given id.
    pub fn with_container(id: &str) -> (Self, NodeId) {
        let mut document = Self::new();
        let mut attributes = IndexMap::new();
        attributes.insert("id".to_string(), id.to_string());
        let container = document.push(NodeData::Element(Box::new(ElementData {
            tag: "div".to_string(),
            attributes,
            ..ElementData::default()
        })));
        if let Some(Some(body)) = document.nodes.get_mut(0) {
            body.children.push(container);
        }
        if let Some(Some(node)) = document.nodes.get_mut(container) {
            node.parent = Some(0);
        }
        (document, container)
    }

    pub fn body(&self) -> NodeId {
        0
    }

    /// Appends a `div` with the given id to the body, for use as a root
    /// container.
    pub fn create_container(&mut self, id: &str) -> Result<NodeId, HostError> {
        let node = self.create_element("div")?;
        self.element_mut(node)?.attributes.insert("id".into(), id.into());
        let body = self.body();
        self.insert_child(body, usize::MAX, node)?;
        Ok(node)
    }

    pub fn stats(&self) -> WriteStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = WriteStats::default();
    }

    pub fn is_live(&self, node: NodeId) -> bool {
        matches!(self.nodes.get(node), Some(Some(_)))
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn node(&self, id: NodeId) -> Result<&MemoryNode, HostError> {
        self.nodes
            .get(id)
            .and_then(Option::as_ref)
            .ok_or(HostError::Missing { id })
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut MemoryNode, HostError> {
        self.nodes
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or(HostError::Missing { id })
    }

    fn element(&self, id: NodeId) -> Result<&ElementData, HostError> {
        match &self.node(id)?.data {
            NodeData::Element(element) => Ok(element),
            NodeData::Text(_) => Err(HostError::NotAnElement { id }),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, HostError> {
        match &mut self.node_mut(id)?.data {
            NodeData::Element(element) => Ok(element),
            NodeData::Text(_) => Err(HostError::NotAnElement { id }),
        }
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Some(MemoryNode {
            data,
            parent: None,
            children: Vec::new(),
        }));
        self.stats.nodes_created += 1;
        id
    }

    fn detach(&mut self, child: NodeId) -> Result<(), HostError> {
        if let Some(parent) = self.node(child)?.parent {
            self.node_mut(parent)?.children.retain(|&c| c != child);
            self.node_mut(child)?.parent = None;
        }
        Ok(())
    }

    /// Drops `root` and everything under it. Focus inside the subtree is lost.
    fn free(&mut self, root: NodeId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(id).and_then(Option::take) {
                stack.extend(node.children);
                self.stats.nodes_removed += 1;
                if self.focused == Some(id) {
                    self.focused = None;
                }
            }
        }
    }

    /// Text of a text node, or the concatenated text under an element.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let Ok(current) = self.node(id) else { continue };
            match &current.data {
                NodeData::Text(text) => out.push_str(text),
                NodeData::Element(_) => stack.extend(current.children.iter().rev()),
            }
        }
        out
    }

    pub fn has_listener(&self, node: NodeId, event: &str) -> bool {
        self.element(node)
            .map(|element| element.listeners.contains_key(event))
            .unwrap_or(false)
    }

    pub fn listener_count(&self, node: NodeId) -> usize {
        self.element(node)
            .map(|element| element.listeners.len())
            .unwrap_or(0)
    }

    /// Style property by CSS name (`background-color`).
    pub fn style_property(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node).ok()?.style.get(name).cloned()
    }

    /// Listeners for `event` from `target` up through its ancestors, in
    /// bubbling order. Cloned so they can run without borrowing the document.
    pub fn listener_path(
        &self,
        target: NodeId,
        event: &str,
    ) -> SmallVec<[(NodeId, EventHandler); 4]> {
        let mut path = SmallVec::new();
        let mut current = Some(target);
        while let Some(id) = current {
            let Ok(node) = self.node(id) else { break };
            if let NodeData::Element(element) = &node.data {
                if let Some(handler) = element.listeners.get(event) {
                    path.push((id, handler.clone()));
                }
            }
            current = node.parent;
        }
        path
    }

    /// Whether `select` has an option carrying `value`. Options without a
    /// `value` attribute stand for their text.
    fn has_option(&self, select: NodeId, value: &str) -> bool {
        self.find_all_by_tag(select, "option").into_iter().any(|option| {
            match self.attribute(option, "value") {
                Some(own) => own == value,
                None => self.text_content(option) == value,
            }
        })
    }

    /// Elements under `root` with the given tag, in document order.
    pub fn find_all_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.child_nodes(root).into_iter().rev().collect();
        while let Some(id) = stack.pop() {
            if self.tag_name(id).as_deref() == Some(tag) {
                found.push(id);
            }
            stack.extend(self.child_nodes(id).into_iter().rev());
        }
        found
    }

    /// Innermost element under `root` whose text content equals `text`,
    /// searching in document order.
    pub fn find_by_text(&self, root: NodeId, text: &str) -> Option<NodeId> {
        let matches = |id: NodeId| self.tag_name(id).is_some() && self.text_content(id) == text;
        let mut stack: Vec<NodeId> = self.child_nodes(root).into_iter().rev().collect();
        let mut found = None;
        while let Some(id) = stack.pop() {
            if matches(id) {
                found = Some(id);
                break;
            }
            stack.extend(self.child_nodes(id).into_iter().rev());
        }
        let mut current = found?;
        while let Some(inner) = self.child_nodes(current).into_iter().find(|&c| matches(c)) {
            current = inner;
        }
        Some(current)
    }

    /// Replaces the live value the way typing would: no write is recorded
    /// and the caret lands at `selection` or the end of the text.
    pub fn edit_value(
        &mut self,
        node: NodeId,
        value: &str,
        selection: Option<Selection>,
    ) -> Result<(), HostError> {
        let element = self.element_mut(node)?;
        element.value = value.to_string();
        let len = utf16_len(value);
        element.selection = selection.unwrap_or(Selection::caret(len)).clamp(len);
        Ok(())
    }

    /// Flips a checkbox the way a click would, without recording a write.
    pub fn toggle_checked(&mut self, node: NodeId) -> Result<bool, HostError> {
        let element = self.element_mut(node)?;
        element.checked = !element.checked;
        Ok(element.checked)
    }

    pub fn dump_tree(&self, root: NodeId) -> String {
        let mut output = String::new();
        self.dump_node(&mut output, root, 0);
        output
    }

    fn dump_node(&self, output: &mut String, id: NodeId, depth: usize) {
        let indent = "  ".repeat(depth);
        let Ok(node) = self.node(id) else {
            let _ = writeln!(output, "{indent}[{id}] (missing)");
            return;
        };
        let element = match &node.data {
            NodeData::Text(text) => {
                let _ = writeln!(output, "{indent}[{id}] {text:?}");
                return;
            }
            NodeData::Element(element) => element,
        };
        let _ = write!(output, "{indent}[{id}] <{}", element.tag);
        for (name, value) in &element.attributes {
            let _ = write!(output, " {name}={value:?}");
        }
        if !element.style.is_empty() {
            let _ = write!(output, " style={:?}", element.style_text());
        }
        if !element.value.is_empty() {
            let _ = write!(output, " value={:?}", element.value);
        }
        if element.checked {
            output.push_str(" checked");
        }
        output.push_str(">\n");
        for &child in &node.children {
            self.dump_node(output, child, depth + 1);
        }
    }
}

impl HostDocument for MemoryDocument {
    fn create_element(&mut self, tag: &str) -> Result<NodeId, HostError> {
        if !is_valid_tag(tag) {
            return Err(HostError::InvalidTag {
                tag: tag.to_string(),
            });
        }
        Ok(self.push(NodeData::Element(Box::new(ElementData {
            tag: tag.to_ascii_lowercase(),
            ..ElementData::default()
        }))))
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.element(node).ok().map(|element| element.tag.clone())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).ok()?.parent
    }

    fn child_nodes(&self, parent: NodeId) -> Vec<NodeId> {
        self.node(parent)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.node(parent).ok()?.children.get(index).copied()
    }

    fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), HostError> {
        self.element(parent)?;
        self.node(child)?;
        if self.contains(child, parent) {
            return Err(HostError::Platform {
                message: format!("inserting node {child} into node {parent} would create a cycle"),
            });
        }
        let reference = self.node(parent)?.children.get(index).copied();
        if reference == Some(child) {
            return Ok(());
        }
        self.detach(child)?;
        let siblings = &mut self.node_mut(parent)?.children;
        let position = reference
            .and_then(|r| siblings.iter().position(|&c| c == r))
            .unwrap_or(siblings.len());
        siblings.insert(position, child);
        self.node_mut(child)?.parent = Some(parent);
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
        if self.node(old_child)?.parent != Some(parent) {
            return Err(HostError::NotAChild {
                parent,
                child: old_child,
            });
        }
        self.node(new_child)?;
        self.detach(new_child)?;
        let siblings = &mut self.node_mut(parent)?.children;
        let position = siblings
            .iter()
            .position(|&c| c == old_child)
            .ok_or(HostError::NotAChild {
                parent,
                child: old_child,
            })?;
        siblings[position] = new_child;
        self.node_mut(new_child)?.parent = Some(parent);
        self.free(old_child);
        Ok(())
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        if self.node(child)?.parent != Some(parent) {
            return Err(HostError::NotAChild { parent, child });
        }
        self.detach(child)?;
        self.free(child);
        Ok(())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let element = self.element(node).ok()?;
        if name == "style" {
            return (!element.style.is_empty()).then(|| element.style_text());
        }
        element.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), HostError> {
        if name == "style" {
            return self.set_style_text(node, value);
        }
        self.element_mut(node)?
            .attributes
            .insert(name.to_string(), value.to_string());
        self.stats.attribute_writes += 1;
        Ok(())
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), HostError> {
        let element = self.element_mut(node)?;
        if name == "style" {
            element.style.clear();
        } else {
            element.attributes.shift_remove(name);
        }
        self.stats.attribute_writes += 1;
        Ok(())
    }

    fn set_style_property(
        &mut self,
        node: NodeId,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), HostError> {
        let style = &mut self.element_mut(node)?.style;
        match value {
            Some(value) => {
                style.insert(name.to_string(), value.to_string());
            }
            None => {
                style.shift_remove(name);
            }
        }
        self.stats.style_writes += 1;
        Ok(())
    }

    fn set_style_text(&mut self, node: NodeId, text: &str) -> Result<(), HostError> {
        let style = &mut self.element_mut(node)?.style;
        style.clear();
        for declaration in text.split(';') {
            if let Some((name, value)) = declaration.split_once(':') {
                let name = name.trim();
                if !name.is_empty() {
                    style.insert(css_property_name(name), value.trim().to_string());
                }
            }
        }
        self.stats.style_writes += 1;
        Ok(())
    }

    fn set_class_name(&mut self, node: NodeId, class_name: &str) -> Result<(), HostError> {
        let attributes = &mut self.element_mut(node)?.attributes;
        if class_name.is_empty() {
            attributes.shift_remove("class");
        } else {
            attributes.insert("class".to_string(), class_name.to_string());
        }
        self.stats.attribute_writes += 1;
        Ok(())
    }

    fn value(&self, node: NodeId) -> Option<String> {
        self.element(node).ok().map(|element| element.value.clone())
    }

    fn set_value(&mut self, node: NodeId, value: &str) -> Result<(), HostError> {
        // Like a browser, a select drops a value none of its options carry.
        let value = if self.element(node)?.tag == "select" && !self.has_option(node, value) {
            ""
        } else {
            value
        };
        let element = self.element_mut(node)?;
        element.value = value.to_string();
        element.selection = Selection::caret(utf16_len(value));
        self.stats.value_writes += 1;
        Ok(())
    }

    fn checked(&self, node: NodeId) -> Option<bool> {
        self.element(node).ok().map(|element| element.checked)
    }

    fn set_checked(&mut self, node: NodeId, checked: bool) -> Result<(), HostError> {
        self.element_mut(node)?.checked = checked;
        self.stats.checked_writes += 1;
        Ok(())
    }

    fn set_listener(
        &mut self,
        node: NodeId,
        event: &str,
        handler: Option<EventHandler>,
    ) -> Result<(), HostError> {
        let listeners = &mut self.element_mut(node)?.listeners;
        match handler {
            Some(handler) => {
                listeners.insert(event.to_string(), handler);
            }
            None => {
                listeners.shift_remove(event);
            }
        }
        self.stats.listener_writes += 1;
        Ok(())
    }

    fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    fn focus(&mut self, node: NodeId) -> Result<(), HostError> {
        self.element(node)?;
        self.focused = Some(node);
        Ok(())
    }

    fn selection(&self, node: NodeId) -> Option<Selection> {
        self.element(node).ok().map(|element| element.selection)
    }

    fn set_selection(&mut self, node: NodeId, selection: Selection) -> Result<(), HostError> {
        let element = self.element_mut(node)?;
        element.selection = selection.clamp(utf16_len(&element.value));
        Ok(())
    }

    fn scroll_offset(&self, node: NodeId) -> Option<ScrollOffset> {
        self.element(node).ok().map(|element| element.scroll)
    }

    fn set_scroll_offset(
        &mut self,
        node: NodeId,
        offset: ScrollOffset,
    ) -> Result<(), HostError> {
        self.element_mut(node)?.scroll = offset;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/memory_document_tests.rs"]
mod tests;
