use std::cell::{Ref, RefMut};

use larder_core::{
    Event, EventResult, HostDocument, InstanceHandle, MemoryDocument, NodeId, RenderError,
    Runtime, RuntimeConfig, Selection, VNode,
};

/// Headless harness for exercising components in tests.
///
/// `RenderTestRule` owns a runtime over an in-memory document with a single
/// `#app` container, re-renders stored content on demand, and simulates the
/// user side of a browser: clicks, typing, key presses and submissions are
/// applied to the live document first and then dispatched as bubbling events.
pub struct RenderTestRule {
    runtime: Runtime<MemoryDocument>,
    container: NodeId,
    content: Option<Box<dyn Fn() -> VNode>>,
}

impl RenderTestRule {
    /// Create a new test rule with the default runtime configuration.
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        let (document, container) = MemoryDocument::with_container("app");
        Self {
            runtime: Runtime::with_config(document, config),
            container,
            content: None,
        }
    }

    /// Install the content builder and perform the initial render.
    pub fn set_content(&mut self, content: impl Fn() -> VNode + 'static) -> EventResult {
        self.content = Some(Box::new(content));
        self.rerender()
    }

    /// Render the installed content again, as an outer caller of
    /// `render` would after its inputs changed.
    pub fn rerender(&mut self) -> EventResult {
        match self.content.as_ref() {
            Some(content) => self.runtime.render(content(), self.container),
            None => Ok(()),
        }
    }

    /// Render a one-off description into the container.
    pub fn render(&self, description: impl Into<VNode>) -> EventResult {
        self.runtime.render(description, self.container)
    }

    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    pub fn runtime(&self) -> &Runtime<MemoryDocument> {
        &self.runtime
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn document(&self) -> Ref<'_, MemoryDocument> {
        self.runtime.document()
    }

    pub fn document_mut(&self) -> RefMut<'_, MemoryDocument> {
        self.runtime.document_mut()
    }

    pub fn root_node(&self) -> Option<NodeId> {
        self.runtime.root_node(self.container)
    }

    pub fn root_instance(&self) -> Option<InstanceHandle> {
        self.runtime.root_instance(self.container)
    }

    pub fn instances(&self) -> Vec<InstanceHandle> {
        self.runtime.instances(self.container)
    }

    pub fn render_passes(&self) -> usize {
        self.runtime.render_passes(self.container)
    }

    /// Text content of the whole container.
    pub fn text_content(&self) -> String {
        self.document().text_content(self.container)
    }

    /// Dump the container subtree as text for debugging.
    pub fn dump_tree(&self) -> String {
        self.document().dump_tree(self.container)
    }

    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.document().find_by_attribute(self.container, "id", id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.document().find_by_attribute(self.container, "name", name)
    }

    pub fn find_by_text(&self, text: &str) -> Option<NodeId> {
        self.document().find_by_text(self.container, text)
    }

    pub fn find_all_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.document().find_all_by_tag(self.container, tag)
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.document().attribute(node, name)
    }

    pub fn value(&self, node: NodeId) -> Option<String> {
        self.document().value(node)
    }

    pub fn is_checked(&self, node: NodeId) -> bool {
        self.document().checked(node).unwrap_or(false)
    }

    /// Dispatch an event built by the caller.
    pub fn dispatch(&self, event: &Event) -> EventResult {
        self.runtime.dispatch_event(event)
    }

    /// Event carrying the live value and checked state of `node`.
    fn event(&self, name: &str, node: NodeId) -> Event {
        let document = self.document();
        let mut event = Event::new(name, node);
        if let Some(value) = document.value(node) {
            event = event.with_value(value);
        }
        if let Some(checked) = document.checked(node) {
            event = event.with_checked(checked);
        }
        event
    }

    fn input_type(&self, node: NodeId) -> Option<String> {
        let document = self.document();
        match document.tag_name(node).as_deref() {
            Some("input") => Some(
                document
                    .attribute(node, "type")
                    .unwrap_or_else(|| "text".into()),
            ),
            _ => None,
        }
    }

    fn enclosing_form(&self, node: NodeId) -> Option<NodeId> {
        let document = self.document();
        let mut current = document.parent(node);
        while let Some(id) = current {
            if document.tag_name(id).as_deref() == Some("form") {
                return Some(id);
            }
            current = document.parent(id);
        }
        None
    }

    /// Click `node` the way a browser would: checkboxes flip and report
    /// `change`, and submit buttons submit their form unless a click
    /// listener prevented it.
    pub fn click(&self, node: NodeId) -> EventResult {
        let input_type = self.input_type(node);
        if matches!(input_type.as_deref(), Some("checkbox" | "radio")) {
            self.document_mut().toggle_checked(node)?;
        }
        let click = self.event("click", node);
        self.dispatch(&click)?;
        match input_type.as_deref() {
            Some("checkbox" | "radio") => self.dispatch(&self.event("change", node)),
            _ if click.default_prevented() => Ok(()),
            _ => {
                let is_submit = {
                    let document = self.document();
                    document.tag_name(node).as_deref() == Some("button")
                        && document.attribute(node, "type").as_deref() != Some("button")
                };
                match self.enclosing_form(node) {
                    Some(form) if is_submit => self.submit(form).map(|_| ()),
                    _ => Ok(()),
                }
            }
        }
    }

    /// Type `text` into a control, replacing its value, with the caret at
    /// the end.
    pub fn input(&self, node: NodeId, text: &str) -> EventResult {
        self.input_with_selection(node, text, None)
    }

    pub fn input_with_selection(
        &self,
        node: NodeId,
        text: &str,
        selection: Option<Selection>,
    ) -> EventResult {
        self.document_mut().edit_value(node, text, selection)?;
        self.dispatch(&self.event("input", node))
    }

    /// Pick a value in a `select`.
    pub fn select(&self, node: NodeId, value: &str) -> EventResult {
        self.document_mut().edit_value(node, value, None)?;
        self.dispatch(&self.event("change", node))
    }

    pub fn key_down(&self, node: NodeId, key: &str) -> EventResult {
        let event = self.event("keydown", node).with_key(key);
        self.dispatch(&event)
    }

    /// Submit a form. Returns whether a listener prevented the default
    /// navigation.
    pub fn submit(&self, form: NodeId) -> Result<bool, RenderError> {
        let event = Event::new("submit", form);
        self.dispatch(&event)?;
        Ok(event.default_prevented())
    }

    pub fn focus(&self, node: NodeId) -> EventResult {
        self.document_mut().focus(node)?;
        Ok(())
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.document().focused()
    }
}

impl Default for RenderTestRule {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for tests that only need temporary access to a
/// `RenderTestRule`.
pub fn run_test_render<R>(f: impl FnOnce(&mut RenderTestRule) -> R) -> R {
    let mut rule = RenderTestRule::new();
    f(&mut rule)
}

#[cfg(test)]
#[path = "tests/testing_tests.rs"]
mod tests;
