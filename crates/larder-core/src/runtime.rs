//! Render entry point and the per-runtime root registry.
//!
//! A [`Runtime`] owns a host document and every root mounted into it. Roots
//! are keyed by their container node. A render request made while any root is
//! mid-pass marks the target dirty instead of re-entering the reconciler; the
//! outermost call keeps running passes until nothing is dirty.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::collections::map::{HashMap, HashSet};
use crate::element::VNode;
use crate::error::{EventResult, HostError, RenderError};
use crate::hooks::PendingEffect;
use crate::host::{Event, HostDocument};
use crate::instance::InstanceHandle;
use crate::memory_document::MemoryDocument;
use crate::reconcile::{release, Mounted, Reconciler};
use crate::snapshot::ViewSnapshot;
use crate::NodeId;

const DEFAULT_MAX_RENDER_PASSES: usize = 100;

/// Runtime-wide settings.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    focus_attributes: Vec<String>,
    scroll_attribute: String,
    max_render_passes: usize,
    clear_container_on_mount: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            focus_attributes: vec!["id".to_string(), "name".to_string()],
            scroll_attribute: "data-preserve-scroll".to_string(),
            max_render_passes: DEFAULT_MAX_RENDER_PASSES,
            clear_container_on_mount: true,
        }
    }
}

impl RuntimeConfig {
    /// Attributes tried in order to find the focused control again after a
    /// patch.
    pub fn with_focus_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.focus_attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Marker attribute of elements whose scroll offset survives a patch.
    pub fn with_scroll_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.scroll_attribute = attribute.into();
        self
    }

    pub fn with_max_render_passes(mut self, passes: usize) -> Self {
        self.max_render_passes = passes.max(1);
        self
    }

    /// Whether the first mount removes whatever the container already holds.
    pub fn with_clear_container_on_mount(mut self, clear: bool) -> Self {
        self.clear_container_on_mount = clear;
        self
    }

    pub fn focus_attributes(&self) -> &[String] {
        &self.focus_attributes
    }

    pub fn scroll_attribute(&self) -> &str {
        &self.scroll_attribute
    }

    pub fn max_render_passes(&self) -> usize {
        self.max_render_passes
    }

    pub fn clear_container_on_mount(&self) -> bool {
        self.clear_container_on_mount
    }
}

/// Receives render requests from setters and effects.
pub trait RenderScheduler {
    fn schedule(&self, container: NodeId) -> EventResult;
}

/// Handle to the root a component renders into.
#[derive(Clone)]
pub struct RootHandle {
    scheduler: Weak<dyn RenderScheduler>,
    container: NodeId,
}

impl RootHandle {
    /// Handle not attached to any runtime; render requests are dropped.
    #[cfg(test)]
    pub(crate) fn detached(container: NodeId) -> Self {
        let scheduler: Weak<dyn RenderScheduler> = Weak::<RuntimeInner<MemoryDocument>>::new();
        Self {
            scheduler,
            container,
        }
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Re-renders the root now, or after the current pass when called from
    /// inside one.
    pub fn request_render(&self) -> EventResult {
        match self.scheduler.upgrade() {
            Some(scheduler) => scheduler.schedule(self.container),
            None => {
                log::debug!(
                    "render request for root {} dropped: runtime is gone",
                    self.container
                );
                Ok(())
            }
        }
    }
}

impl fmt::Debug for RootHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootHandle")
            .field("container", &self.container)
            .finish()
    }
}

struct RootState {
    description: VNode,
    mounted: Option<Mounted>,
    handle: RootHandle,
    passes: usize,
    dirty: bool,
    clear_on_mount: bool,
}

struct RuntimeInner<D: HostDocument> {
    document: RefCell<D>,
    config: RuntimeConfig,
    roots: RefCell<IndexMap<NodeId, RootState>>,
    busy: Cell<bool>,
    scheduler: Weak<dyn RenderScheduler>,
}

/// Clears the busy flag, also on unwind.
struct BusyGuard<'a, D: HostDocument> {
    inner: &'a RuntimeInner<D>,
}

impl<D: HostDocument> Drop for BusyGuard<'_, D> {
    fn drop(&mut self) {
        self.inner.busy.set(false);
    }
}

impl<D: HostDocument + 'static> RenderScheduler for RuntimeInner<D> {
    fn schedule(&self, container: NodeId) -> EventResult {
        {
            let mut roots = self.roots.borrow_mut();
            let Some(root) = roots.get_mut(&container) else {
                log::debug!("render requested for unknown root {container}");
                return Ok(());
            };
            root.dirty = true;
        }
        self.drive()
    }
}

impl<D: HostDocument + 'static> RuntimeInner<D> {
    fn next_dirty(&self) -> Option<NodeId> {
        self.roots
            .borrow()
            .iter()
            .find(|(_, root)| root.dirty)
            .map(|(&container, _)| container)
    }

    fn clear_dirty(&self, container: NodeId) {
        if let Some(root) = self.roots.borrow_mut().get_mut(&container) {
            root.dirty = false;
        }
    }

    /// Runs passes until no root is dirty. Nested calls only leave their
    /// mark for the outermost one. A failing root stops being rendered for
    /// this drive; the other dirty roots still are, and the first failure is
    /// returned.
    fn drive(&self) -> EventResult {
        if self.busy.get() {
            log::trace!("render deferred until the current pass finishes");
            return Ok(());
        }
        self.busy.set(true);
        let _guard = BusyGuard { inner: self };
        let mut passes: HashMap<NodeId, usize> = HashMap::default();
        let mut failed: HashSet<NodeId> = HashSet::default();
        let mut failure = None;
        while let Some(container) = self.next_dirty() {
            if failed.contains(&container) {
                self.clear_dirty(container);
                continue;
            }
            let count = passes.entry(container).or_insert(0);
            if *count >= self.config.max_render_passes {
                log::warn!("root {container} still dirty after {count} passes");
                let passes = *count;
                self.clear_dirty(container);
                failed.insert(container);
                failure.get_or_insert(RenderError::UpdateLoop { container, passes });
                continue;
            }
            *count += 1;
            if let Err(err) = self.render_pass(container) {
                self.clear_dirty(container);
                failed.insert(container);
                failure.get_or_insert(err);
            }
        }
        failure.map_or(Ok(()), Err)
    }

    fn render_pass(&self, container: NodeId) -> EventResult {
        let (description, previous, handle, clear) = {
            let mut roots = self.roots.borrow_mut();
            let root = roots
                .get_mut(&container)
                .ok_or(HostError::Missing { id: container })?;
            root.dirty = false;
            root.passes += 1;
            (
                root.description.clone(),
                root.mounted.take(),
                root.handle.clone(),
                root.clear_on_mount,
            )
        };
        log::debug!(
            "root {container}: {} pass",
            if previous.is_some() { "patch" } else { "mount" }
        );

        let snapshot = ViewSnapshot::capture(&*self.document.borrow(), container, &self.config);
        // A failed patch loses track of the old tree, so its instances are
        // kept aside to be disposed.
        let mut previous_instances = Vec::new();
        if let Some(previous) = &previous {
            previous.collect_instances(&mut previous_instances);
        }
        let mut effects = Vec::new();
        let committed =
            self.commit(container, &description, previous, &handle, clear, &mut effects);
        let mounted = match committed {
            Ok(mounted) => mounted,
            Err(err) => {
                log::debug!(
                    "root {container}: pass failed, dropping {} effects and {} instances",
                    effects.len(),
                    previous_instances.len()
                );
                if let Some(root) = self.roots.borrow_mut().get_mut(&container) {
                    root.clear_on_mount = true;
                }
                drop(effects);
                for instance in previous_instances {
                    instance.0.dispose();
                }
                return Err(err.into());
            }
        };
        if let Some(root) = self.roots.borrow_mut().get_mut(&container) {
            root.mounted = Some(mounted);
            root.clear_on_mount = false;
        }

        snapshot.restore(&mut *self.document.borrow_mut(), container);
        for effect in effects {
            effect.run();
        }
        Ok(())
    }

    fn commit(
        &self,
        container: NodeId,
        description: &VNode,
        previous: Option<Mounted>,
        handle: &RootHandle,
        clear: bool,
        effects: &mut Vec<PendingEffect>,
    ) -> Result<Mounted, HostError> {
        let mut document = self.document.borrow_mut();
        let mut reconciler = Reconciler::new(&mut *document, handle, effects);
        let Some(previous) = previous else {
            let mounted = reconciler.mount(description)?;
            let document = reconciler.document();
            if clear {
                for child in document.child_nodes(container) {
                    document.remove_child(container, child)?;
                }
            }
            document.append_child(container, mounted.node())?;
            return Ok(mounted);
        };
        let before = previous.node();
        let mounted = reconciler.patch(previous, description)?;
        if mounted.node() != before {
            reconciler
                .document()
                .replace_child(container, mounted.node(), before)?;
        }
        Ok(mounted)
    }
}

/// Owner of a host document and the roots rendered into it.
///
/// Cloning yields another handle to the same runtime.
pub struct Runtime<D: HostDocument + 'static> {
    inner: Rc<RuntimeInner<D>>,
}

impl<D: HostDocument + 'static> Clone for Runtime<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<D: HostDocument + 'static> Runtime<D> {
    pub fn new(document: D) -> Self {
        Self::with_config(document, RuntimeConfig::default())
    }

    pub fn with_config(document: D, config: RuntimeConfig) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<RuntimeInner<D>>| {
            let scheduler: Weak<dyn RenderScheduler> = weak.clone();
            RuntimeInner {
                document: RefCell::new(document),
                config,
                roots: RefCell::new(IndexMap::new()),
                busy: Cell::new(false),
                scheduler,
            }
        });
        Self { inner }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    /// Mounts `description` into `container` on the first call and patches
    /// the existing tree on later ones.
    pub fn render(&self, description: impl Into<VNode>, container: NodeId) -> EventResult {
        let description = description.into();
        {
            let mut roots = self.inner.roots.borrow_mut();
            match roots.get_mut(&container) {
                Some(root) => {
                    root.description = description;
                    root.dirty = true;
                }
                None => {
                    log::debug!("registering root {container}");
                    let handle = RootHandle {
                        scheduler: self.inner.scheduler.clone(),
                        container,
                    };
                    roots.insert(
                        container,
                        RootState {
                            description,
                            mounted: None,
                            handle,
                            passes: 0,
                            dirty: true,
                            clear_on_mount: self.inner.config.clear_container_on_mount,
                        },
                    );
                }
            }
        }
        self.inner.drive()
    }

    /// Renders nothing into `container`, running every cleanup of the tree
    /// it held. The root stays registered.
    pub fn unmount(&self, container: NodeId) -> EventResult {
        if self.inner.busy.get() {
            return self.render(VNode::Empty, container);
        }
        let mounted = match self.inner.roots.borrow_mut().get_mut(&container) {
            Some(root) => {
                root.description = VNode::Empty;
                root.clear_on_mount = true;
                root.mounted.take()
            }
            None => return Ok(()),
        };
        if let Some(mounted) = mounted {
            let node = mounted.node();
            release(mounted);
            self.inner.document.borrow_mut().remove_child(container, node)?;
        }
        Ok(())
    }

    pub fn document(&self) -> Ref<'_, D> {
        self.inner.document.borrow()
    }

    pub fn document_mut(&self) -> RefMut<'_, D> {
        self.inner.document.borrow_mut()
    }

    pub fn root_handle(&self, container: NodeId) -> Option<RootHandle> {
        self.inner
            .roots
            .borrow()
            .get(&container)
            .map(|root| root.handle.clone())
    }

    /// Host node currently rendered by the root.
    pub fn root_node(&self, container: NodeId) -> Option<NodeId> {
        self.inner
            .roots
            .borrow()
            .get(&container)?
            .mounted
            .as_ref()
            .map(Mounted::node)
    }

    /// Instance of the component at the top of the root, if it is one.
    pub fn root_instance(&self, container: NodeId) -> Option<InstanceHandle> {
        self.inner
            .roots
            .borrow()
            .get(&container)?
            .mounted
            .as_ref()?
            .instance()
    }

    /// Every live component instance under the root, parents first.
    pub fn instances(&self, container: NodeId) -> Vec<InstanceHandle> {
        let mut out = Vec::new();
        if let Some(mounted) = self
            .inner
            .roots
            .borrow()
            .get(&container)
            .and_then(|root| root.mounted.as_ref())
        {
            mounted.collect_instances(&mut out);
        }
        out
    }

    /// Passes run for the root since it was registered.
    pub fn render_passes(&self, container: NodeId) -> usize {
        self.inner
            .roots
            .borrow()
            .get(&container)
            .map_or(0, |root| root.passes)
    }

    pub fn roots(&self) -> Vec<NodeId> {
        self.inner.roots.borrow().keys().copied().collect()
    }
}

impl Runtime<MemoryDocument> {
    /// Delivers `event` to its target and bubbles it up to the document
    /// root. Listeners run without the document borrowed, so they may set
    /// state freely.
    pub fn dispatch_event(&self, event: &Event) -> EventResult {
        let path = self
            .document()
            .listener_path(event.target(), event.name());
        log::trace!(
            "dispatching {} to node {} ({} listeners)",
            event.name(),
            event.target(),
            path.len()
        );
        for (node, handler) in path {
            if event.propagation_stopped() {
                break;
            }
            event.set_current_target(node);
            handler.call(event)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
