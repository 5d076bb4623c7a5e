//! Component instances: hook storage owned by a mounted component.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::element::{ComponentRef, VNode};
use crate::hooks::{HookSlot, Hooks, PendingEffect};
use crate::props::Props;
use crate::runtime::RootHandle;
use crate::NodeId;

pub type InstanceId = usize;

static NEXT_INSTANCE_ID: AtomicUsize = AtomicUsize::new(1);

pub(crate) struct Instance {
    id: InstanceId,
    component: ComponentRef,
    container: NodeId,
    slots: RefCell<Vec<HookSlot>>,
    /// Hook calls made by the first invocation.
    expected_calls: Cell<Option<usize>>,
    renders: Cell<usize>,
    mounted: Cell<bool>,
}

impl Instance {
    pub(crate) fn new(component: ComponentRef, container: NodeId) -> Rc<Self> {
        Rc::new(Self {
            id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            component,
            container,
            slots: RefCell::new(Vec::new()),
            expected_calls: Cell::new(None),
            renders: Cell::new(0),
            mounted: Cell::new(true),
        })
    }

    pub(crate) fn name(&self) -> &'static str {
        self.component.name()
    }

    pub(crate) fn component(&self) -> &ComponentRef {
        &self.component
    }

    pub(crate) fn has_rendered(&self) -> bool {
        self.expected_calls.get().is_some()
    }

    /// Invokes the component function with a fresh hook cursor.
    pub(crate) fn render(
        &self,
        props: &Props,
        root: &RootHandle,
        effects: &mut Vec<PendingEffect>,
    ) -> VNode {
        let mut hooks = Hooks::new(self, root, effects);
        let output = self.component.invoke(&mut hooks, props);
        let calls = hooks.calls();
        match self.expected_calls.get() {
            None => self.expected_calls.set(Some(calls)),
            Some(expected) if expected != calls => log::warn!(
                "{}: called {calls} hooks, previous renders called {expected}",
                self.name()
            ),
            Some(_) => {}
        }
        self.renders.set(self.renders.get() + 1);
        output
    }

    pub(crate) fn lookup<T>(
        &self,
        index: usize,
        reuse: impl FnOnce(&HookSlot) -> Option<T>,
    ) -> Option<Option<T>> {
        self.slots.borrow().get(index).map(reuse)
    }

    pub(crate) fn slot_kind(&self, index: usize) -> Option<&'static str> {
        self.slots.borrow().get(index).map(HookSlot::kind)
    }

    pub(crate) fn install(&self, index: usize, slot: HookSlot) {
        let replaced = {
            let mut slots = self.slots.borrow_mut();
            if index < slots.len() {
                Some(std::mem::replace(&mut slots[index], slot))
            } else {
                slots.push(slot);
                None
            }
        };
        if let Some(cleanup) = replaced.and_then(|old| old.dispose()) {
            cleanup();
        }
    }

    /// Runs pending effect cleanups and clears node refs. Idempotent.
    pub(crate) fn dispose(&self) {
        if !self.mounted.replace(false) {
            return;
        }
        let cleanups: Vec<_> = self
            .slots
            .borrow()
            .iter()
            .filter_map(HookSlot::dispose)
            .collect();
        log::trace!("disposing {} ({} cleanups)", self.name(), cleanups.len());
        for cleanup in cleanups {
            cleanup();
        }
    }
}

/// Read-only view of a mounted component instance, for tests and tools.
#[derive(Clone)]
pub struct InstanceHandle(pub(crate) Rc<Instance>);

impl InstanceHandle {
    pub fn id(&self) -> InstanceId {
        self.0.id
    }

    pub fn component_name(&self) -> &'static str {
        self.0.name()
    }

    pub fn is_instance_of(&self, component: &ComponentRef) -> bool {
        self.0.component() == component
    }

    /// Container node of the root this instance renders into.
    pub fn container(&self) -> NodeId {
        self.0.container
    }

    pub fn hook_count(&self) -> usize {
        self.0.slots.borrow().len()
    }

    pub fn render_count(&self) -> usize {
        self.0.renders.get()
    }

    pub fn is_mounted(&self) -> bool {
        self.0.mounted.get()
    }

    /// Current value of the `use_state` hook at `slot`, if it holds a `T`.
    pub fn state<T: Clone + 'static>(&self, slot: usize) -> Option<T> {
        match self.0.slots.borrow().get(slot) {
            Some(HookSlot::State(any)) => Rc::clone(any)
                .downcast::<RefCell<T>>()
                .ok()
                .map(|cell| cell.borrow().clone()),
            _ => None,
        }
    }
}

impl fmt::Debug for InstanceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceHandle")
            .field("id", &self.0.id)
            .field("component", &self.0.name())
            .field("hooks", &self.hook_count())
            .field("renders", &self.render_count())
            .finish()
    }
}
