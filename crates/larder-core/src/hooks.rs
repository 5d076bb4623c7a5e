//! Per-instance hook slots and the [`Hooks`] context handed to components.
//!
//! Slots are addressed by call order. The counter restarts at zero on every
//! invocation, so a component has to call the same hooks in the same order
//! each time. When it does not, the mismatching slot is reset and a warning is
//! logged; state is never attributed to the wrong hook type.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::EventResult;
use crate::instance::Instance;
use crate::runtime::RootHandle;
use crate::NodeId;

/// Stable box that receives the live node of the element it is bound to
/// through the `ref` property.
#[derive(Clone, Default)]
pub struct NodeRef(Rc<Cell<Option<NodeId>>>);

impl NodeRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<NodeId> {
        self.0.get()
    }

    pub fn ptr_eq(&self, other: &NodeRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn bind(&self, node: NodeId) {
        self.0.set(Some(node));
    }

    /// Clears the box if it still points at `node`.
    pub(crate) fn release(&self, node: NodeId) {
        if self.0.get() == Some(node) {
            self.0.set(None);
        }
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeRef").field(&self.0.get()).finish()
    }
}

type Cleanup = Box<dyn FnOnce()>;

#[derive(Default)]
pub(crate) struct EffectState {
    deps: Option<Box<dyn Any>>,
    cleanup: Option<Cleanup>,
    disposed: bool,
}

impl EffectState {
    fn should_run<D: PartialEq + 'static>(&self, next: Option<&D>) -> bool {
        match (next, &self.deps) {
            (Some(next), Some(previous)) => previous
                .downcast_ref::<D>()
                .map_or(true, |previous| previous != next),
            _ => true,
        }
    }

    fn dispose(&mut self) -> Option<Cleanup> {
        self.disposed = true;
        self.cleanup.take()
    }
}

#[derive(Default)]
pub(crate) struct MemoState {
    deps: Option<Box<dyn Any>>,
    value: Option<Rc<dyn Any>>,
}

impl MemoState {
    fn cached<D: PartialEq + 'static, T: 'static>(&self, deps: &D) -> Option<Rc<T>> {
        let same = self
            .deps
            .as_ref()
            .and_then(|previous| previous.downcast_ref::<D>())
            .is_some_and(|previous| previous == deps);
        if !same {
            return None;
        }
        self.value
            .as_ref()
            .and_then(|value| Rc::clone(value).downcast::<T>().ok())
    }
}

pub(crate) enum HookSlot {
    /// `Rc<RefCell<T>>` behind `dyn Any`.
    State(Rc<dyn Any>),
    Effect(Rc<RefCell<EffectState>>),
    Memo(Rc<RefCell<MemoState>>),
    NodeRef(NodeRef),
    /// `Rc<RefCell<T>>` from `use_mut_ref`.
    Cell(Rc<dyn Any>),
}

impl HookSlot {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            HookSlot::State(_) => "use_state",
            HookSlot::Effect(_) => "use_effect",
            HookSlot::Memo(_) => "use_memo",
            HookSlot::NodeRef(_) => "use_ref",
            HookSlot::Cell(_) => "use_mut_ref",
        }
    }

    /// Marks the slot dead and hands back any pending effect cleanup.
    pub(crate) fn dispose(&self) -> Option<Cleanup> {
        match self {
            HookSlot::Effect(state) => state.borrow_mut().dispose(),
            HookSlot::NodeRef(node_ref) => {
                node_ref.0.set(None);
                None
            }
            _ => None,
        }
    }
}

/// Scope passed to an effect body.
pub struct EffectScope {
    root: RootHandle,
}

impl EffectScope {
    /// Registers the cleanup that runs before the next execution of this
    /// effect, or when its component is unmounted.
    pub fn on_cleanup(&self, cleanup: impl FnOnce() + 'static) -> EffectResult {
        EffectResult {
            cleanup: Some(Box::new(cleanup)),
        }
    }

    pub fn done(&self) -> EffectResult {
        EffectResult::default()
    }

    /// Root the owning component renders into.
    pub fn root(&self) -> &RootHandle {
        &self.root
    }
}

#[derive(Default)]
pub struct EffectResult {
    cleanup: Option<Cleanup>,
}

/// Effect body queued during an invocation, run once the pass has committed.
pub(crate) struct PendingEffect {
    state: Rc<RefCell<EffectState>>,
    root: RootHandle,
    effect: Box<dyn FnOnce(EffectScope) -> EffectResult>,
}

impl PendingEffect {
    pub(crate) fn run(self) {
        let previous = {
            let mut state = self.state.borrow_mut();
            if state.disposed {
                return;
            }
            state.cleanup.take()
        };
        if let Some(cleanup) = previous {
            cleanup();
        }
        let result = (self.effect)(EffectScope { root: self.root });
        let orphaned = {
            let mut state = self.state.borrow_mut();
            if state.disposed {
                result.cleanup
            } else {
                state.cleanup = result.cleanup;
                None
            }
        };
        if let Some(cleanup) = orphaned {
            cleanup();
        }
    }
}

/// Setter paired with a `use_state` slot.
pub struct Setter<T> {
    cell: Weak<RefCell<T>>,
    root: RootHandle,
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Weak::clone(&self.cell),
            root: self.root.clone(),
        }
    }
}

impl<T: PartialEq + 'static> Setter<T> {
    pub fn set(&self, value: T) -> EventResult {
        self.update(move |_| value)
    }

    /// Computes the next value from the current one. Equal values are
    /// dropped without scheduling a render.
    pub fn update(&self, next: impl FnOnce(&T) -> T) -> EventResult {
        let Some(cell) = self.cell.upgrade() else {
            log::warn!("state update ignored: the owning component is no longer mounted");
            return Ok(());
        };
        let value = next(&cell.borrow());
        if *cell.borrow() == value {
            return Ok(());
        }
        *cell.borrow_mut() = value;
        self.root.request_render()
    }

    pub fn get(&self) -> Option<T>
    where
        T: Clone,
    {
        self.cell.upgrade().map(|cell| cell.borrow().clone())
    }
}

impl<T> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter")
            .field("live", &(self.cell.strong_count() > 0))
            .field("root", &self.root.container())
            .finish()
    }
}

/// Hook context for one component invocation.
pub struct Hooks<'a> {
    instance: &'a Instance,
    root: &'a RootHandle,
    effects: &'a mut Vec<PendingEffect>,
    cursor: usize,
}

impl<'a> Hooks<'a> {
    pub(crate) fn new(
        instance: &'a Instance,
        root: &'a RootHandle,
        effects: &'a mut Vec<PendingEffect>,
    ) -> Self {
        Self {
            instance,
            root,
            effects,
            cursor: 0,
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.cursor
    }

    pub fn root(&self) -> &RootHandle {
        self.root
    }

    fn claim<T>(
        &mut self,
        hook: &'static str,
        reuse: impl FnOnce(&HookSlot) -> Option<T>,
        create: impl FnOnce() -> (HookSlot, T),
    ) -> T {
        let index = self.cursor;
        self.cursor += 1;
        match self.instance.lookup(index, reuse) {
            Some(Some(found)) => return found,
            Some(None) => log::warn!(
                "{}: hook #{index} is now {hook} but was {}; resetting the slot",
                self.instance.name(),
                self.instance.slot_kind(index).unwrap_or("unknown"),
            ),
            None if self.instance.has_rendered() => log::warn!(
                "{}: hook #{index} ({hook}) was not called on the first render",
                self.instance.name(),
            ),
            None => {}
        }
        let (slot, value) = create();
        self.instance.install(index, slot);
        value
    }

    /// Persistent state with a lazily computed initial value.
    pub fn use_state<T>(&mut self, init: impl FnOnce() -> T) -> (T, Setter<T>)
    where
        T: Clone + PartialEq + 'static,
    {
        let cell = self.claim(
            "use_state",
            |slot| match slot {
                HookSlot::State(any) => Rc::clone(any).downcast::<RefCell<T>>().ok(),
                _ => None,
            },
            || {
                let cell = Rc::new(RefCell::new(init()));
                (HookSlot::State(cell.clone()), cell)
            },
        );
        let value = cell.borrow().clone();
        let setter = Setter {
            cell: Rc::downgrade(&cell),
            root: self.root.clone(),
        };
        (value, setter)
    }

    /// Runs `effect` after commit on the first render and whenever `deps`
    /// differs from the previous render.
    pub fn use_effect<D, F>(&mut self, deps: D, effect: F)
    where
        D: PartialEq + 'static,
        F: FnOnce(EffectScope) -> EffectResult + 'static,
    {
        self.effect_slot(Some(deps), effect);
    }

    /// Runs `effect` after every commit.
    pub fn use_effect_always<F>(&mut self, effect: F)
    where
        F: FnOnce(EffectScope) -> EffectResult + 'static,
    {
        self.effect_slot(None::<()>, effect);
    }

    fn effect_slot<D, F>(&mut self, deps: Option<D>, effect: F)
    where
        D: PartialEq + 'static,
        F: FnOnce(EffectScope) -> EffectResult + 'static,
    {
        let state = self.claim(
            "use_effect",
            |slot| match slot {
                HookSlot::Effect(state) => Some(Rc::clone(state)),
                _ => None,
            },
            || {
                let state = Rc::new(RefCell::new(EffectState::default()));
                (HookSlot::Effect(state.clone()), state)
            },
        );
        if !state.borrow().should_run(deps.as_ref()) {
            return;
        }
        state.borrow_mut().deps = deps.map(|deps| Box::new(deps) as Box<dyn Any>);
        self.effects.push(PendingEffect {
            state,
            root: self.root.clone(),
            effect: Box::new(effect),
        });
    }

    /// Cached value recomputed only when `deps` changes.
    pub fn use_memo<D, T>(&mut self, deps: D, compute: impl FnOnce() -> T) -> Rc<T>
    where
        D: PartialEq + 'static,
        T: 'static,
    {
        let state = self.claim(
            "use_memo",
            |slot| match slot {
                HookSlot::Memo(state) => Some(Rc::clone(state)),
                _ => None,
            },
            || {
                let state = Rc::new(RefCell::new(MemoState::default()));
                (HookSlot::Memo(state.clone()), state)
            },
        );
        if let Some(cached) = state.borrow().cached::<D, T>(&deps) {
            return cached;
        }
        let value = Rc::new(compute());
        let mut slot = state.borrow_mut();
        slot.deps = Some(Box::new(deps));
        slot.value = Some(value.clone());
        value
    }

    /// Box bound to a mounted node through the `ref` property.
    pub fn use_ref(&mut self) -> NodeRef {
        self.claim(
            "use_ref",
            |slot| match slot {
                HookSlot::NodeRef(node_ref) => Some(node_ref.clone()),
                _ => None,
            },
            || {
                let node_ref = NodeRef::new();
                (HookSlot::NodeRef(node_ref.clone()), node_ref)
            },
        )
    }

    /// Mutable box whose identity is stable across renders. Writing to it
    /// does not schedule a render.
    pub fn use_mut_ref<T: 'static>(&mut self, init: impl FnOnce() -> T) -> Rc<RefCell<T>> {
        self.claim(
            "use_mut_ref",
            |slot| match slot {
                HookSlot::Cell(any) => Rc::clone(any).downcast::<RefCell<T>>().ok(),
                _ => None,
            },
            || {
                let cell = Rc::new(RefCell::new(init()));
                (HookSlot::Cell(cell.clone()), cell)
            },
        )
    }
}
