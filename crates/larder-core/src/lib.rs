//! Core of the Larder renderer: element descriptions, hook components and the
//! reconciler that keeps a host document in sync with them.
//!
//! ```
//! use larder_core::{component, h, Hooks, MemoryDocument, Props, Runtime, VNode};
//!
//! fn counter(hooks: &mut Hooks<'_>, _: &Props) -> VNode {
//!     let (count, set_count) = hooks.use_state(|| 0);
//!     h(
//!         "button",
//!         Props::new().on("click", move |_| set_count.update(|n| n + 1)),
//!         count,
//!     )
//! }
//!
//! let mut document = MemoryDocument::new();
//! let container = document.create_container("app").unwrap();
//! let runtime = Runtime::new(document);
//! runtime.render(h(component(counter), (), ()), container).unwrap();
//! assert_eq!(runtime.document().text_content(container), "0");
//! ```

mod apply;
pub mod collections;
mod element;
mod error;
pub mod hash;
mod hooks;
mod host;
mod instance;
mod memory_document;
mod props;
mod reconcile;
mod runtime;
mod snapshot;

/// Hashed reconciliation key.
pub type Key = u64;
/// Host document node handle.
pub type NodeId = usize;

pub use element::{component, h, Child, ComponentRef, Element, IntoChildren, Kind, Primitive, VNode};
pub use error::{EventResult, HostError, RenderError};
pub use hooks::{EffectResult, EffectScope, Hooks, NodeRef, Setter};
pub use host::{is_form_control, Event, EventHandler, HostDocument, ScrollOffset, Selection};
pub use instance::{InstanceHandle, InstanceId};
pub use memory_document::{MemoryDocument, WriteStats};
pub use props::{css_property_name, Callback, PropValue, Props, Style, CHILDREN, KEY, REF};
pub use runtime::{RenderScheduler, RootHandle, Runtime, RuntimeConfig};

pub mod prelude {
    pub use crate::{
        component, h, Callback, Child, EffectResult, EffectScope, Event, EventHandler,
        EventResult, Hooks, NodeRef, PropValue, Props, Setter, Style, VNode,
    };
}
