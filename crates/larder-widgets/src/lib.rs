//! Composite widgets built on the Larder core: dialogs and form controls.
//!
//! Every widget is a hook component. The `PascalCase` constructors build its
//! description from an options struct, so callers never spell out property
//! names by hand. Values flow back to the owner through [`Callback`]s.
//!
//! [`Callback`]: larder_core::Callback

#![allow(non_snake_case)]

mod checkbox_group;
mod dynamic_list;
mod form;
mod modal;
mod select_field;
mod text_field;

pub use checkbox_group::*;
pub use dynamic_list::*;
pub use form::*;
pub use modal::*;
pub use select_field::*;
pub use text_field::*;

/// Id given to the control of the field called `name`, so a `label` can
/// point at it.
pub fn field_id(name: &str) -> String {
    format!("field-{name}")
}

pub mod prelude {
    pub use crate::{
        CheckboxGroup, CheckboxGroupOptions, DynamicList, DynamicListOptions, Form,
        FormOptions, Modal, ModalOptions, SelectField, SelectFieldOptions, SelectOption,
        TextField, TextFieldOptions, TextFieldWithOptions,
    };
}
