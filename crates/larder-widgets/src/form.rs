//! Form wrapper that keeps submission inside the application.

use larder_core::{
    component, h, Callback, Child, EventHandler, Hooks, IntoChildren, PropValue, Props, VNode,
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormOptions {
    pub id: Option<String>,
    pub class: Option<String>,
    /// Text of a trailing submit button. No button is added when `None`.
    pub submit_label: Option<String>,
    /// Called with `PropValue::Null` on every submission.
    pub on_submit: Option<Callback>,
}

/// Creates a `form` around `children`.
///
/// Submissions never navigate: the listener prevents the default action
/// before handing control to `on_submit`. Field values are expected to live
/// in the owner's state, fed by the fields' own callbacks.
pub fn Form(options: FormOptions, children: impl IntoChildren) -> VNode {
    let props = Props::new()
        .with("id", options.id)
        .with("className", options.class.unwrap_or_else(|| "form".to_string()))
        .with("submitLabel", options.submit_label)
        .with("onSubmit", options.on_submit);
    h(component(form), props, children)
}

fn form(hooks: &mut Hooks<'_>, props: &Props) -> VNode {
    let on_submit = props.callback("onSubmit").cloned();
    let submit = hooks.use_memo(on_submit.clone(), move || {
        EventHandler::new(move |event| {
            event.prevent_default();
            match &on_submit {
                Some(callback) => callback.call(PropValue::Null),
                None => {
                    log::debug!("form submitted without an onSubmit callback");
                    Ok(())
                }
            }
        })
    });

    let mut attributes = Props::new()
        .with("className", props.get_str("className"))
        .on_handler("submit", (*submit).clone());
    if let Some(id) = props.get_str("id") {
        attributes = attributes.id(id);
    }
    let button = props.get_str("submitLabel").map(|label| {
        h(
            "button",
            Props::new().with("type", "submit").class("form-submit"),
            label,
        )
    });
    h(
        "form",
        attributes,
        (Child::list(props.children().to_vec()), button),
    )
}
