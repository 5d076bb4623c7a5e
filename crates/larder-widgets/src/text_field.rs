//! Labelled single or multi-line text input.

use larder_core::{component, h, Callback, EventHandler, Hooks, Props, VNode};

use crate::field_id;

/// Options for customizing a [`TextFieldWithOptions`].
#[derive(Clone, Debug, PartialEq)]
pub struct TextFieldOptions {
    /// Visible label. The field name is shown when `None`.
    pub label: Option<String>,
    pub placeholder: Option<String>,
    /// Controlled value. When `None` the field keeps its own state, seeded
    /// from `initial_value`.
    pub value: Option<String>,
    pub initial_value: String,
    /// `type` attribute of the input; ignored when `multiline` is set.
    pub input_type: String,
    /// Render a `textarea` instead of an `input`.
    pub multiline: bool,
    pub required: bool,
    /// Message shown under the control. The control is flagged with
    /// `aria-invalid` while it is set.
    pub error: Option<String>,
    /// Receives the new text after every keystroke.
    pub on_change: Option<Callback>,
}

impl Default for TextFieldOptions {
    fn default() -> Self {
        Self {
            label: None,
            placeholder: None,
            value: None,
            initial_value: String::new(),
            input_type: "text".to_string(),
            multiline: false,
            required: false,
            error: None,
            on_change: None,
        }
    }
}

/// Creates an uncontrolled text field with a label.
pub fn TextField(name: &str, label: &str) -> VNode {
    TextFieldWithOptions(
        name,
        TextFieldOptions {
            label: Some(label.to_string()),
            ..TextFieldOptions::default()
        },
    )
}

/// Creates a text field with custom options.
///
/// The control gets the id `field-<name>` so the label and error message can
/// refer to it. The input listener is memoized on `on_change`, so re-renders
/// with the same callback do not reinstall it.
pub fn TextFieldWithOptions(name: &str, options: TextFieldOptions) -> VNode {
    let props = Props::new()
        .with("name", name)
        .with("label", options.label)
        .with("placeholder", options.placeholder)
        .with("value", options.value)
        .with("initialValue", options.initial_value)
        .with("type", options.input_type)
        .with("multiline", options.multiline)
        .with("required", options.required)
        .with("error", options.error)
        .with("onChange", options.on_change);
    h(component(text_field), props, ())
}

fn text_field(hooks: &mut Hooks<'_>, props: &Props) -> VNode {
    let name = props.get_str("name").unwrap_or_default().to_string();
    let (local, set_local) =
        hooks.use_state(|| props.get_str("initialValue").unwrap_or_default().to_string());
    let on_change = props.callback("onChange").cloned();
    let on_input = hooks.use_memo(on_change.clone(), move || {
        EventHandler::new(move |event| {
            let text = event.value().unwrap_or_default().to_string();
            set_local.set(text.clone())?;
            match &on_change {
                Some(callback) => callback.call(text),
                None => Ok(()),
            }
        })
    });

    let value = props.get_str("value").map_or(local, str::to_string);
    let id = field_id(&name);
    let error_id = format!("{id}-error");
    let error = props.get_str("error").map(str::to_string);
    let label = props.get_str("label").unwrap_or(&name).to_string();

    let control = Props::new()
        .id(&id)
        .with("name", name.as_str())
        .with("value", value)
        .with("placeholder", props.get_str("placeholder"))
        .with("required", props.get_bool("required").unwrap_or(false))
        .with("aria-invalid", error.is_some().then_some("true"))
        .with("aria-describedby", error.as_ref().map(|_| error_id.as_str()))
        .on_handler("input", (*on_input).clone());
    let control = if props.get_bool("multiline").unwrap_or(false) {
        h("textarea", control, ())
    } else {
        let input_type = props.get_str("type").unwrap_or("text");
        h("input", control.with("type", input_type), ())
    };

    let class = if error.is_some() {
        "field field-invalid"
    } else {
        "field"
    };
    h(
        "div",
        Props::new().class(class),
        (
            h("label", Props::new().with("for", id.as_str()), label),
            control,
            error.map(|message| {
                h(
                    "p",
                    Props::new().id(error_id.as_str()).class("field-error"),
                    message,
                )
            }),
        ),
    )
}
