//! Labelled drop-down list.

use larder_core::{component, h, Callback, EventHandler, Hooks, PropValue, Props, VNode};

use crate::field_id;

/// One choice of a [`SelectField`] or [`CheckboxGroup`](crate::CheckboxGroup).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Reads an option back from the `[value, label]` pair it travels as.
    pub fn from_prop(value: &PropValue) -> Option<Self> {
        match value.as_list()? {
            [value, label] => Some(Self::new(value.as_str()?, label.as_str()?)),
            _ => None,
        }
    }

    pub(crate) fn list_from(props: &Props, name: &str) -> Vec<Self> {
        props
            .get_list(name)
            .unwrap_or_default()
            .iter()
            .filter_map(Self::from_prop)
            .collect()
    }

    pub(crate) fn to_list(options: Vec<Self>) -> PropValue {
        PropValue::List(options.into_iter().map(PropValue::from).collect())
    }
}

impl From<&str> for SelectOption {
    fn from(value: &str) -> Self {
        Self::new(value, value)
    }
}

impl From<SelectOption> for PropValue {
    fn from(option: SelectOption) -> Self {
        PropValue::List(vec![option.value.into(), option.label.into()])
    }
}

/// Options for customizing a [`SelectField`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectFieldOptions {
    pub label: Option<String>,
    pub options: Vec<SelectOption>,
    /// Controlled value. When `None` the field keeps its own selection.
    pub value: Option<String>,
    /// Starting selection of an uncontrolled field. Defaults to the
    /// placeholder if there is one, otherwise the first option.
    pub initial_value: Option<String>,
    /// Leading empty choice, e.g. "Choose a unit".
    pub placeholder: Option<String>,
    pub required: bool,
    pub on_change: Option<Callback>,
}

/// Creates a `select` with a label.
pub fn SelectField(name: &str, options: SelectFieldOptions) -> VNode {
    let props = Props::new()
        .with("name", name)
        .with("label", options.label)
        .with("options", SelectOption::to_list(options.options))
        .with("value", options.value)
        .with("initialValue", options.initial_value)
        .with("placeholder", options.placeholder)
        .with("required", options.required)
        .with("onChange", options.on_change);
    h(component(select_field), props, ())
}

fn select_field(hooks: &mut Hooks<'_>, props: &Props) -> VNode {
    let name = props.get_str("name").unwrap_or_default().to_string();
    let options = SelectOption::list_from(props, "options");
    let placeholder = props.get_str("placeholder").map(str::to_string);

    let (local, set_local) = hooks.use_state(|| {
        props
            .get_str("initialValue")
            .map(str::to_string)
            .or_else(|| {
                if placeholder.is_some() {
                    Some(String::new())
                } else {
                    options.first().map(|option| option.value.clone())
                }
            })
            .unwrap_or_default()
    });
    let on_change = props.callback("onChange").cloned();
    let on_select = hooks.use_memo(on_change.clone(), move || {
        EventHandler::new(move |event| {
            let value = event.value().unwrap_or_default().to_string();
            set_local.set(value.clone())?;
            match &on_change {
                Some(callback) => callback.call(value),
                None => Ok(()),
            }
        })
    });

    let value = props.get_str("value").map_or(local, str::to_string);
    let id = field_id(&name);
    let label = props.get_str("label").unwrap_or(&name).to_string();

    let mut choices = Vec::with_capacity(options.len() + 1);
    if let Some(text) = placeholder {
        choices.push(h("option", Props::new().with("value", ""), text));
    }
    choices.extend(options.iter().map(|option| {
        h(
            "option",
            Props::new().with("value", option.value.as_str()),
            option.label.as_str(),
        )
    }));

    h(
        "div",
        Props::new().class("field"),
        (
            h("label", Props::new().with("for", id.as_str()), label),
            h(
                "select",
                Props::new()
                    .id(&id)
                    .with("name", name.as_str())
                    .with("value", value)
                    .with("required", props.get_bool("required").unwrap_or(false))
                    .on_handler("change", (*on_select).clone()),
                choices,
            ),
        ),
    )
}
