//! Set of checkboxes sharing one name.

use std::rc::Rc;

use larder_core::{component, h, Callback, Child, EventHandler, Hooks, Props, Setter, VNode};

use crate::{field_id, SelectOption};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CheckboxGroupOptions {
    /// Text of the `legend`.
    pub label: Option<String>,
    pub options: Vec<SelectOption>,
    /// Values checked on first render.
    pub selected: Vec<String>,
    /// Receives the checked values, in option order, after every toggle.
    pub on_change: Option<Callback>,
}

/// Creates a `fieldset` with one checkbox per option.
///
/// The group owns its selection. Re-rendering with a different `selected`
/// list does not reset it.
pub fn CheckboxGroup(name: &str, options: CheckboxGroupOptions) -> VNode {
    let props = Props::new()
        .with("name", name)
        .with("label", options.label)
        .with("options", SelectOption::to_list(options.options))
        .with("selected", options.selected)
        .with("onChange", options.on_change);
    h(component(checkbox_group), props, ())
}

/// Selection after `value` was switched to `checked`, kept in option order.
fn toggled(current: &[String], all: &[String], value: &str, checked: bool) -> Vec<String> {
    all.iter()
        .filter(|candidate| {
            if candidate.as_str() == value {
                checked
            } else {
                current.contains(candidate)
            }
        })
        .cloned()
        .collect()
}

fn toggle_handler(
    set_selected: Setter<Vec<String>>,
    on_change: Option<Callback>,
    all: Rc<Vec<String>>,
    value: String,
) -> EventHandler {
    EventHandler::new(move |event| {
        let checked = event.checked().unwrap_or(false);
        let current = set_selected.get().unwrap_or_default();
        let next = toggled(&current, &all, &value, checked);
        set_selected.set(next.clone())?;
        match &on_change {
            Some(callback) => callback.call(next),
            None => Ok(()),
        }
    })
}

fn checkbox_group(hooks: &mut Hooks<'_>, props: &Props) -> VNode {
    let name = props.get_str("name").unwrap_or_default().to_string();
    let options = SelectOption::list_from(props, "options");
    let values: Vec<String> = options.iter().map(|option| option.value.clone()).collect();

    let (selected, set_selected) = hooks.use_state(|| props.get_strings("selected"));
    let on_change = props.callback("onChange").cloned();
    let handlers = hooks.use_memo((on_change.clone(), values.clone()), move || {
        let all = Rc::new(values);
        all.iter()
            .map(|value| {
                toggle_handler(
                    set_selected.clone(),
                    on_change.clone(),
                    Rc::clone(&all),
                    value.clone(),
                )
            })
            .collect::<Vec<_>>()
    });

    let id = field_id(&name);
    let boxes = options.iter().zip(handlers.iter()).map(|(option, handler)| {
        let box_id = format!("{id}-{}", option.value);
        h(
            "label",
            Props::new()
                .key(option.value.as_str())
                .class("checkbox")
                .with("for", box_id.as_str()),
            (
                h(
                    "input",
                    Props::new()
                        .id(box_id.as_str())
                        .with("type", "checkbox")
                        .with("name", name.as_str())
                        .with("value", option.value.as_str())
                        .with("checked", selected.contains(&option.value))
                        .on_handler("change", handler.clone()),
                    (),
                ),
                option.label.as_str(),
            ),
        )
    });

    h(
        "fieldset",
        Props::new().id(&id).class("checkbox-group"),
        (
            props.get_str("label").map(|label| h("legend", (), label)),
            Child::list(boxes),
        ),
    )
}
