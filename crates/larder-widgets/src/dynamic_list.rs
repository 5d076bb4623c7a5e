//! Editable list of text rows with add and remove buttons.

use std::cell::RefCell;
use std::rc::Rc;

use larder_core::{
    component, h, Callback, Child, EventHandler, EventResult, Hooks, Props, Setter, VNode,
};

use crate::field_id;

#[derive(Clone, Debug, PartialEq)]
pub struct DynamicListOptions {
    pub label: Option<String>,
    /// Rows present on first render.
    pub items: Vec<String>,
    pub placeholder: Option<String>,
    pub add_label: String,
    pub remove_label: String,
    /// Receives the row texts, in order, after every edit, addition and
    /// removal.
    pub on_change: Option<Callback>,
}

impl Default for DynamicListOptions {
    fn default() -> Self {
        Self {
            label: None,
            items: Vec::new(),
            placeholder: None,
            add_label: "Add".to_string(),
            remove_label: "Remove".to_string(),
            on_change: None,
        }
    }
}

/// Creates a list whose rows the user can add, edit and remove.
///
/// Rows are keyed by an id that never changes, so removing a row in the
/// middle leaves the inputs of the other rows in place, together with any
/// focus or caret they hold.
pub fn DynamicList(name: &str, options: DynamicListOptions) -> VNode {
    let props = Props::new()
        .with("name", name)
        .with("label", options.label)
        .with("items", options.items)
        .with("placeholder", options.placeholder)
        .with("addLabel", options.add_label)
        .with("removeLabel", options.remove_label)
        .with("onChange", options.on_change);
    h(component(dynamic_list), props, ())
}

#[derive(Clone, Debug, PartialEq)]
struct Row {
    id: u64,
    text: String,
}

/// Applies `edit` to the current rows, stores them and reports the texts.
fn commit(
    set_rows: &Setter<Vec<Row>>,
    on_change: &Option<Callback>,
    edit: impl FnOnce(&mut Vec<Row>),
) -> EventResult {
    let mut rows = set_rows.get().unwrap_or_default();
    edit(&mut rows);
    let texts: Vec<String> = rows.iter().map(|row| row.text.clone()).collect();
    set_rows.set(rows)?;
    match on_change {
        Some(callback) => callback.call(texts),
        None => Ok(()),
    }
}

struct RowHandlers {
    input: EventHandler,
    remove: EventHandler,
}

fn row_handlers(set_rows: &Setter<Vec<Row>>, on_change: &Option<Callback>, id: u64) -> RowHandlers {
    let (edit_rows, edit_change) = (set_rows.clone(), on_change.clone());
    let (remove_rows, remove_change) = (set_rows.clone(), on_change.clone());
    RowHandlers {
        input: EventHandler::new(move |event| {
            let text = event.value().unwrap_or_default().to_string();
            commit(&edit_rows, &edit_change, |rows| {
                if let Some(row) = rows.iter_mut().find(|row| row.id == id) {
                    row.text = text;
                }
            })
        }),
        remove: EventHandler::new(move |_| {
            commit(&remove_rows, &remove_change, |rows| {
                rows.retain(|row| row.id != id)
            })
        }),
    }
}

fn dynamic_list(hooks: &mut Hooks<'_>, props: &Props) -> VNode {
    let name = props.get_str("name").unwrap_or_default().to_string();
    let (rows, set_rows) = hooks.use_state(|| {
        props
            .get_strings("items")
            .into_iter()
            .zip(0..)
            .map(|(text, id)| Row { id, text })
            .collect::<Vec<_>>()
    });
    let next_id = hooks.use_mut_ref(|| rows.len() as u64);
    let on_change = props.callback("onChange").cloned();

    let add = {
        let (set_rows, on_change) = (set_rows.clone(), on_change.clone());
        hooks.use_memo(on_change.clone(), move || {
            EventHandler::new(move |_| {
                let id = take_id(&next_id);
                commit(&set_rows, &on_change, |rows| {
                    rows.push(Row {
                        id,
                        text: String::new(),
                    })
                })
            })
        })
    };
    let ids: Vec<u64> = rows.iter().map(|row| row.id).collect();
    let handlers = hooks.use_memo((on_change.clone(), ids.clone()), move || {
        ids.iter()
            .map(|&id| row_handlers(&set_rows, &on_change, id))
            .collect::<Vec<_>>()
    });

    let id = field_id(&name);
    let label = props.get_str("label").unwrap_or(&name).to_string();
    let remove_label = props.get_str("removeLabel").unwrap_or("Remove");
    let items = rows.iter().zip(handlers.iter()).enumerate().map(|(index, (row, handlers))| {
        h(
            "li",
            Props::new().key(row.id as i64).class("dynamic-list-row"),
            (
                h(
                    "input",
                    Props::new()
                        .id(format!("{id}-{}", row.id))
                        .with("name", format!("{name}[]"))
                        .with("value", row.text.as_str())
                        .with("placeholder", props.get_str("placeholder"))
                        .with("aria-label", format!("{label} {}", index + 1))
                        .on_handler("input", handlers.input.clone()),
                    (),
                ),
                h(
                    "button",
                    Props::new()
                        .with("type", "button")
                        .class("dynamic-list-remove")
                        .on_handler("click", handlers.remove.clone()),
                    remove_label,
                ),
            ),
        )
    });

    h(
        "div",
        Props::new().id(&id).class("dynamic-list"),
        (
            h("span", Props::new().class("dynamic-list-label"), label.as_str()),
            h("ul", (), Child::list(items)),
            h(
                "button",
                Props::new()
                    .with("type", "button")
                    .class("dynamic-list-add")
                    .on_handler("click", (*add).clone()),
                props.get_str("addLabel").unwrap_or("Add"),
            ),
        ),
    )
}

fn take_id(next_id: &Rc<RefCell<u64>>) -> u64 {
    let mut next = next_id.borrow_mut();
    let id = *next;
    *next += 1;
    id
}
