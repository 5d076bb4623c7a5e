//! The pantry screen: an add-item form, the current stock and a
//! confirmation dialog.

use std::cell::RefCell;
use std::rc::Rc;

use larder_core::{component, h, Callback, EventResult, Hooks, PropValue, Props, Setter, VNode};
use larder_widgets::{
    CheckboxGroup, CheckboxGroupOptions, DynamicList, DynamicListOptions, Form, FormOptions,
    Modal, ModalOptions, SelectField, SelectFieldOptions, SelectOption, TextFieldOptions,
    TextFieldWithOptions,
};

pub const UNITS: &[(&str, &str)] = &[
    ("pieces", "Pieces"),
    ("g", "Grams"),
    ("kg", "Kilograms"),
    ("lbs", "Pounds"),
    ("cups", "Cups"),
    ("sticks", "Sticks"),
];

pub const LOCATIONS: &[(&str, &str)] = &[
    ("fridge", "Fridge"),
    ("freezer", "Freezer"),
    ("shelf", "Shelf"),
];

const MAX_NAME_LEN: usize = 100;

#[derive(Clone, Debug, PartialEq)]
pub struct PantryItem {
    pub id: u64,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub locations: Vec<String>,
    pub notes: Vec<String>,
}

impl PantryItem {
    pub fn summary(&self) -> String {
        format!("{} {} {}", self.quantity, self.unit, self.name)
    }
}

/// Field values of the add-item form as the user types them.
#[derive(Clone, Debug, PartialEq)]
pub struct Draft {
    pub name: String,
    pub quantity: String,
    pub unit: String,
    pub locations: Vec<String>,
    pub notes: Vec<String>,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            name: String::new(),
            quantity: String::new(),
            unit: UNITS[0].0.to_string(),
            locations: Vec::new(),
            notes: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DraftErrors {
    pub name: Option<String>,
    pub quantity: Option<String>,
}

impl DraftErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.quantity.is_none()
    }
}

/// Checks the required fields and parses the quantity.
pub fn validate(name: &str, quantity: &str) -> Result<f64, DraftErrors> {
    let mut errors = DraftErrors::default();
    let name = name.trim();
    if name.is_empty() {
        errors.name = Some("Name is required".to_string());
    } else if name.chars().count() > MAX_NAME_LEN {
        errors.name = Some(format!("Name must be under {MAX_NAME_LEN} characters"));
    }

    let quantity = quantity.trim();
    let parsed = if quantity.is_empty() {
        errors.quantity = Some("Quantity is required".to_string());
        None
    } else {
        match quantity.parse::<f64>() {
            Ok(value) if value.is_finite() && value > 0.0 => Some(value),
            Ok(_) => {
                errors.quantity = Some("Quantity must be greater than zero".to_string());
                None
            }
            Err(_) => {
                errors.quantity = Some("Quantity must be a number".to_string());
                None
            }
        }
    };

    match parsed {
        Some(value) if errors.is_empty() => Ok(value),
        _ => Err(errors),
    }
}

fn choices(table: &[(&str, &str)]) -> Vec<SelectOption> {
    table
        .iter()
        .map(|(value, label)| SelectOption::new(*value, *label))
        .collect()
}

fn text_of(value: &PropValue) -> String {
    value.as_str().unwrap_or_default().to_string()
}

fn strings_of(value: &PropValue) -> Vec<String> {
    value
        .as_list()
        .unwrap_or_default()
        .iter()
        .filter_map(PropValue::as_str)
        .map(str::to_string)
        .collect()
}

/// State setters of the pantry screen. Every handle is stable across
/// renders, so the callbacks built from it are created once.
#[derive(Clone)]
struct PantryState {
    items: Setter<Vec<PantryItem>>,
    draft: Setter<Draft>,
    errors: Setter<DraftErrors>,
    added: Setter<Option<String>>,
    generation: Setter<u64>,
    next_id: Rc<RefCell<u64>>,
}

impl PantryState {
    fn edit(&self, change: impl FnOnce(&mut Draft)) -> EventResult {
        self.draft.update(|draft| {
            let mut next = draft.clone();
            change(&mut next);
            next
        })
    }

    fn submit(&self) -> EventResult {
        let draft = self.draft.get().unwrap_or_default();
        let quantity = match validate(&draft.name, &draft.quantity) {
            Ok(quantity) => quantity,
            Err(errors) => {
                log::debug!("rejected draft: {errors:?}");
                return self.errors.set(errors);
            }
        };

        let id = {
            let mut next_id = self.next_id.borrow_mut();
            *next_id += 1;
            *next_id - 1
        };
        let item = PantryItem {
            id,
            name: draft.name.trim().to_string(),
            quantity,
            unit: draft.unit,
            locations: draft.locations,
            notes: draft.notes.into_iter().filter(|note| !note.trim().is_empty()).collect(),
        };
        log::info!("added {}", item.summary());
        let name = item.name.clone();

        self.items.update(|items| {
            let mut next = items.clone();
            next.push(item);
            next
        })?;
        self.errors.set(DraftErrors::default())?;
        self.draft.set(Draft::default())?;
        self.generation.update(|generation| generation + 1)?;
        self.added.set(Some(name))
    }
}

/// Callbacks handed to the widgets.
struct PantryCallbacks {
    name: Callback,
    quantity: Callback,
    unit: Callback,
    locations: Callback,
    notes: Callback,
    submit: Callback,
    close: Callback,
}

impl PantryCallbacks {
    fn new(state: PantryState) -> Self {
        let name = {
            let state = state.clone();
            Callback::new(move |value| state.edit(|draft| draft.name = text_of(&value)))
        };
        let quantity = {
            let state = state.clone();
            Callback::new(move |value| state.edit(|draft| draft.quantity = text_of(&value)))
        };
        let unit = {
            let state = state.clone();
            Callback::new(move |value| state.edit(|draft| draft.unit = text_of(&value)))
        };
        let locations = {
            let state = state.clone();
            Callback::new(move |value| state.edit(|draft| draft.locations = strings_of(&value)))
        };
        let notes = {
            let state = state.clone();
            Callback::new(move |value| state.edit(|draft| draft.notes = strings_of(&value)))
        };
        let submit = {
            let state = state.clone();
            Callback::new(move |_| state.submit())
        };
        let close = Callback::new(move |_| state.added.set(None));
        Self {
            name,
            quantity,
            unit,
            locations,
            notes,
            submit,
            close,
        }
    }
}

fn pantry_app(hooks: &mut Hooks<'_>, _: &Props) -> VNode {
    let (items, set_items) = hooks.use_state(Vec::<PantryItem>::new);
    let (_, set_draft) = hooks.use_state(Draft::default);
    let (errors, set_errors) = hooks.use_state(DraftErrors::default);
    let (added, set_added) = hooks.use_state(|| None::<String>);
    let (generation, set_generation) = hooks.use_state(|| 0u64);
    let next_id = hooks.use_mut_ref(|| 1u64);

    let callbacks = hooks.use_memo((), move || {
        PantryCallbacks::new(PantryState {
            items: set_items,
            draft: set_draft,
            errors: set_errors,
            added: set_added,
            generation: set_generation,
            next_id,
        })
    });

    let item_count = items.len();
    hooks.use_effect(item_count, move |scope| {
        log::debug!("pantry holds {item_count} items");
        scope.done()
    });

    let form = Form(
        FormOptions {
            id: Some("add-item".to_string()),
            submit_label: Some("Add to pantry".to_string()),
            on_submit: Some(callbacks.submit.clone()),
            ..FormOptions::default()
        },
        (
            TextFieldWithOptions(
                "name",
                TextFieldOptions {
                    label: Some("Item".to_string()),
                    placeholder: Some("e.g. flour".to_string()),
                    required: true,
                    error: errors.name.clone(),
                    on_change: Some(callbacks.name.clone()),
                    ..TextFieldOptions::default()
                },
            ),
            TextFieldWithOptions(
                "quantity",
                TextFieldOptions {
                    label: Some("Quantity".to_string()),
                    input_type: "number".to_string(),
                    required: true,
                    error: errors.quantity.clone(),
                    on_change: Some(callbacks.quantity.clone()),
                    ..TextFieldOptions::default()
                },
            ),
            SelectField(
                "unit",
                SelectFieldOptions {
                    label: Some("Unit".to_string()),
                    options: choices(UNITS),
                    on_change: Some(callbacks.unit.clone()),
                    ..SelectFieldOptions::default()
                },
            ),
            CheckboxGroup(
                "location",
                CheckboxGroupOptions {
                    label: Some("Stored in".to_string()),
                    options: choices(LOCATIONS),
                    on_change: Some(callbacks.locations.clone()),
                    ..CheckboxGroupOptions::default()
                },
            ),
            DynamicList(
                "notes",
                DynamicListOptions {
                    label: Some("Note".to_string()),
                    add_label: "Add note".to_string(),
                    on_change: Some(callbacks.notes.clone()),
                    ..DynamicListOptions::default()
                },
            ),
        ),
    );

    // The form is the only keyed child of its slot, so bumping the
    // generation after a successful add mounts a fresh, empty form.
    let form_slot = h(
        "div",
        Props::new().class("add-item-slot"),
        h(
            "section",
            Props::new().key(generation as i64).class("add-item"),
            form,
        ),
    );

    let stock = if items.is_empty() {
        h("p", Props::new().class("empty"), "Nothing in the pantry yet.")
    } else {
        h(
            "ul",
            Props::new()
                .id("stock")
                .class("stock")
                .with("data-preserve-scroll", "stock"),
            items.iter().map(stock_row).collect::<Vec<_>>(),
        )
    };

    let dialog = Modal(
        ModalOptions {
            open: added.is_some(),
            title: "Item added".to_string(),
            id: "added".to_string(),
            on_close: Some(callbacks.close.clone()),
            ..ModalOptions::default()
        },
        h(
            "p",
            (),
            format!("{} was added to the pantry.", added.unwrap_or_default()),
        ),
    );

    h(
        "main",
        Props::new().id("pantry").class("pantry"),
        (h("h1", (), "Pantry"), form_slot, stock, dialog),
    )
}

fn stock_row(item: &PantryItem) -> VNode {
    let places = if item.locations.is_empty() {
        None
    } else {
        Some(h(
            "span",
            Props::new().class("stock-locations"),
            item.locations.join(", "),
        ))
    };
    let notes = (!item.notes.is_empty()).then(|| {
        h(
            "ul",
            Props::new().class("stock-notes"),
            item.notes
                .iter()
                .map(|note| h("li", (), note.as_str()))
                .collect::<Vec<_>>(),
        )
    });
    h(
        "li",
        Props::new().key(item.id as i64).class("stock-item"),
        (
            h("span", Props::new().class("stock-summary"), item.summary()),
            places,
            notes,
        ),
    )
}

/// Description of the whole pantry screen.
pub fn pantry_root() -> VNode {
    h(component(pantry_app), (), ())
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
