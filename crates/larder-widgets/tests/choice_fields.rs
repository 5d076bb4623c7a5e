use std::cell::RefCell;
use std::rc::Rc;

use larder_core::{Callback, PropValue};
use larder_testing::RenderTestRule;
use larder_widgets::{
    CheckboxGroup, CheckboxGroupOptions, SelectField, SelectFieldOptions, SelectOption,
};

fn units() -> Vec<SelectOption> {
    vec![
        SelectOption::new("g", "grams"),
        SelectOption::new("kg", "kilograms"),
        SelectOption::new("cups", "cups"),
    ]
}

fn recorder() -> (Rc<RefCell<Vec<PropValue>>>, Callback) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let callback = Callback::new(move |value| {
        sink.borrow_mut().push(value);
        Ok(())
    });
    (seen, callback)
}

fn strings(value: &PropValue) -> Vec<&str> {
    value
        .as_list()
        .unwrap_or_default()
        .iter()
        .filter_map(PropValue::as_str)
        .collect()
}

#[test]
fn select_starts_on_the_first_option() {
    let mut rule = RenderTestRule::new();
    rule.set_content(|| {
        SelectField(
            "unit",
            SelectFieldOptions {
                options: units(),
                ..SelectFieldOptions::default()
            },
        )
    })
    .expect("render");

    let select = rule.find_by_id("field-unit").expect("select");
    assert_eq!(rule.value(select).as_deref(), Some("g"));
    assert_eq!(rule.find_all_by_tag("option").len(), 3);
}

#[test]
fn placeholder_is_selected_until_the_user_picks() {
    let (seen, on_change) = recorder();
    let mut rule = RenderTestRule::new();
    rule.set_content(move || {
        SelectField(
            "unit",
            SelectFieldOptions {
                label: Some("Unit".into()),
                options: units(),
                placeholder: Some("Choose a unit".into()),
                on_change: Some(on_change.clone()),
                ..SelectFieldOptions::default()
            },
        )
    })
    .expect("render");

    let select = rule.find_by_id("field-unit").expect("select");
    assert_eq!(rule.value(select).as_deref(), Some(""));
    assert_eq!(rule.find_all_by_tag("option").len(), 4);

    rule.select(select, "kg").expect("select");
    assert_eq!(rule.value(select).as_deref(), Some("kg"));
    assert_eq!(*seen.borrow(), vec![PropValue::from("kg")]);
}

#[test]
fn checkbox_group_reports_selection_in_option_order() {
    let (seen, on_change) = recorder();
    let mut rule = RenderTestRule::new();
    rule.set_content(move || {
        CheckboxGroup(
            "tags",
            CheckboxGroupOptions {
                label: Some("Tags".into()),
                options: vec!["dairy".into(), "frozen".into(), "vegan".into()],
                selected: vec!["vegan".to_string()],
                on_change: Some(on_change.clone()),
            },
        )
    })
    .expect("render");

    let dairy = rule.find_by_id("field-tags-dairy").expect("dairy");
    let vegan = rule.find_by_id("field-tags-vegan").expect("vegan");
    assert!(rule.is_checked(vegan));
    assert!(!rule.is_checked(dairy));

    rule.click(dairy).expect("click");
    rule.click(vegan).expect("click");

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(strings(&seen[0]), vec!["dairy", "vegan"]);
    assert_eq!(strings(&seen[1]), vec!["dairy"]);
    assert!(rule.is_checked(dairy));
    assert!(!rule.is_checked(vegan));
}

#[test]
fn checkbox_group_keeps_its_selection_across_rerenders() {
    let mut rule = RenderTestRule::new();
    rule.set_content(|| {
        CheckboxGroup(
            "tags",
            CheckboxGroupOptions {
                options: vec!["dairy".into(), "frozen".into()],
                ..CheckboxGroupOptions::default()
            },
        )
    })
    .expect("render");

    let frozen = rule.find_by_id("field-tags-frozen").expect("frozen");
    rule.click(frozen).expect("click");
    rule.rerender().expect("rerender");
    assert!(rule.is_checked(frozen));
    assert!(rule.find_by_text("frozen").is_some());
}
