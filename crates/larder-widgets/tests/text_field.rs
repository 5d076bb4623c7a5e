use std::cell::RefCell;
use std::rc::Rc;

use larder_core::{component, Callback, Hooks, Props, VNode};
use larder_testing::assertions::{assert_attribute, assert_no_property_writes};
use larder_testing::RenderTestRule;
use larder_widgets::{TextField, TextFieldOptions, TextFieldWithOptions};

fn recorder() -> (Rc<RefCell<Vec<String>>>, Callback) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let callback = Callback::new(move |value| {
        sink.borrow_mut()
            .push(value.as_str().unwrap_or_default().to_string());
        Ok(())
    });
    (seen, callback)
}

#[test]
fn label_points_at_the_control() {
    let mut rule = RenderTestRule::new();
    rule.set_content(|| TextField("item", "Item name")).expect("render");

    let input = rule.find_by_id("field-item").expect("input");
    let label = rule.find_by_text("Item name").expect("label");
    assert_attribute(&rule, label, "for", Some("field-item"));
    assert_attribute(&rule, input, "name", Some("item"));
    assert_attribute(&rule, input, "type", Some("text"));
}

#[test]
fn typing_keeps_the_text_and_reports_it() {
    let (seen, on_change) = recorder();
    let mut rule = RenderTestRule::new();
    rule.set_content(move || {
        TextFieldWithOptions(
            "item",
            TextFieldOptions {
                on_change: Some(on_change.clone()),
                ..TextFieldOptions::default()
            },
        )
    })
    .expect("render");

    let input = rule.find_by_id("field-item").expect("input");
    rule.input(input, "Milk").expect("input");
    rule.input(input, "Milk 2%").expect("input");

    assert_eq!(rule.value(input).as_deref(), Some("Milk 2%"));
    assert_eq!(*seen.borrow(), vec!["Milk".to_string(), "Milk 2%".to_string()]);
}

#[test]
fn rerender_with_the_same_callback_writes_nothing() {
    let (_, on_change) = recorder();
    let mut rule = RenderTestRule::new();
    rule.set_content(move || {
        TextFieldWithOptions(
            "note",
            TextFieldOptions {
                label: Some("Note".into()),
                multiline: true,
                on_change: Some(on_change.clone()),
                ..TextFieldOptions::default()
            },
        )
    })
    .expect("render");
    assert_eq!(rule.find_all_by_tag("textarea").len(), 1);

    rule.document_mut().reset_stats();
    rule.rerender().expect("rerender");
    assert_no_property_writes(rule.document().stats(), "second render");
}

fn shouting_field(hooks: &mut Hooks<'_>, _: &Props) -> VNode {
    let (text, set_text) = hooks.use_state(String::new);
    let on_change = Callback::new(move |value| {
        set_text.set(value.as_str().unwrap_or_default().to_uppercase())
    });
    TextFieldWithOptions(
        "shout",
        TextFieldOptions {
            value: Some(text),
            on_change: Some(on_change),
            ..TextFieldOptions::default()
        },
    )
}

#[test]
fn controlled_value_follows_the_owner() {
    let mut rule = RenderTestRule::new();
    rule.set_content(|| larder_core::h(component(shouting_field), (), ()))
        .expect("render");

    let input = rule.find_by_id("field-shout").expect("input");
    rule.input(input, "milk").expect("input");
    assert_eq!(rule.value(input).as_deref(), Some("MILK"));
}

#[test]
fn error_message_marks_the_field_invalid() {
    let mut rule = RenderTestRule::new();
    rule.set_content(|| {
        TextFieldWithOptions(
            "quantity",
            TextFieldOptions {
                input_type: "number".into(),
                error: Some("Quantity is required".into()),
                ..TextFieldOptions::default()
            },
        )
    })
    .expect("render");

    let input = rule.find_by_id("field-quantity").expect("input");
    assert_attribute(&rule, input, "type", Some("number"));
    assert_attribute(&rule, input, "aria-invalid", Some("true"));
    assert_attribute(&rule, input, "aria-describedby", Some("field-quantity-error"));
    let message = rule.find_by_id("field-quantity-error").expect("message");
    assert_eq!(rule.document().text_content(message), "Quantity is required");
}
