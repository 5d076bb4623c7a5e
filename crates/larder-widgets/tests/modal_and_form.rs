use std::cell::Cell;
use std::rc::Rc;

use larder_core::{component, h, Callback, HostDocument, Hooks, Props, VNode};
use larder_testing::assertions::{assert_contains_text, assert_not_contains_text};
use larder_testing::RenderTestRule;
use larder_widgets::{Form, FormOptions, Modal, ModalOptions, TextField};

fn confirm_dialog(hooks: &mut Hooks<'_>, _: &Props) -> VNode {
    let (open, set_open) = hooks.use_state(|| true);
    let on_close = Callback::new(move |_| set_open.set(false));
    Modal(
        ModalOptions {
            open,
            title: "Remove item".into(),
            id: "confirm".into(),
            on_close: Some(on_close),
            ..ModalOptions::default()
        },
        h("p", Props::new().id("confirm-text"), "Remove milk from the pantry?"),
    )
}

fn open_dialog(rule: &mut RenderTestRule) {
    rule.set_content(|| h(component(confirm_dialog), (), ()))
        .expect("render");
    assert_contains_text(rule, "Remove milk", "dialog body");
}

#[test]
fn closed_modal_renders_nothing() {
    let mut rule = RenderTestRule::new();
    rule.set_content(|| Modal(ModalOptions::default(), "hidden"))
        .expect("render");

    assert_eq!(rule.text_content(), "");
    assert!(rule.find_all_by_tag("div").is_empty());
}

#[test]
fn dialog_is_labelled_by_its_title() {
    let mut rule = RenderTestRule::new();
    open_dialog(&mut rule);

    let dialog = rule.find_by_id("confirm").expect("dialog");
    assert_eq!(rule.attribute(dialog, "role").as_deref(), Some("dialog"));
    assert_eq!(
        rule.attribute(dialog, "aria-labelledby").as_deref(),
        Some("confirm-title")
    );
    let title = rule.find_by_id("confirm-title").expect("title");
    assert_eq!(rule.document().text_content(title), "Remove item");
}

#[test]
fn escape_requests_close() {
    let mut rule = RenderTestRule::new();
    open_dialog(&mut rule);

    let body = rule.find_by_id("confirm-text").expect("body");
    rule.key_down(body, "Enter").expect("key");
    assert_contains_text(&rule, "Remove milk", "other keys are ignored");

    rule.key_down(body, "Escape").expect("key");
    assert_not_contains_text(&rule, "Remove milk", "escape closes");
    assert!(rule.find_by_id("confirm").is_none());
}

#[test]
fn only_a_click_on_the_backdrop_itself_closes() {
    let mut rule = RenderTestRule::new();
    open_dialog(&mut rule);

    let body = rule.find_by_id("confirm-text").expect("body");
    rule.click(body).expect("click");
    assert_contains_text(&rule, "Remove milk", "click inside the dialog");

    let dialog = rule.find_by_id("confirm").expect("dialog");
    let backdrop = rule.document().parent(dialog).expect("backdrop");
    rule.click(backdrop).expect("click");
    assert_not_contains_text(&rule, "Remove milk", "click on the backdrop");
}

#[test]
fn close_button_requests_close() {
    let mut rule = RenderTestRule::new();
    open_dialog(&mut rule);

    let close = rule.find_by_text("\u{00d7}").expect("close button");
    rule.click(close).expect("click");
    assert_eq!(rule.text_content(), "");
}

#[test]
fn submit_button_calls_on_submit_without_navigating() {
    let submitted = Rc::new(Cell::new(0));
    let count = submitted.clone();
    let on_submit = Callback::new(move |_| {
        count.set(count.get() + 1);
        Ok(())
    });
    let mut rule = RenderTestRule::new();
    rule.set_content(move || {
        Form(
            FormOptions {
                id: Some("add-item".into()),
                submit_label: Some("Save".into()),
                on_submit: Some(on_submit.clone()),
                ..FormOptions::default()
            },
            TextField("item", "Item"),
        )
    })
    .expect("render");

    let save = rule.find_by_text("Save").expect("save button");
    rule.click(save).expect("click");
    assert_eq!(submitted.get(), 1);

    let form = rule.find_by_id("add-item").expect("form");
    assert!(rule.submit(form).expect("submit"), "default prevented");
    assert_eq!(submitted.get(), 2);
    assert!(rule.find_by_id("field-item").is_some());
}
