use super::*;
use larder_core::{component, h, Hooks, Props};

fn toggle(hooks: &mut Hooks<'_>, _: &Props) -> VNode {
    let (on, set_on) = hooks.use_state(|| false);
    h(
        "label",
        (),
        (
            h(
                "input",
                Props::new()
                    .id("flag")
                    .with("type", "checkbox")
                    .with("checked", on)
                    .on("change", move |event| {
                        set_on.set(event.checked().unwrap_or(false))
                    }),
                (),
            ),
            if on { "on" } else { "off" },
        ),
    )
}

#[test]
fn set_content_renders_into_the_app_container() {
    let mut rule = RenderTestRule::new();
    assert!(!rule.has_content());
    rule.set_content(|| h("p", (), "hello")).expect("render");

    assert!(rule.has_content());
    assert_eq!(rule.text_content(), "hello");
    assert_eq!(rule.attribute(rule.container(), "id").as_deref(), Some("app"));
}

#[test]
fn clicking_a_checkbox_flips_it_and_reports_change() {
    run_test_render(|rule| {
        rule.set_content(|| h(component(toggle), (), ()))
            .expect("render");
        let input = rule.find_by_id("flag").expect("checkbox");

        rule.click(input).expect("click");
        assert!(rule.is_checked(input));
        assert_eq!(rule.text_content(), "on");

        rule.click(input).expect("click");
        assert!(!rule.is_checked(input));
        assert_eq!(rule.text_content(), "off");
    });
}

#[test]
fn submit_button_submits_the_enclosing_form() {
    use std::cell::Cell;
    use std::rc::Rc;

    let submitted = Rc::new(Cell::new(0));
    let seen = submitted.clone();
    let mut rule = RenderTestRule::new();
    rule.set_content(move || {
        let seen = seen.clone();
        h(
            "form",
            Props::new().on("submit", move |event| {
                event.prevent_default();
                seen.set(seen.get() + 1);
                Ok(())
            }),
            (
                h("button", Props::new().id("save"), "Save"),
                h("button", Props::new().id("cancel").with("type", "button"), "Cancel"),
            ),
        )
    })
    .expect("render");

    rule.click(rule.find_by_id("cancel").expect("cancel")).expect("click");
    assert_eq!(submitted.get(), 0);
    rule.click(rule.find_by_id("save").expect("save")).expect("click");
    assert_eq!(submitted.get(), 1);
}

#[test]
fn rerender_reuses_the_installed_content() {
    let mut rule = RenderTestRule::new();
    rule.set_content(|| h("ul", (), (h("li", (), "a"), h("li", (), "b"))))
        .expect("render");
    let first = rule.root_node();
    rule.rerender().expect("rerender");

    assert_eq!(rule.root_node(), first);
    assert_eq!(rule.find_all_by_tag("li").len(), 2);
    assert_eq!(rule.render_passes(), 2);
}
