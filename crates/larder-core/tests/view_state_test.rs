//! Focus, caret and scroll position across re-renders.

use larder_core::{
    component, h, EventHandler, HostDocument, Hooks, Props, RuntimeConfig, ScrollOffset, Selection,
    VNode,
};
use larder_testing::assertions::assert_no_property_writes;
use larder_testing::RenderTestRule;

fn controlled(hooks: &mut Hooks<'_>, _: &Props) -> VNode {
    let (text, set_text) = hooks.use_state(String::new);
    let on_input = hooks.use_memo((), move || {
        EventHandler::new(move |event| set_text.set(event.value().unwrap_or_default().to_string()))
    });
    h(
        "input",
        Props::new()
            .id("item")
            .with("value", text.as_str())
            .on_handler("input", (*on_input).clone()),
        (),
    )
}

#[test]
fn echoing_the_typed_value_writes_nothing_and_keeps_the_caret() {
    let mut rule = RenderTestRule::new();
    rule.set_content(|| h(component(controlled), (), ()))
        .expect("render");
    let input = rule.find_by_id("item").expect("input");
    rule.focus(input).expect("focus");

    rule.document_mut().reset_stats();
    rule.input_with_selection(input, "Milk", Some(Selection::new(1, 3)))
        .expect("input");

    assert_eq!(rule.render_passes(), 2);
    assert_no_property_writes(rule.document().stats(), "echoed value");
    assert_eq!(rule.value(input).as_deref(), Some("Milk"));
    assert_eq!(rule.document().selection(input), Some(Selection::new(1, 3)));
    assert_eq!(rule.focused(), Some(input));
}

fn search_panel(wide: bool) -> VNode {
    let children = (
        h(
            "input",
            Props::new().id("search").with("value", "rice"),
            (),
        ),
        h(
            "ul",
            Props::new().with("data-preserve-scroll", "results"),
            (h("li", (), "brown rice"), h("li", (), "rice flour")),
        ),
    );
    if wide {
        h("section", (), children)
    } else {
        h("div", (), children)
    }
}

#[test]
fn focus_and_scroll_survive_a_root_kind_change() {
    let rule = RenderTestRule::new();
    rule.render(search_panel(false)).expect("render");
    let input = rule.find_by_id("search").expect("input");
    let list = rule.find_all_by_tag("ul")[0];
    rule.focus(input).expect("focus");
    rule.document_mut()
        .set_selection(input, Selection::caret(2))
        .expect("selection");
    rule.document_mut()
        .set_scroll_offset(list, ScrollOffset::new(120, 0))
        .expect("scroll");

    rule.render(search_panel(true)).expect("render");

    let new_input = rule.find_by_id("search").expect("input");
    let new_list = rule.find_all_by_tag("ul")[0];
    assert_ne!(new_input, input, "the input was remounted");
    assert!(!rule.document().is_live(input));
    assert_eq!(rule.focused(), Some(new_input));
    assert_eq!(rule.document().selection(new_input), Some(Selection::caret(2)));
    assert_eq!(
        rule.document().scroll_offset(new_list),
        Some(ScrollOffset::new(120, 0))
    );
}

#[test]
fn focus_can_be_matched_by_a_custom_attribute() {
    let config = RuntimeConfig::default().with_focus_attributes(["data-field"]);
    let rule = RenderTestRule::with_config(config);
    let form = |tag: &str| {
        h(
            tag,
            (),
            h("textarea", Props::new().with("data-field", "notes"), ()),
        )
    };

    rule.render(form("div")).expect("render");
    let notes = rule.find_all_by_tag("textarea")[0];
    rule.focus(notes).expect("focus");

    rule.render(form("form")).expect("render");
    let replaced = rule.find_all_by_tag("textarea")[0];
    assert_ne!(replaced, notes);
    assert_eq!(rule.focused(), Some(replaced));
}
