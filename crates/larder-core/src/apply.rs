//! Writes element properties onto live nodes.

use crate::error::HostError;
use crate::host::{is_form_control, HostDocument};
use crate::props::{css_property_name, PropValue, Props, Style, CHILDREN, KEY, REF};
use crate::NodeId;

/// `onClick` -> `click`. Plain `on` is not an event property.
fn event_name(prop: &str) -> Option<String> {
    prop.strip_prefix("on")
        .filter(|rest| rest.starts_with(|c: char| c.is_ascii_uppercase()))
        .map(str::to_ascii_lowercase)
}

fn is_reserved(name: &str) -> bool {
    name == CHILDREN || name == KEY
}

/// Brings the properties of `node` from `previous` (absent on mount) to
/// `next`.
pub(crate) fn apply_props<D: HostDocument + ?Sized>(
    document: &mut D,
    node: NodeId,
    tag: &str,
    previous: Option<&Props>,
    next: &Props,
) -> Result<(), HostError> {
    if let Some(previous) = previous {
        for (name, old) in previous.iter() {
            if is_reserved(name) || next.contains(name) {
                continue;
            }
            clear_prop(document, node, tag, name, old)?;
        }
    }
    for (name, value) in next.iter() {
        if is_reserved(name) {
            continue;
        }
        let old = previous.and_then(|props| props.get(name));
        set_prop(document, node, tag, name, old, value)?;
    }
    Ok(())
}

fn clear_prop<D: HostDocument + ?Sized>(
    document: &mut D,
    node: NodeId,
    tag: &str,
    name: &str,
    old: &PropValue,
) -> Result<(), HostError> {
    if let (Some(event), PropValue::Handler(_)) = (event_name(name), old) {
        return document.set_listener(node, &event, None);
    }
    match name {
        REF => {
            if let PropValue::Ref(node_ref) = old {
                node_ref.release(node);
            }
            Ok(())
        }
        "className" | "class" => document.set_class_name(node, ""),
        "checked" if tag == "input" => document.set_checked(node, false),
        _ => document.remove_attribute(node, name),
    }
}

fn set_prop<D: HostDocument + ?Sized>(
    document: &mut D,
    node: NodeId,
    tag: &str,
    name: &str,
    old: Option<&PropValue>,
    value: &PropValue,
) -> Result<(), HostError> {
    if let Some(event) = event_name(name) {
        match (old, value) {
            (Some(PropValue::Handler(previous)), PropValue::Handler(handler))
                if previous.ptr_eq(handler) =>
            {
                return Ok(());
            }
            (_, PropValue::Handler(handler)) => {
                return document.set_listener(node, &event, Some(handler.clone()));
            }
            (Some(PropValue::Handler(_)), _) => document.set_listener(node, &event, None)?,
            _ => {}
        }
    }
    match (name, value) {
        (REF, PropValue::Ref(node_ref)) => {
            if let Some(PropValue::Ref(previous)) = old {
                if !previous.ptr_eq(node_ref) {
                    previous.release(node);
                }
            }
            node_ref.bind(node);
            Ok(())
        }
        ("style", PropValue::Style(style)) => apply_style(document, node, old, style),
        ("value", _) if is_form_control(tag) => {
            let next = value.attribute_text().unwrap_or_default();
            if document.value(node).as_deref() == Some(next.as_str()) {
                return Ok(());
            }
            log::trace!("node {node}: writing value {next:?}");
            document.set_value(node, &next)
        }
        ("checked", _) if tag == "input" => {
            let next = value.is_truthy();
            if document.checked(node) == Some(next) {
                return Ok(());
            }
            document.set_checked(node, next)
        }
        _ if old == Some(value) => Ok(()),
        ("className" | "class", _) => {
            document.set_class_name(node, &value.attribute_text().unwrap_or_default())
        }
        ("style", _) => match value.attribute_text() {
            Some(text) => document.set_style_text(node, &text),
            None => document.remove_attribute(node, "style"),
        },
        _ => match value.attribute_text() {
            Some(text) => document.set_attribute(node, name, &text),
            None => document.remove_attribute(node, name),
        },
    }
}

fn apply_style<D: HostDocument + ?Sized>(
    document: &mut D,
    node: NodeId,
    old: Option<&PropValue>,
    style: &Style,
) -> Result<(), HostError> {
    let previous = match old {
        Some(PropValue::Style(previous)) => Some(previous),
        Some(_) => {
            document.remove_attribute(node, "style")?;
            None
        }
        None => None,
    };
    if let Some(previous) = previous {
        for (field, _) in previous.iter() {
            if style.get(field).is_none() {
                document.set_style_property(node, &css_property_name(field), None)?;
            }
        }
    }
    for (field, value) in style.iter() {
        if previous.and_then(|p| p.get(field)) == Some(value) {
            continue;
        }
        document.set_style_property(node, &css_property_name(field), Some(value))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::EventHandler;
    use crate::MemoryDocument;

    fn input(document: &mut MemoryDocument) -> NodeId {
        document.create_element("input").expect("input")
    }

    #[test]
    fn event_props_map_to_lowercase_event_names() {
        assert_eq!(event_name("onClick").as_deref(), Some("click"));
        assert_eq!(event_name("onKeyDown").as_deref(), Some("keydown"));
        assert_eq!(event_name("one"), None);
        assert_eq!(event_name("on"), None);
    }

    #[test]
    fn boolean_false_removes_and_true_sets_valueless_attribute() {
        let mut document = MemoryDocument::new();
        let node = input(&mut document);
        apply_props(
            &mut document,
            node,
            "input",
            None,
            &Props::new().with("disabled", true),
        )
        .expect("mount");
        assert_eq!(document.attribute(node, "disabled").as_deref(), Some(""));

        apply_props(
            &mut document,
            node,
            "input",
            Some(&Props::new().with("disabled", true)),
            &Props::new().with("disabled", false),
        )
        .expect("patch");
        assert_eq!(document.attribute(node, "disabled"), None);
    }

    #[test]
    fn same_handler_is_not_reinstalled() {
        let mut document = MemoryDocument::new();
        let node = input(&mut document);
        let props = Props::new().on_handler("click", EventHandler::new(|_| Ok(())));
        apply_props(&mut document, node, "input", None, &props).expect("mount");
        document.reset_stats();

        apply_props(&mut document, node, "input", Some(&props), &props.clone()).expect("patch");
        assert_eq!(document.stats().listener_writes, 0);
        assert!(document.has_listener(node, "click"));

        apply_props(&mut document, node, "input", Some(&props), &Props::new()).expect("remove");
        assert!(!document.has_listener(node, "click"));
    }

    #[test]
    fn removed_style_fields_are_cleared() {
        let mut document = MemoryDocument::new();
        let node = document.create_element("div").expect("div");
        let before = Props::new().style(
            Style::new()
                .set("backgroundColor", "red")
                .set("width", "10px"),
        );
        let after = Props::new().style(Style::new().set("backgroundColor", "red"));
        apply_props(&mut document, node, "div", None, &before).expect("mount");
        document.reset_stats();
        apply_props(&mut document, node, "div", Some(&before), &after).expect("patch");

        assert_eq!(document.style_property(node, "background-color").as_deref(), Some("red"));
        assert_eq!(document.style_property(node, "width"), None);
        assert_eq!(document.stats().style_writes, 1);
    }

    #[test]
    fn value_is_written_only_when_it_differs_from_the_live_value() {
        let mut document = MemoryDocument::new();
        let node = input(&mut document);
        document.edit_value(node, "typed", None).expect("edit");

        let props = Props::new().with("value", "typed");
        apply_props(&mut document, node, "input", None, &props).expect("apply");
        assert_eq!(document.stats().value_writes, 0);

        let reset = Props::new().with("value", "reset");
        apply_props(&mut document, node, "input", Some(&props), &reset).expect("apply");
        assert_eq!(document.value(node).as_deref(), Some("reset"));
        assert_eq!(document.stats().value_writes, 1);
    }

    #[test]
    fn class_name_prop_sets_class_attribute() {
        let mut document = MemoryDocument::new();
        let node = document.create_element("div").expect("div");
        let props = Props::new().class("card open");
        apply_props(&mut document, node, "div", None, &props).expect("mount");
        assert_eq!(document.attribute(node, "class").as_deref(), Some("card open"));

        apply_props(&mut document, node, "div", Some(&props), &Props::new()).expect("clear");
        assert_eq!(document.attribute(node, "class"), None);
    }
}
