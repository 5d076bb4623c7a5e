use super::*;
use crate::element::{component, h};
use crate::hooks::{Hooks, NodeRef};
use crate::props::Props;
use std::cell::{Cell, RefCell};

fn runtime() -> (Runtime<MemoryDocument>, NodeId) {
    let mut document = MemoryDocument::new();
    let container = document.create_container("app").expect("container");
    (Runtime::new(document), container)
}

#[test]
fn first_mount_clears_existing_container_children() {
    let mut document = MemoryDocument::new();
    let container = document.create_container("app").expect("container");
    let placeholder = document.create_text("Loading…");
    document.append_child(container, placeholder).expect("append");
    let runtime = Runtime::new(document);

    runtime.render(h("main", (), "ready"), container).expect("render");
    assert_eq!(runtime.document().text_content(container), "ready");
    assert!(!runtime.document().is_live(placeholder));
}

#[test]
fn container_clearing_can_be_disabled() {
    let mut document = MemoryDocument::new();
    let container = document.create_container("app").expect("container");
    let placeholder = document.create_text("server markup ");
    document.append_child(container, placeholder).expect("append");
    let runtime = Runtime::with_config(
        document,
        RuntimeConfig::default().with_clear_container_on_mount(false),
    );

    runtime.render(h("main", (), "ready"), container).expect("render");
    assert_eq!(runtime.document().text_content(container), "server markup ready");
}

#[test]
fn rendering_the_same_description_twice_writes_nothing() {
    let (runtime, container) = runtime();
    let handler = crate::EventHandler::new(|_| Ok(()));
    let view = || {
        h(
            "form",
            Props::new().class("pantry").on_handler("submit", handler.clone()),
            (
                h("input", Props::new().with("name", "qty").with("value", "2"), ()),
                h("label", Props::new().with("for", "qty"), "Quantity"),
            ),
        )
    };
    runtime.render(view(), container).expect("mount");
    let root = runtime.root_node(container);
    runtime.document_mut().reset_stats();

    runtime.render(view(), container).expect("patch");
    let stats = runtime.document().stats();
    assert_eq!(stats.property_writes(), 0, "{stats:?}");
    assert_eq!(stats.nodes_created, 0);
    assert_eq!(runtime.root_node(container), root);
}

#[test]
fn root_kind_change_replaces_the_root_node() {
    let (runtime, container) = runtime();
    runtime.render(h("div", (), "a"), container).expect("mount");
    let first = runtime.root_node(container).expect("root");
    runtime.render(h("section", (), "b"), container).expect("patch");
    let second = runtime.root_node(container).expect("root");

    assert_ne!(first, second);
    assert_eq!(runtime.document().child_nodes(container), vec![second]);
    assert_eq!(runtime.render_passes(container), 2);
}

#[test]
fn invalid_tag_surfaces_as_host_error_and_resets_the_root() {
    let (runtime, container) = runtime();
    runtime.render(h("div", (), "ok"), container).expect("mount");

    let err = runtime
        .render(h("div", (), h("not a tag", (), ())), container)
        .expect_err("invalid tag");
    assert_eq!(
        err,
        RenderError::Host(HostError::InvalidTag {
            tag: "not a tag".to_string()
        })
    );
    assert!(runtime.root_node(container).is_none());

    runtime.render(h("p", (), "again"), container).expect("recover");
    assert_eq!(runtime.document().text_content(container), "again");
    assert_eq!(runtime.document().child_nodes(container).len(), 1);
}

#[test]
fn failed_patch_runs_the_cleanups_of_the_dropped_tree() {
    thread_local! {
        static EVENTS: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
    }
    fn subscriber(hooks: &mut Hooks<'_>, _: &Props) -> VNode {
        hooks.use_effect((), |scope| {
            EVENTS.with(|e| e.borrow_mut().push("subscribe"));
            scope.on_cleanup(|| EVENTS.with(|e| e.borrow_mut().push("unsubscribe")))
        });
        h("span", (), "live")
    }
    let events = || EVENTS.with(|e| e.borrow().clone());

    let (runtime, container) = runtime();
    let view = || h("div", (), h(component(subscriber), (), ()));
    runtime.render(view(), container).expect("mount");
    let instance = runtime.instances(container).pop().expect("instance");
    assert_eq!(events(), vec!["subscribe"]);

    runtime
        .render(
            h("div", (), (h(component(subscriber), (), ()), h("not a tag", (), ()))),
            container,
        )
        .expect_err("invalid tag");
    assert_eq!(events(), vec!["subscribe", "unsubscribe"]);
    assert!(!instance.is_mounted());

    runtime.render(view(), container).expect("remount");
    assert_eq!(events(), vec!["subscribe", "unsubscribe", "subscribe"]);
}

#[test]
fn failing_root_does_not_hold_back_other_roots() {
    thread_local! {
        static OTHER: RefCell<Option<crate::Setter<i32>>> = const { RefCell::new(None) };
    }
    fn counter(hooks: &mut Hooks<'_>, _: &Props) -> VNode {
        let (value, set_value) = hooks.use_state(|| 1);
        OTHER.with(|s| *s.borrow_mut() = Some(set_value));
        h("p", (), value)
    }
    fn broken(_: &mut Hooks<'_>, _: &Props) -> VNode {
        if let Some(setter) = OTHER.with(|s| s.borrow().clone()) {
            setter.set(2).expect("deferred");
        }
        h("not a tag", (), ())
    }

    let mut document = MemoryDocument::new();
    let first = document.create_container("first").expect("container");
    let second = document.create_container("second").expect("container");
    let runtime = Runtime::new(document);
    runtime
        .render(h(component(counter), (), ()), second)
        .expect("second");
    assert_eq!(runtime.roots(), vec![second]);

    runtime
        .render(h(component(broken), (), ()), first)
        .expect_err("invalid tag");
    assert_eq!(runtime.roots(), vec![second, first]);
    assert_eq!(runtime.document().text_content(second), "2");
    assert_eq!(runtime.render_passes(second), 2);
    assert!(runtime.root_node(first).is_none());
}

#[test]
fn root_handle_requests_a_pass_for_its_root() {
    let (runtime, container) = runtime();
    assert!(runtime.root_handle(container).is_none());
    runtime.render(h("p", (), "once"), container).expect("render");

    let handle = runtime.root_handle(container).expect("handle");
    assert_eq!(handle.container(), container);
    handle.request_render().expect("render");
    assert_eq!(runtime.render_passes(container), 2);
    assert_eq!(runtime.document().text_content(container), "once");
}

thread_local! {
    static RENDERS: Cell<usize> = const { Cell::new(0) };
}

fn cascading(hooks: &mut Hooks<'_>, _: &Props) -> VNode {
    RENDERS.with(|r| r.set(r.get() + 1));
    let (loaded, set_loaded) = hooks.use_state(|| false);
    hooks.use_effect((), move |scope| {
        set_loaded.set(true).expect("deferred");
        scope.done()
    });
    h("p", (), if loaded { "loaded" } else { "loading" })
}

#[test]
fn state_set_from_an_effect_converges_in_an_extra_pass() {
    RENDERS.with(|r| r.set(0));
    let (runtime, container) = runtime();
    runtime
        .render(h(component(cascading), (), ()), container)
        .expect("render");

    assert_eq!(runtime.document().text_content(container), "loaded");
    assert_eq!(runtime.render_passes(container), 2);
    assert_eq!(RENDERS.with(Cell::get), 2);
}

fn runaway(hooks: &mut Hooks<'_>, _: &Props) -> VNode {
    let (count, set_count) = hooks.use_state(|| 0u32);
    hooks.use_effect_always(move |scope| {
        let _ = set_count.update(|n| n + 1);
        scope.done()
    });
    h("p", (), count)
}

#[test]
fn runaway_updates_stop_at_the_pass_limit() {
    let mut document = MemoryDocument::new();
    let container = document.create_container("app").expect("container");
    let runtime =
        Runtime::with_config(document, RuntimeConfig::default().with_max_render_passes(5));

    let err = runtime
        .render(h(component(runaway), (), ()), container)
        .expect_err("loop");
    assert_eq!(
        err,
        RenderError::UpdateLoop {
            container,
            passes: 5
        }
    );
}

#[test]
fn refs_are_bound_on_mount_and_cleared_on_unmount() {
    thread_local! {
        static CAPTURED: RefCell<Option<NodeRef>> = const { RefCell::new(None) };
    }
    fn capturing(hooks: &mut Hooks<'_>, _: &Props) -> VNode {
        let node_ref = hooks.use_ref();
        CAPTURED.with(|c| *c.borrow_mut() = Some(node_ref.clone()));
        h("input", Props::new().node_ref(node_ref).with("id", "qty"), ())
    }

    let (runtime, container) = runtime();
    runtime
        .render(h(component(capturing), (), ()), container)
        .expect("render");
    let node_ref = CAPTURED.with(|c| c.borrow().clone()).expect("ref");
    assert_eq!(node_ref.current(), runtime.root_node(container));

    runtime.unmount(container).expect("unmount");
    assert_eq!(node_ref.current(), None);
    assert!(runtime.document().child_nodes(container).is_empty());
}

#[test]
fn instances_are_listed_parents_first() {
    fn leaf(_: &mut Hooks<'_>, _: &Props) -> VNode {
        h("li", (), "leaf")
    }
    fn branch(_: &mut Hooks<'_>, _: &Props) -> VNode {
        h("ul", (), (h(component(leaf), (), ()), h(component(leaf), (), ())))
    }

    let (runtime, container) = runtime();
    runtime
        .render(h(component(branch), (), ()), container)
        .expect("render");
    let instances = runtime.instances(container);
    assert_eq!(instances.len(), 3);
    assert!(instances[0].is_instance_of(&component(branch)));
    assert!(instances[1].is_instance_of(&component(leaf)));
    assert_eq!(
        runtime.root_instance(container).map(|i| i.id()),
        Some(instances[0].id())
    );
}

#[test]
fn setter_outliving_its_runtime_is_inert() {
    thread_local! {
        static SETTER: RefCell<Option<crate::Setter<i32>>> = const { RefCell::new(None) };
    }
    fn holder(hooks: &mut Hooks<'_>, _: &Props) -> VNode {
        let (value, set_value) = hooks.use_state(|| 1);
        SETTER.with(|s| *s.borrow_mut() = Some(set_value));
        h("p", (), value)
    }

    let (runtime, container) = runtime();
    runtime
        .render(h(component(holder), (), ()), container)
        .expect("render");
    drop(runtime);

    let setter = SETTER.with(|s| s.borrow_mut().take()).expect("setter");
    assert_eq!(setter.get(), None);
    assert!(setter.set(2).is_ok());
}
