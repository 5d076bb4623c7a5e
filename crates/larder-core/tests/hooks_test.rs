use std::cell::RefCell;

use larder_core::{component, h, Hooks, Props, VNode};
use larder_testing::RenderTestRule;

thread_local! {
    static LOG: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

fn log(entry: impl Into<String>) {
    LOG.with(|log| log.borrow_mut().push(entry.into()));
}

fn take_log() -> Vec<String> {
    LOG.with(|log| std::mem::take(&mut *log.borrow_mut()))
}

fn pair(hooks: &mut Hooks<'_>, _: &Props) -> VNode {
    let (count, _) = hooks.use_state(|| 10i64);
    let (label, set_label) = hooks.use_state(|| "flour".to_string());
    h(
        "button",
        Props::new()
            .id("rename")
            .on("click", move |_| set_label.update(|label| format!("{label}!"))),
        format!("{label} x{count}"),
    )
}

#[test]
fn updating_one_slot_leaves_the_other_alone() {
    let mut rule = RenderTestRule::new();
    rule.set_content(|| h(component(pair), (), ())).expect("render");
    let button = rule.find_by_id("rename").expect("button");

    rule.click(button).expect("click");
    rule.click(button).expect("click");

    let instance = rule.root_instance().expect("instance");
    assert_eq!(instance.state::<i64>(0), Some(10));
    assert_eq!(instance.state::<String>(1).as_deref(), Some("flour!!"));
    assert_eq!(rule.text_content(), "flour!! x10");
}

fn shifting(hooks: &mut Hooks<'_>, props: &Props) -> VNode {
    let (base, _) = hooks.use_state(|| 7i64);
    if props.get_bool("memo").unwrap_or(false) {
        let cached = hooks.use_memo((), || 42i64);
        h("p", (), *cached)
    } else {
        let (extra, _) = hooks.use_state(|| 1i64);
        h("p", (), base + extra)
    }
}

#[test]
fn a_slot_that_changes_hook_type_is_reset() {
    let rule = RenderTestRule::new();
    let with_memo = |memo: bool| h(component(shifting), Props::new().with("memo", memo), ());

    rule.render(with_memo(false)).expect("render");
    assert_eq!(rule.text_content(), "8");
    rule.render(with_memo(true)).expect("render");
    assert_eq!(rule.text_content(), "42");
    rule.render(with_memo(false)).expect("render");
    assert_eq!(rule.text_content(), "8");

    let instance = rule.root_instance().expect("instance");
    assert_eq!(instance.state::<i64>(0), Some(7));
    assert_eq!(instance.hook_count(), 2);
}

fn gated(hooks: &mut Hooks<'_>, props: &Props) -> VNode {
    let dep = props.get_int("dep").unwrap_or(0);
    hooks.use_effect(dep, move |scope| {
        log(format!("run {dep}"));
        scope.on_cleanup(move || log(format!("cleanup {dep}")))
    });
    h("p", (), dep)
}

#[test]
fn effect_runs_only_when_its_deps_change() {
    take_log();
    let rule = RenderTestRule::new();
    let with_dep = |dep: i64| h(component(gated), Props::new().with("dep", dep), ());

    for _ in 0..3 {
        rule.render(with_dep(1)).expect("render");
    }
    assert_eq!(take_log(), vec!["run 1"]);

    rule.render(with_dep(2)).expect("render");
    assert_eq!(take_log(), vec!["cleanup 1", "run 2"]);

    rule.runtime().unmount(rule.container()).expect("unmount");
    assert_eq!(take_log(), vec!["cleanup 2"]);
    assert_eq!(rule.text_content(), "");
}

fn totals(hooks: &mut Hooks<'_>, props: &Props) -> VNode {
    let dep = props.get_int("dep").unwrap_or(0);
    let total = hooks.use_memo(dep, move || {
        log(format!("compute {dep}"));
        dep * 100
    });
    h("p", (), *total)
}

#[test]
fn memo_recomputes_only_when_its_deps_change() {
    take_log();
    let rule = RenderTestRule::new();
    for dep in [1i64, 1, 1, 2, 2] {
        rule.render(h(component(totals), Props::new().with("dep", dep), ()))
            .expect("render");
        assert_eq!(rule.text_content(), (dep * 100).to_string());
    }
    assert_eq!(take_log(), vec!["compute 1", "compute 2"]);
}

fn every_commit(hooks: &mut Hooks<'_>, _: &Props) -> VNode {
    hooks.use_effect_always(|scope| {
        log("commit");
        scope.done()
    });
    h("span", (), "tick")
}

#[test]
fn effect_without_deps_runs_after_every_commit() {
    take_log();
    let rule = RenderTestRule::new();
    for _ in 0..3 {
        rule.render(h(component(every_commit), (), ())).expect("render");
    }
    assert_eq!(take_log(), vec!["commit", "commit", "commit"]);
}

fn subscriber(hooks: &mut Hooks<'_>, props: &Props) -> VNode {
    let name = props.get_str("name").unwrap_or_default().to_string();
    let label = name.clone();
    hooks.use_effect((), move |scope| {
        log(format!("subscribe {name}"));
        scope.on_cleanup(move || log(format!("unsubscribe {name}")))
    });
    h("li", (), label)
}

#[test]
fn removing_a_component_runs_its_cleanups() {
    take_log();
    let rule = RenderTestRule::new();
    let list = |names: &[&str]| {
        let items: Vec<VNode> = names
            .iter()
            .map(|name| {
                h(
                    component(subscriber),
                    Props::new().key(*name).with("name", *name),
                    (),
                )
            })
            .collect();
        h("ul", (), items)
    };

    rule.render(list(&["milk", "eggs", "rice"])).expect("render");
    assert_eq!(
        take_log(),
        vec!["subscribe milk", "subscribe eggs", "subscribe rice"]
    );

    rule.render(list(&["milk", "rice"])).expect("render");
    assert_eq!(take_log(), vec!["unsubscribe eggs"]);
    assert_eq!(rule.text_content(), "milkrice");
    assert_eq!(rule.instances().len(), 2);
}
