//! Assertion utilities for rendered documents
//!
//! Helpers that fail with the container dump in the message, so a broken
//! expectation shows what was actually on screen.

use larder_core::{HostDocument, NodeId, WriteStats};

use crate::testing::RenderTestRule;

/// Assert that the rendered container contains a specific text fragment.
pub fn assert_contains_text(rule: &RenderTestRule, fragment: &str, msg: &str) {
    let text = rule.text_content();
    assert!(
        text.contains(fragment),
        "{}: text '{}' not found in {:?}\n{}",
        msg,
        fragment,
        text,
        rule.dump_tree()
    );
}

/// Assert that the rendered container does not contain a text fragment.
pub fn assert_not_contains_text(rule: &RenderTestRule, fragment: &str, msg: &str) {
    let text = rule.text_content();
    assert!(
        !text.contains(fragment),
        "{}: text '{}' unexpectedly found in {:?}\n{}",
        msg,
        fragment,
        text,
        rule.dump_tree()
    );
}

/// Assert that an element has an attribute with the expected value.
pub fn assert_attribute(rule: &RenderTestRule, node: NodeId, name: &str, expected: Option<&str>) {
    let actual = rule.document().attribute(node, name);
    assert_eq!(
        actual.as_deref(),
        expected,
        "attribute {:?} of node {}\n{}",
        name,
        node,
        rule.dump_tree()
    );
}

/// Assert that a collection has an expected count.
pub fn assert_count<T>(items: &[T], expected: usize, msg: &str) {
    assert_eq!(
        items.len(),
        expected,
        "{}: expected {} items, got {}",
        msg,
        expected,
        items.len()
    );
}

/// Assert that no attribute, style, value or listener was written since the
/// document's counters were last reset.
pub fn assert_no_property_writes(stats: WriteStats, msg: &str) {
    assert_eq!(
        stats.property_writes(),
        0,
        "{}: expected no property writes, got {:?}",
        msg,
        stats
    );
}
