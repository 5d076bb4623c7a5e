//! Focus, selection and scroll state carried across a patch.

use crate::host::{is_form_control, HostDocument, ScrollOffset, Selection};
use crate::runtime::RuntimeConfig;
use crate::NodeId;

/// How an element is found again after its node may have been replaced:
/// the first element under the container whose `attribute` equals `value`.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Identity {
    attribute: String,
    value: String,
}

impl Identity {
    fn resolve<D: HostDocument + ?Sized>(&self, document: &D, container: NodeId) -> Option<NodeId> {
        document.find_by_attribute(container, &self.attribute, &self.value)
    }
}

#[derive(Debug, Default)]
pub(crate) struct ViewSnapshot {
    focus: Option<(Identity, Option<Selection>)>,
    scroll: Vec<(Identity, ScrollOffset)>,
}

impl ViewSnapshot {
    pub(crate) fn capture<D: HostDocument + ?Sized>(
        document: &D,
        container: NodeId,
        config: &RuntimeConfig,
    ) -> Self {
        let focus = document
            .focused()
            .filter(|&node| node != container && document.contains(container, node))
            .filter(|&node| document.tag_name(node).is_some_and(|tag| is_form_control(&tag)))
            .and_then(|node| {
                let identity = config.focus_attributes().iter().find_map(|attribute| {
                    document
                        .attribute(node, attribute)
                        .filter(|value| !value.is_empty())
                        .map(|value| Identity {
                            attribute: attribute.clone(),
                            value,
                        })
                })?;
                Some((identity, document.selection(node)))
            });

        let marker = config.scroll_attribute();
        let scroll = document
            .elements_with_attribute(container, marker)
            .into_iter()
            .filter_map(|node| {
                let identity = match document.attribute(node, marker) {
                    Some(value) if !value.is_empty() => Identity {
                        attribute: marker.to_string(),
                        value,
                    },
                    _ => Identity {
                        attribute: "id".to_string(),
                        value: document.attribute(node, "id").filter(|id| !id.is_empty())?,
                    },
                };
                Some((identity, document.scroll_offset(node)?))
            })
            .collect();

        Self { focus, scroll }
    }

    /// Puts scroll offsets back first, then focus and selection. Elements
    /// that no longer exist are skipped.
    pub(crate) fn restore<D: HostDocument + ?Sized>(&self, document: &mut D, container: NodeId) {
        for (identity, offset) in &self.scroll {
            let Some(node) = identity.resolve(document, container) else {
                continue;
            };
            if document.scroll_offset(node) == Some(*offset) {
                continue;
            }
            if let Err(err) = document.set_scroll_offset(node, *offset) {
                log::debug!("scroll restore skipped for node {node}: {err}");
            }
        }

        let Some((identity, selection)) = &self.focus else {
            return;
        };
        let Some(node) = identity.resolve(document, container) else {
            log::trace!("focused {identity:?} did not survive the patch");
            return;
        };
        if document.focused() != Some(node) {
            if let Err(err) = document.focus(node) {
                log::debug!("focus restore skipped for node {node}: {err}");
                return;
            }
        }
        if let Some(selection) = selection {
            if document.selection(node) != Some(*selection) {
                if let Err(err) = document.set_selection(node, *selection) {
                    log::debug!("selection restore skipped for node {node}: {err}");
                }
            }
        }
    }
}
