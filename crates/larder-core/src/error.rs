use std::fmt;

use crate::NodeId;

/// Failure reported by a [`HostDocument`](crate::HostDocument) implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The host refused to create an element with this tag name.
    InvalidTag { tag: String },
    /// The node id does not refer to a live node.
    Missing { id: NodeId },
    /// The operation requires an element but the node is a text node.
    NotAnElement { id: NodeId },
    /// The node is not a child of the given parent.
    NotAChild { parent: NodeId, child: NodeId },
    /// Error raised by the underlying platform API.
    Platform { message: String },
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::InvalidTag { tag } => write!(f, "invalid element tag {tag:?}"),
            HostError::Missing { id } => write!(f, "node {id} missing"),
            HostError::NotAnElement { id } => write!(f, "node {id} is not an element"),
            HostError::NotAChild { parent, child } => {
                write!(f, "node {child} is not a child of node {parent}")
            }
            HostError::Platform { message } => write!(f, "platform error: {message}"),
        }
    }
}

impl std::error::Error for HostError {}

/// Failure of a render pass, a state update or an event dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    Host(HostError),
    /// A root kept scheduling itself from inside its own passes.
    UpdateLoop { container: NodeId, passes: usize },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Host(err) => write!(f, "host document error: {err}"),
            RenderError::UpdateLoop { container, passes } => write!(
                f,
                "root {container} was still invalid after {passes} render passes"
            ),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Host(err) => Some(err),
            RenderError::UpdateLoop { .. } => None,
        }
    }
}

impl From<HostError> for RenderError {
    fn from(err: HostError) -> Self {
        RenderError::Host(err)
    }
}

/// Result returned by event handlers and callbacks.
pub type EventResult = Result<(), RenderError>;
