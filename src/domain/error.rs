//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::data::NodeKey;

/// Domain errors describe requests the tree cannot satisfy.
/// Malformed records are not errors: they degrade to leaves or unselectable nodes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("no node with id {0} in tree data")]
    UnknownNode(NodeKey),

    #[error("node with id {0} is not rendered")]
    NodeNotRendered(NodeKey),

    #[error("node handle no longer refers to a live node: {0}")]
    StaleHandle(String),

    #[error("invalid tree data: {message}")]
    InvalidTreeData { message: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
