//! Error types for the headless DOM and sensor layers

use crate::dom::NodeId;
use thiserror::Error;

/// Result type alias for document and sensor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while manipulating a document
#[derive(Error, Debug)]
pub enum Error {
    /// The node id does not refer to a live node in this document
    #[error("node {0} does not exist in this document")]
    NodeNotFound(NodeId),

    /// The node is not a child of the given parent
    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    /// Appending would create a cycle in the tree
    #[error("hierarchy error: {0}")]
    Hierarchy(String),

    /// Failed to parse markup into a document
    #[error("failed to parse document: {0}")]
    ParseError(String),

    /// Failed to parse an inline style declaration
    #[error("invalid style declaration: {0}")]
    StyleError(String),
}
