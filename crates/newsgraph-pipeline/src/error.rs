//! Typed failures raised by the rendering pipeline.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    /// Language flag outside `all|english|russian`
    #[error("unknown language: {0} (expected all|english|russian)")]
    UnknownLanguage(String),

    /// View name not understood by the front end
    #[error("unknown view: {0}")]
    UnknownView(String),

    /// A node lacks an attribute the requested view depends on
    #[error("node {node} has no {attribute}")]
    MissingAttribute { node: String, attribute: &'static str },

    /// The same node id appears twice in one snapshot
    #[error("node {0} appears more than once in the snapshot")]
    DuplicateNode(String),

    /// An edge references a node that is not part of the snapshot
    #[error("edge {from} -> {to} references a node outside the snapshot")]
    DanglingEdge { from: String, to: String },

    /// Similarity node without a matching metadata row
    #[error("no metadata row for document {0}")]
    UnknownDocument(String),

    /// Date cell that matches none of the accepted formats
    #[error("invalid date: {0}")]
    InvalidDate(String),
}
