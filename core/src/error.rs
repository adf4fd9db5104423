//! Error types for the search library.

use crate::record::DocId;
use thiserror::Error;

/// Errors surfaced to query callers before a query runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("invalid search options: {0}")]
    InvalidOptions(String),
}

/// Why an input record was left out of a build. These are logged and counted,
/// never returned from `build`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("document id {0} is already taken by an earlier record")]
    DuplicateId(DocId),
}
