use thiserror::Error;

use crate::scanner::ScanError;

/// Errors raised by the JSON value graph: parsing, accessors, mutators.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    #[error("unexpected trailing data after top-level value")]
    TrailingData,
    #[error("malformed JSON: {0}")]
    Syntax(#[from] ScanError),
    #[error("no such key: {0}")]
    NoSuchKey(String),
    #[error("value tag mismatch")]
    Domain,
    #[error("index out of range: {0}")]
    IndexOutOfRange(usize),
}
