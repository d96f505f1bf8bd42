use thiserror::Error;

use crate::scanner::ScanError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdlError {
    #[error("malformed interface description: {0}")]
    Syntax(#[from] ScanError),
    #[error("invalid interface name: {0}")]
    InvalidInterfaceName(String),
    #[error("invalid member name: {0}")]
    InvalidMemberName(String),
    #[error("member name not unique: {0}")]
    NotUnique(String),
    #[error("unconsumed trailing data after interface description")]
    TrailingData,
    #[error("method not declared: {0}")]
    NoSuchMethod(String),
}
