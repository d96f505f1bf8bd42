use thiserror::Error;

use crate::connection::ConnectionError;
use crate::value::ValueError;

/// Transport-level errors: surfaced to the caller of read/write, never
/// turned into a Varlink error reply.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("inbound call of {0} bytes exceeds the 128 KiB limit")]
    MessageTooLarge(usize),
    #[error("call bytes were not valid UTF-8")]
    InvalidUtf8,
    #[error("call bytes did not parse as a JSON object: {0}")]
    Value(#[from] ValueError),
    #[error("top-level call value was not a JSON object")]
    NotAnObject,
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error("no reply buffer space available")]
    Overrun,
    #[error("connection closed")]
    Closed,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TransportError {
    pub fn message_too_large(size: usize) -> Self {
        Self::MessageTooLarge(size)
    }

    pub fn invalid_utf8() -> Self {
        Self::InvalidUtf8
    }

    pub fn not_an_object() -> Self {
        Self::NotAnObject
    }

    pub fn closed() -> Self {
        Self::Closed
    }
}
