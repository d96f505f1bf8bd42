use thiserror::Error;

use crate::idl::IdlError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("malformed method name, expected `interface.Member`: {0}")]
    InvalidArgument(String),
    #[error("interface not found: {0}")]
    InterfaceNotFound(String),
    #[error("method not found: {0}")]
    MethodNotFound(String),
    #[error("method not implemented: {0}")]
    MethodNotImplemented(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("interface `{0}` already registered")]
    DuplicateInterface(String),
    #[error("device `{0}` already registered")]
    DeviceAlreadyRegistered(String),
    #[error(transparent)]
    Idl(#[from] IdlError),
}

impl ServiceError {
    /// The `org.varlink.service`-qualified error name this condition is
    /// reported to clients under, or `None` if it must instead surface
    /// as a transport-level error (a malformed method name never reaches
    /// the wire as a named Varlink error).
    pub fn varlink_name(&self) -> Option<&'static str> {
        match self {
            ServiceError::InterfaceNotFound(_) => Some("org.varlink.service.InterfaceNotFound"),
            ServiceError::MethodNotFound(_) => Some("org.varlink.service.MethodNotFound"),
            ServiceError::MethodNotImplemented(_) => {
                Some("org.varlink.service.MethodNotImplemented")
            }
            ServiceError::InvalidParameter(_) => Some("org.varlink.service.InvalidParameter"),
            ServiceError::InvalidArgument(_)
            | ServiceError::DuplicateInterface(_)
            | ServiceError::DeviceAlreadyRegistered(_)
            | ServiceError::Idl(_) => None,
        }
    }
}
