//! Varlink interface description language: parsing one interface
//! description, validating names, and indexing its method/error tables.

mod error;
mod interface;

pub use error::IdlError;
pub use interface::{Handler, InterfaceDescription};
