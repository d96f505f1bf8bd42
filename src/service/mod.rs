//! Service construction, method resolution, dispatch, and the built-in
//! `org.varlink.service` introspection interface.

mod builtin;
mod error;
mod registry;

pub use error::ServiceError;
pub use registry::{DeviceId, DeviceIdentity, Service, ServiceBuilder, ServiceRegistry};
