//! Service construction, fully-qualified method resolution, dispatch, and
//! the process-wide (in this crate: explicit, caller-owned) registry
//! keyed by device identity.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::connection::Connection;
use crate::idl::InterfaceDescription;
use crate::protocol::CallFlags;
use crate::value::JsonObject;

use super::builtin;
use super::error::ServiceError;

/// The name/access-mode pair a service is registered under.
#[derive(Debug, Clone)]
pub struct DeviceIdentity {
    pub name: String,
    pub mode: u32,
}

impl DeviceIdentity {
    pub fn new(name: impl Into<String>, mode: u32) -> Self {
        Self {
            name: name.into(),
            mode,
        }
    }

    pub fn id(&self) -> DeviceId {
        DeviceId(self.name.clone())
    }
}

/// Key type for the service registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A constructed Varlink service: identity strings, an interface table
/// sorted by name (always including the built-in `org.varlink.service`),
/// and the device identity it is exposed under.
#[derive(Debug)]
pub struct Service {
    vendor: String,
    product: String,
    version: String,
    url: String,
    interfaces: Vec<InterfaceDescription>,
    device: DeviceIdentity,
}

impl Service {
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn device(&self) -> &DeviceIdentity {
        &self.device
    }

    /// Interface names in sorted order, as returned by `GetInfo`.
    pub fn interface_names(&self) -> impl Iterator<Item = &str> {
        self.interfaces.iter().map(|i| i.name())
    }

    pub fn find_interface(&self, name: &str) -> Option<&InterfaceDescription> {
        self.interfaces
            .binary_search_by(|i| i.name().cmp(name))
            .ok()
            .map(|i| &self.interfaces[i])
    }

    pub(super) fn find_interface_mut(&mut self, name: &str) -> Option<&mut InterfaceDescription> {
        let index = self.interfaces.binary_search_by(|i| i.name().cmp(name)).ok()?;
        Some(&mut self.interfaces[index])
    }

    /// Resolves `fqn` (`interface.Member`) and dispatches to its handler,
    /// or emits the appropriate Varlink error reply, in the precedence
    /// order: malformed FQN, interface not found, method not found,
    /// method not implemented.
    ///
    /// Only a malformed FQN is returned as an `Err`. That is a
    /// transport-level condition the caller surfaces on the failing
    /// write, not a Varlink error reply.
    pub fn dispatch_call(
        &self,
        conn: &Connection,
        fqn: &str,
        params: &JsonObject,
        flags: CallFlags,
    ) -> Result<(), ServiceError> {
        let (interface_name, member) = split_fqn(fqn)?;

        let Some(interface) = self.find_interface(interface_name) else {
            warn!(interface = interface_name, "dispatch: interface not found");
            return Self::reply_or_propagate(conn, ServiceError::InterfaceNotFound(fqn.to_string()));
        };

        if !interface.has_method(member) {
            warn!(method = fqn, "dispatch: method not found");
            return Self::reply_or_propagate(conn, ServiceError::MethodNotFound(fqn.to_string()));
        }

        match interface.find_method(member) {
            Some(handler) => {
                debug!(method = fqn, "dispatch: invoking handler");
                handler(conn, fqn, params, flags);
                Ok(())
            }
            None => {
                warn!(method = fqn, "dispatch: method declared but not implemented");
                Self::reply_or_propagate(conn, ServiceError::MethodNotImplemented(fqn.to_string()))
            }
        }
    }

    /// Sends `error` to the peer under its Varlink-qualified name if it
    /// has one ([`ServiceError::varlink_name`]), otherwise propagates it
    /// as a transport-level `Err` for the caller to surface itself.
    fn reply_or_propagate(conn: &Connection, error: ServiceError) -> Result<(), ServiceError> {
        match error.varlink_name() {
            Some(name) => {
                let _ = conn.error(name, None);
                Ok(())
            }
            None => Err(error),
        }
    }
}

fn split_fqn(fqn: &str) -> Result<(&str, &str), ServiceError> {
    match fqn.rfind('.') {
        Some(dot) => Ok((&fqn[..dot], &fqn[dot + 1..])),
        None => Err(ServiceError::InvalidArgument(fqn.to_string())),
    }
}

/// Builder for a [`Service`]: identity strings, device identity, and the
/// interface descriptions to install. Installs the built-in
/// `org.varlink.service` interface automatically.
pub struct ServiceBuilder {
    vendor: String,
    product: String,
    version: String,
    url: String,
    device: DeviceIdentity,
    interfaces: Vec<InterfaceDescription>,
}

impl ServiceBuilder {
    pub fn new(device: DeviceIdentity) -> Self {
        Self {
            vendor: String::new(),
            product: String::new(),
            version: String::new(),
            url: String::new(),
            device,
            interfaces: Vec::new(),
        }
    }

    pub fn vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }

    pub fn product(mut self, product: impl Into<String>) -> Self {
        self.product = product.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Installs a custom interface description. Fails if an interface of
    /// the same name is already present, or if it collides with the
    /// reserved `org.varlink.service` name.
    pub fn add_interface(mut self, description: InterfaceDescription) -> Result<Self, ServiceError> {
        if description.name() == "org.varlink.service"
            || self.interfaces.iter().any(|i| i.name() == description.name())
        {
            return Err(ServiceError::DuplicateInterface(description.name().to_string()));
        }
        self.interfaces.push(description);
        Ok(self)
    }

    /// Installs the built-in interface, sorts the interface table, and
    /// returns the constructed, shareable service. On failure (there is
    /// none at this stage besides the builtin IDL itself, which is
    /// trusted), no partial service is left behind.
    pub fn build(mut self) -> Arc<Service> {
        let builtin = InterfaceDescription::parse(builtin::ORG_VARLINK_SERVICE_IDL)
            .expect("the built-in org.varlink.service IDL is always valid");
        self.interfaces.push(builtin);
        self.interfaces.sort_by(|a, b| a.name().cmp(b.name()));

        let mut service = Service {
            vendor: self.vendor,
            product: self.product,
            version: self.version,
            url: self.url,
            interfaces: self.interfaces,
            device: self.device,
        };
        builtin::attach_builtin_handlers(&mut service);
        debug!(device = %service.device().name, "service constructed");
        Arc::new(service)
    }
}

/// Explicit, caller-owned registry of constructed services keyed by
/// device identity. Stands in for the original design's process-wide,
/// mutex-protected table: a global mutable singleton is not idiomatic
/// Rust library design, so callers construct one `ServiceRegistry` and
/// share it (typically as an `Arc`) with whichever transport adapter
/// accepts connections.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: DashMap<DeviceId, Arc<Service>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            services: DashMap::new(),
        }
    }

    /// Registers `service` under its device identity. Fails if a service
    /// is already registered under that identity.
    pub fn register(&self, service: Arc<Service>) -> Result<(), ServiceError> {
        let id = service.device().id();
        if self.services.contains_key(&id) {
            return Err(ServiceError::DeviceAlreadyRegistered(id.as_str().to_string()));
        }
        self.services.insert(id, service);
        Ok(())
    }

    pub fn lookup(&self, id: &DeviceId) -> Option<Arc<Service>> {
        self.services.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn remove(&self, id: &DeviceId) -> Option<Arc<Service>> {
        self.services.remove(id).map(|(_, service)| service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Connection;
    use crate::value::parse_str;

    fn build_test_service() -> Arc<Service> {
        let extra = InterfaceDescription::parse("interface com.acme.ex method Foo()->()").unwrap();
        ServiceBuilder::new(DeviceIdentity::new("varlink-test", 0o600))
            .vendor("Linux")
            .product("Example")
            .version("1.0")
            .url("http://example")
            .add_interface(extra)
            .unwrap()
            .build()
    }

    #[test]
    fn get_info_scenario() {
        let service = build_test_service();
        let conn = Connection::new(Arc::clone(&service));
        let call = parse_str(r#"{"method":"org.varlink.service.GetInfo"}"#).unwrap();
        conn.handle_call(call.as_object().unwrap().clone()).unwrap();
        let bytes = conn.drain().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "{\"parameters\":{\"interfaces\":[\"com.acme.ex\",\"org.varlink.service\"],\
             \"product\":\"Example\",\"url\":\"http://example\",\"vendor\":\"Linux\",\
             \"version\":\"1.0\"}}\0"
        );
    }

    #[test]
    fn unknown_interface_scenario() {
        let service = build_test_service();
        let conn = Connection::new(service);
        let call = parse_str(r#"{"method":"nope.X"}"#).unwrap();
        conn.handle_call(call.as_object().unwrap().clone()).unwrap();
        let bytes = conn.drain().unwrap();
        assert_eq!(
            bytes,
            b"{\"error\":\"org.varlink.service.InterfaceNotFound\"}\0"
        );
    }

    #[test]
    fn registry_rejects_duplicate_device_identity() {
        let registry = ServiceRegistry::new();
        let a = build_test_service();
        let b = build_test_service();
        registry.register(a).unwrap();
        assert!(matches!(
            registry.register(b),
            Err(ServiceError::DeviceAlreadyRegistered(_))
        ));
    }
}
