//! Varlink service runtime: a JSON value graph, an interface-description
//! parser, a service registry with built-in introspection, and the
//! per-connection state machine that dispatches calls and frames replies.
//!
//! # Architecture
//!
//! - **Buffer** (`buffer`): growable byte accumulator for serialized replies.
//! - **Scanner** (`scanner`): hand-written tokenizer shared by the value
//!   parser and the interface-description parser.
//! - **Value** (`value`): the refcounted JSON object/array graph, with a
//!   "writable until shared" split between builders and immutable values.
//! - **IDL** (`idl`): interface description parsing and the method/error
//!   tables a service is built from.
//! - **Protocol** (`protocol`): call/reply envelope packing and unpacking.
//! - **Service** (`service`): interface registration, dispatch precedence,
//!   the built-in `org.varlink.service` interface, and the device-keyed
//!   service registry.
//! - **Connection** (`connection`): per-client state machine (call
//!   dispatch, streaming replies, oneway calls, overrun handling).
//! - **Monitor** (`monitor`): a weak-reference set of connections a
//!   notification source can broadcast to.
//! - **Transport** (`transport`): wire framing and a concrete Unix-domain-
//!   socket adapter binding connections to registered services.
//!
//! # Quick start
//!
//! ```rust
//! use varlink_service::idl::InterfaceDescription;
//! use varlink_service::protocol::ReplyFlags;
//! use varlink_service::service::{DeviceIdentity, ServiceBuilder};
//! use varlink_service::connection::Connection;
//! use varlink_service::value::{parse_str, ObjectBuilder};
//!
//! let mut iface =
//!     InterfaceDescription::parse("interface com.acme.greet method Hello(name: string) -> (text: string)")
//!         .unwrap();
//! iface
//!     .set_method("Hello", |conn, _method, params, _flags| {
//!         let mut reply = ObjectBuilder::new();
//!         reply.set_string("text", format!("hi, {}", params.get_string("name").unwrap()));
//!         conn.reply(ReplyFlags::default(), Some(reply.build())).unwrap();
//!     })
//!     .unwrap();
//!
//! let service = ServiceBuilder::new(DeviceIdentity::new("greeter", 0o600))
//!     .vendor("Example Org")
//!     .product("greeter")
//!     .add_interface(iface)
//!     .unwrap()
//!     .build();
//!
//! let conn = Connection::new(service);
//! let call = parse_str(r#"{"method":"com.acme.greet.Hello","parameters":{"name":"world"}}"#).unwrap();
//! conn.handle_call(call.as_object().unwrap().clone()).unwrap();
//! let bytes = conn.drain().unwrap();
//! assert_eq!(bytes, b"{\"parameters\":{\"text\":\"hi, world\"}}\0");
//! ```

pub mod buffer;
pub mod connection;
pub mod idl;
pub mod monitor;
pub mod protocol;
pub mod scanner;
pub mod service;
pub mod transport;
pub mod value;

pub use connection::{Connection, ConnectionError, ConnectionPhase};
pub use monitor::MonitorSet;
pub use scanner::ScanError;
pub use service::{DeviceId, DeviceIdentity, Service, ServiceBuilder, ServiceError, ServiceRegistry};
pub use value::{JsonArray, JsonObject, Value, ValueError};

/// The crate's own version, as declared in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the crate version as a string.
///
/// # Examples
///
/// ```rust
/// println!("varlink-service version: {}", varlink_service::version());
/// ```
pub fn version() -> &'static str {
    VERSION
}
