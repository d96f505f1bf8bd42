//! Ambient-stack tests: service construction guarantees and tracing
//! observability, exercised from outside the crate like any other
//! consumer would.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::span::{Attributes, Id};
use tracing::{Event, Metadata, Subscriber};

use varlink_service::idl::InterfaceDescription;
use varlink_service::service::{DeviceIdentity, ServiceBuilder, ServiceRegistry};

mod common;

#[test]
fn build_rejects_duplicate_interface_and_leaves_registry_untouched() {
    common::init_tracing();
    let iface_a = InterfaceDescription::parse("interface com.acme.dup method Foo()->()").unwrap();
    let iface_b = InterfaceDescription::parse("interface com.acme.dup method Bar()->()").unwrap();

    let builder = ServiceBuilder::new(DeviceIdentity::new("dup-test", 0o600))
        .add_interface(iface_a)
        .unwrap();
    assert!(builder.add_interface(iface_b).is_err());

    let registry = ServiceRegistry::new();
    assert!(registry.lookup(&varlink_service::service::DeviceId::new("dup-test")).is_none());
}

/// Counts events emitted while it is the active subscriber. Spans are
/// accepted but not tracked; only event counting matters here.
struct CountingSubscriber {
    events: Arc<AtomicUsize>,
}

impl Subscriber for CountingSubscriber {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &tracing::span::Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, _event: &Event<'_>) {
        self.events.fetch_add(1, Ordering::SeqCst);
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

#[test]
fn dispatch_precedence_failures_emit_tracing_events() {
    common::init_tracing();
    let events = Arc::new(AtomicUsize::new(0));
    let subscriber = CountingSubscriber {
        events: Arc::clone(&events),
    };

    let iface = InterfaceDescription::parse("interface com.acme.ev method Known()->()").unwrap();
    let service = ServiceBuilder::new(DeviceIdentity::new("events-test", 0o600))
        .add_interface(iface)
        .unwrap()
        .build();

    tracing::subscriber::with_default(subscriber, || {
        use varlink_service::value::parse_str;
        use varlink_service::Connection;

        let conn = Connection::new(Arc::clone(&service));
        let call = parse_str(r#"{"method":"nope.X"}"#).unwrap();
        conn.handle_call(call.as_object().unwrap().clone()).unwrap();

        let conn = Connection::new(service);
        let call = parse_str(r#"{"method":"com.acme.ev.Missing"}"#).unwrap();
        conn.handle_call(call.as_object().unwrap().clone()).unwrap();
    });

    assert!(events.load(Ordering::SeqCst) >= 2);
}
