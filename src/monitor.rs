//! Process-wide registry of connections currently in streaming mode.
//!
//! An application-level utility, not a core protocol component: a
//! notification source (e.g. a USB bus listener) holds a set of
//! connections it should broadcast to, and removes an entry when its
//! connection closes.

use std::sync::{Arc, Mutex, Weak};

use crate::connection::Connection;

/// A set of connection handles a notification source broadcasts to.
/// Holds weak references so a connection's own drop (and closed-callback
/// removal) is never blocked by the monitor set's membership.
#[derive(Default)]
pub struct MonitorSet {
    members: Mutex<Vec<Weak<Connection>>>,
}

impl MonitorSet {
    pub fn new() -> Self {
        Self {
            members: Mutex::new(Vec::new()),
        }
    }

    /// Adds `connection` to the set, and registers a closed callback that
    /// removes it again once the connection closes.
    pub fn add(self: &Arc<Self>, connection: &Arc<Connection>) {
        self.members.lock().unwrap().push(Arc::downgrade(connection));
        let set = Arc::clone(self);
        let id = connection.id();
        connection.set_closed_callback(move || set.remove(id));
    }

    fn remove(&self, id: uuid::Uuid) {
        let mut members = self.members.lock().unwrap();
        members.retain(|weak| weak.upgrade().map(|c| c.id() != id).unwrap_or(false));
    }

    /// Invokes `broadcast` for every still-live member, dropping any that
    /// have since been closed.
    pub fn broadcast(&self, mut broadcast: impl FnMut(&Arc<Connection>)) {
        let mut members = self.members.lock().unwrap();
        members.retain(|weak| {
            if let Some(connection) = weak.upgrade() {
                broadcast(&connection);
                true
            } else {
                false
            }
        });
    }

    pub fn len(&self) -> usize {
        self.members.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idl::InterfaceDescription;
    use crate::service::{DeviceIdentity, ServiceBuilder};

    fn test_service() -> Arc<crate::service::Service> {
        let iface = InterfaceDescription::parse("interface com.acme.mon method Watch()->()").unwrap();
        ServiceBuilder::new(DeviceIdentity::new("monitor-test", 0o600))
            .add_interface(iface)
            .unwrap()
            .build()
    }

    #[test]
    fn add_then_drop_removes_member() {
        let set = Arc::new(MonitorSet::new());
        let conn = Arc::new(Connection::new(test_service()));
        set.add(&conn);
        assert_eq!(set.len(), 1);
        drop(conn);
        // A broadcast pass prunes dead weak references.
        set.broadcast(|_| {});
        assert!(set.is_empty());
    }
}
