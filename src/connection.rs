//! Per-connection state machine: decodes one inbound call, dispatches to
//! a handler, frames outbound replies (possibly several, for streaming
//! calls), and wakes readers.

use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::Notify;
use tracing::{trace, warn};
use uuid::Uuid;

use crate::buffer::ByteBuffer;
use crate::protocol::{pack_reply, unpack_call, CallFlags, ProtocolError, ReplyFlags};
use crate::service::{Service, ServiceError};
use crate::value::{write_value, JsonObject, Value};

/// Outbound replies past this size (measured before the new reply is
/// serialized) are dropped and `overrun` is latched instead.
const OVERRUN_LIMIT: usize = 128 * 1024;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("a call is already in progress on this connection")]
    CallInProgress,
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("a reply may not set `continues` unless the call set `more`")]
    ContinuesWithoutMore,
    #[error("error name `{0}` is not declared by org.varlink.service or by the call's interface")]
    InvalidErrorName(String),
    #[error("outbound buffer exceeded 128 KiB; reply dropped")]
    Overrun,
}

/// The connection's place in the call lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    Idle,
    CallInProgress,
    Streaming,
}

#[derive(Debug, Clone)]
struct CurrentCall {
    method: String,
    flags: CallFlags,
}

struct Inner {
    buffer: ByteBuffer,
    overrun: bool,
    phase: ConnectionPhase,
    current: Option<CurrentCall>,
}

type ClosedCallback = Box<dyn FnOnce() + Send>;

/// Per-client connection state. Created on client open, destroyed
/// (invoking the closed callback) on client close.
pub struct Connection {
    id: Uuid,
    service: Arc<Service>,
    state: Mutex<Inner>,
    notify: Notify,
    closed: Mutex<Option<ClosedCallback>>,
}

impl Connection {
    pub fn new(service: Arc<Service>) -> Self {
        Self {
            id: Uuid::new_v4(),
            service,
            state: Mutex::new(Inner {
                buffer: ByteBuffer::with_capacity(256),
                overrun: false,
                phase: ConnectionPhase::Idle,
                current: None,
            }),
            notify: Notify::new(),
            closed: Mutex::new(None),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn service(&self) -> &Arc<Service> {
        &self.service
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.state.lock().unwrap().phase
    }

    /// Registers a callback invoked exactly once, when this connection is
    /// dropped.
    pub fn set_closed_callback(&self, callback: impl FnOnce() + Send + 'static) {
        *self.closed.lock().unwrap() = Some(Box::new(callback));
    }

    /// Unpacks and dispatches one inbound call object. The handler (if
    /// any) runs synchronously before this returns; it replies via
    /// [`Connection::reply`]/[`Connection::error`], which this function
    /// does not call directly.
    pub fn handle_call(&self, call_object: JsonObject) -> Result<(), ConnectionError> {
        let call = unpack_call(&call_object)?;

        {
            let mut state = self.state.lock().unwrap();
            if state.phase != ConnectionPhase::Idle {
                return Err(ConnectionError::CallInProgress);
            }
            state.current = Some(CurrentCall {
                method: call.method.clone(),
                flags: call.flags,
            });
            state.phase = ConnectionPhase::CallInProgress;
        }

        trace!(method = %call.method, connection = %self.id, "dispatching call");
        let dispatch_result = self.service.dispatch_call(self, &call.method, &call.parameters, call.flags);

        if call.flags.oneway {
            // The reply routine is a no-op for oneway calls regardless of
            // whether the handler attempted to use it; the call always
            // completes back to IDLE once the handler returns.
            let mut state = self.state.lock().unwrap();
            state.phase = ConnectionPhase::Idle;
            state.current = None;
        }

        match dispatch_result {
            Ok(()) => Ok(()),
            Err(e) => {
                let mut state = self.state.lock().unwrap();
                state.phase = ConnectionPhase::Idle;
                state.current = None;
                Err(ConnectionError::Service(e))
            }
        }
    }

    /// Sends a successful reply. A no-op for a `oneway` call. Fails with
    /// [`ConnectionError::ContinuesWithoutMore`] (no bytes enqueued) if
    /// `flags.continues` is set but the call did not carry `more`.
    pub fn reply(&self, flags: ReplyFlags, parameters: Option<JsonObject>) -> Result<(), ConnectionError> {
        let mut state = self.state.lock().unwrap();
        let Some(current) = state.current.clone() else {
            return Ok(());
        };
        if current.flags.oneway {
            return Ok(());
        }
        if flags.continues && !current.flags.more {
            return Err(ConnectionError::ContinuesWithoutMore);
        }

        let reply_object = pack_reply(None, parameters, flags);
        self.enqueue(&mut state, &reply_object)?;

        if flags.continues {
            state.phase = ConnectionPhase::Streaming;
        } else {
            state.phase = ConnectionPhase::Idle;
            state.current = None;
        }
        Ok(())
    }

    /// Sends an error reply. A no-op for a `oneway` call. The error name's
    /// interface must be `org.varlink.service` or the call's own
    /// interface; violation fails with [`ConnectionError::InvalidErrorName`]
    /// (no bytes enqueued). An error reply never sets `continues`.
    pub fn error(&self, name: &str, parameters: Option<JsonObject>) -> Result<(), ConnectionError> {
        let mut state = self.state.lock().unwrap();
        let Some(current) = state.current.clone() else {
            return Ok(());
        };
        if current.flags.oneway {
            return Ok(());
        }
        if !error_name_permitted(&self.service, name, &current.method) {
            return Err(ConnectionError::InvalidErrorName(name.to_string()));
        }

        let reply_object = pack_reply(Some(name), parameters, ReplyFlags::default());
        self.enqueue(&mut state, &reply_object)?;

        state.phase = ConnectionPhase::Idle;
        state.current = None;
        Ok(())
    }

    fn enqueue(&self, state: &mut Inner, reply_object: &JsonObject) -> Result<(), ConnectionError> {
        if state.buffer.len() > OVERRUN_LIMIT {
            warn!(connection = %self.id, "outbound buffer overrun, dropping reply");
            state.overrun = true;
            return Ok(());
        }
        write_value(&Value::Object(reply_object.clone()), &mut state.buffer);
        state.buffer.append_nul();
        self.notify.notify_waiters();
        Ok(())
    }

    /// Waits until a reply has been enqueued since the last notification.
    pub async fn wait_for_reply(&self) {
        self.notify.notified().await;
    }

    /// Drains whatever bytes have accumulated. If `overrun` is latched,
    /// reports it exactly once (clearing the flag) instead of draining;
    /// the next call resumes normal draining.
    pub fn drain(&self) -> Result<Vec<u8>, ConnectionError> {
        let mut state = self.state.lock().unwrap();
        if state.overrun {
            state.overrun = false;
            return Err(ConnectionError::Overrun);
        }
        Ok(state.buffer.steal())
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Some(callback) = self.closed.lock().unwrap().take() {
            callback();
        }
    }
}

fn interface_of(fqn: &str) -> Option<&str> {
    fqn.rfind('.').map(|dot| &fqn[..dot])
}

fn member_of(fqn: &str) -> Option<&str> {
    fqn.rfind('.').map(|dot| &fqn[dot + 1..])
}

/// An error reply's name must resolve to an interface that is either
/// `org.varlink.service` or the call's own interface, and the member
/// must actually be declared in that interface's error table.
fn error_name_permitted(service: &Service, error_name: &str, call_method: &str) -> bool {
    let (Some(error_interface), Some(member)) = (interface_of(error_name), member_of(error_name))
    else {
        return false;
    };
    if error_interface != "org.varlink.service" && interface_of(call_method) != Some(error_interface) {
        return false;
    }
    service
        .find_interface(error_interface)
        .map(|iface| iface.find_error(member))
        .unwrap_or(false)
}
