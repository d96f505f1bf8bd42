use std::future::Future;

use crate::value::JsonObject;

/// Contract a concrete transport adapter implements to carry Varlink call
/// and reply bytes between a client and a [`Connection`](crate::connection::Connection).
///
/// Expressed as async-fn-in-trait rather than with `#[async_trait]`: every
/// implementation here is a thin wrapper over an owned I/O handle, so the
/// extra boxing the macro would add buys nothing.
pub trait Transport: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Writes one fully-framed (NUL-terminated) outbound chunk.
    fn send(&mut self, bytes: Vec<u8>) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Reads and returns the next complete inbound call, decoded from its
    /// NUL-terminated frame. Returns `Ok(None)` on a clean EOF.
    fn receive(&mut self) -> impl Future<Output = Result<Option<JsonObject>, Self::Error>> + Send;

    /// Shuts the transport down. Idempotent.
    fn close(&mut self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
