//! Concrete Unix-domain-socket transport: one accept loop, one task per
//! connected client, reusing the same [`Service`] for every client.
//!
//! Framing is driven manually against [`VarlinkCodec`] rather than through
//! `tokio_util::codec::Framed`, so the only transport dependency is
//! `tokio` itself plus the `codec` feature of `tokio-util` already used for
//! the `Decoder`/`Encoder` impls.

use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{UnixListener, UnixStream};
use tokio_util::codec::Decoder;
use tracing::{debug, warn};

use crate::connection::Connection;
use crate::service::{DeviceId, Service, ServiceRegistry};
use crate::value::JsonObject;

use super::super::codec::VarlinkCodec;
use super::super::error::TransportError;
use super::super::traits::Transport;

const READ_CHUNK: usize = 4096;

/// Concrete [`Transport`] over a connected Unix-domain-socket peer. Drives
/// [`VarlinkCodec`] directly against a growable read buffer rather than
/// wrapping the socket in `tokio_util::codec::Framed`: `Framed`'s
/// `Stream`/`Sink` ergonomics need `futures`/`tokio-stream`, and a manual
/// loop reads just as naturally with what's already a dependency.
pub struct UnixTransport {
    reader: OwnedReadHalf,
    writer: OwnedWriteHalf,
    codec: VarlinkCodec,
    buf: BytesMut,
}

impl UnixTransport {
    pub fn new(stream: UnixStream) -> Self {
        let (reader, writer) = stream.into_split();
        Self {
            reader,
            writer,
            codec: VarlinkCodec,
            buf: BytesMut::with_capacity(READ_CHUNK),
        }
    }
}

impl Transport for UnixTransport {
    type Error = TransportError;

    async fn send(&mut self, bytes: Vec<u8>) -> Result<(), Self::Error> {
        self.writer.write_all(&bytes).await?;
        Ok(())
    }

    async fn receive(&mut self) -> Result<Option<JsonObject>, Self::Error> {
        loop {
            if let Some(object) = self.codec.decode(&mut self.buf)? {
                return Ok(Some(object));
            }
            if self.reader.read_buf(&mut self.buf).await? == 0 {
                return Ok(None);
            }
        }
    }

    async fn close(&mut self) -> Result<(), Self::Error> {
        self.writer.shutdown().await?;
        Ok(())
    }
}

/// Accepts connections on `listener` forever. Each accepted peer is bound
/// to whatever service `device` resolves to in `registry` at accept time
/// (the open path's device-identity lookup); a peer accepted after the
/// device is removed from the registry is closed immediately.
pub async fn serve_unix(
    listener: UnixListener,
    registry: Arc<ServiceRegistry>,
    device: DeviceId,
) -> Result<(), TransportError> {
    loop {
        let (stream, _addr) = listener.accept().await?;
        let Some(service) = registry.lookup(&device) else {
            warn!(device = device.as_str(), "no service registered for device, closing connection");
            continue;
        };
        tokio::spawn(async move {
            if let Err(err) = handle_client(stream, service).await {
                warn!(error = %err, "varlink client session ended with an error");
            }
        });
    }
}

async fn handle_client(stream: UnixStream, service: Arc<Service>) -> Result<(), TransportError> {
    let connection = Arc::new(Connection::new(service));
    debug!(connection = %connection.id(), "client connected");

    let mut transport = UnixTransport::new(stream);

    while let Some(call_object) = transport.receive().await? {
        if let Err(err) = connection.handle_call(call_object) {
            warn!(connection = %connection.id(), error = %err, "call dispatch failed");
            continue;
        }
        match connection.drain() {
            Ok(bytes) if !bytes.is_empty() => transport.send(bytes).await?,
            Ok(_) => {}
            Err(err) => warn!(connection = %connection.id(), error = %err, "reply buffer overrun"),
        }
    }

    let _ = transport.close().await;
    debug!(connection = %connection.id(), "client disconnected");
    Ok(())
}
