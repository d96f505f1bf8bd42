//! NUL-delimited framing over the wire, matching the record separator the
//! JSON value serializer appends after every reply.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::value::{parse_str, JsonObject};

use super::error::TransportError;

/// Inbound call frames past this size are rejected rather than buffered
/// indefinitely waiting for a NUL that may never arrive.
const MAX_FRAME_SIZE: usize = 128 * 1024;

/// Decodes inbound bytes into call objects split on NUL; encodes outbound
/// bytes (already NUL-terminated by [`crate::connection::Connection::drain`])
/// by passing them through unchanged.
#[derive(Debug, Default)]
pub struct VarlinkCodec;

impl Decoder for VarlinkCodec {
    type Item = JsonObject;
    type Error = TransportError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(nul_pos) = src.iter().position(|&b| b == 0) else {
            if src.len() > MAX_FRAME_SIZE {
                return Err(TransportError::message_too_large(src.len()));
            }
            return Ok(None);
        };
        if nul_pos > MAX_FRAME_SIZE {
            return Err(TransportError::message_too_large(nul_pos));
        }

        let frame = src.split_to(nul_pos + 1);
        let text = std::str::from_utf8(&frame[..nul_pos]).map_err(|_| TransportError::invalid_utf8())?;
        let value = parse_str(text)?;
        let object = value.as_object().cloned().ok_or_else(TransportError::not_an_object)?;
        Ok(Some(object))
    }
}

impl Encoder<Vec<u8>> for VarlinkCodec {
    type Error = TransportError;

    fn encode(&mut self, item: Vec<u8>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(&item);
        Ok(())
    }
}
