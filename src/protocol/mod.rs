//! Pack/unpack of Varlink call and reply envelopes (the message codec).

mod error;
mod message;

pub use error::ProtocolError;
pub use message::{pack_reply, unpack_call, Call, CallFlags, ReplyFlags};
