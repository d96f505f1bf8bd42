//! Wire framing and concrete I/O adapters binding a [`Service`](crate::service::Service)
//! to connected clients.

mod adapters;
mod codec;
mod error;
mod traits;

pub use adapters::serve_unix;
pub use codec::VarlinkCodec;
pub use error::TransportError;
pub use traits::Transport;
