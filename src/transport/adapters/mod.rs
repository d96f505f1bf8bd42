//! Concrete transport adapters. The Unix-domain-socket adapter is the only
//! one shipped; other transports (a loopback pipe for tests, a character
//! device, a TCP listener) implement the same shape.

mod unix;

pub use unix::serve_unix;
