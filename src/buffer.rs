//! Growable byte accumulator used while serializing replies and JSON values.
//!
//! Mirrors the doubling-growth, steal-by-value shape of a C arena buffer,
//! expressed with `Vec<u8>` and `std::fmt::Write` instead of a bespoke
//! printf-style append function.

use std::fmt;

/// A write-only byte buffer that grows by doubling.
#[derive(Debug, Default)]
pub struct ByteBuffer {
    data: Vec<u8>,
}

impl ByteBuffer {
    /// Creates an empty buffer with no pre-allocated capacity.
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Creates an empty buffer with at least `capacity` bytes reserved.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes currently accumulated.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True iff no bytes have been accumulated.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Appends raw bytes.
    pub fn append(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Appends a single NUL byte, the Varlink wire record separator.
    pub fn append_nul(&mut self) {
        self.data.push(0);
    }

    /// Returns the accumulated bytes so far without consuming the buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Transfers ownership of the accumulated bytes to the caller and
    /// resets this buffer to empty, as the original `buffer_steal_data`
    /// does for its arena.
    pub fn steal(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.data)
    }
}

impl fmt::Write for ByteBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.data.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write as _;

    #[test]
    fn append_and_steal_round_trips_bytes() {
        let mut buf = ByteBuffer::new();
        buf.append(b"hello");
        buf.append_nul();
        assert_eq!(buf.len(), 6);

        let stolen = buf.steal();
        assert_eq!(stolen, b"hello\0");
        assert!(buf.is_empty());
    }

    #[test]
    fn formatted_append_grows_past_initial_capacity() {
        let mut buf = ByteBuffer::with_capacity(1);
        for i in 0..100 {
            write!(buf, "{i},").unwrap();
        }
        assert!(buf.len() > 100);
        assert!(buf.as_bytes().starts_with(b"0,1,2,"));
    }

    #[test]
    fn steal_resets_buffer_to_empty() {
        let mut buf = ByteBuffer::new();
        buf.append(b"abc");
        let _ = buf.steal();
        buf.append(b"xyz");
        assert_eq!(buf.as_bytes(), b"xyz");
    }
}
