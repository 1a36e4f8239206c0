//! Scalability-protocol message: a protocol header plus an opaque body.
//!
//! The header carries protocol bookkeeping (for REQ/REP, the 32-bit
//! correlation id / backtrace). The body is the application payload and is
//! never touched by the protocol layer.
//!
//! Header integers are big-endian.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, SpError};

/// A message travelling through a socket.
///
/// Cloning is cheap for the body (`Bytes` is refcounted); the header is a
/// handful of bytes and is copied.
///
/// # Examples
///
/// ```
/// use spreq_core::message::Message;
///
/// let mut msg = Message::new("ping");
/// msg.put_u32(0x8000_0001);
/// assert_eq!(msg.header(), &[0x80, 0x00, 0x00, 0x01][..]);
/// assert_eq!(msg.get_u32().unwrap(), 0x8000_0001);
/// assert!(msg.header().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    header: BytesMut,
    body: Bytes,
}

impl Message {
    /// Create a message with an empty header.
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            header: BytesMut::new(),
            body: body.into(),
        }
    }

    /// Create a message from an existing header and body.
    pub fn with_header(header: impl AsRef<[u8]>, body: impl Into<Bytes>) -> Self {
        Self {
            header: BytesMut::from(header.as_ref()),
            body: body.into(),
        }
    }

    /// Header bytes not yet consumed.
    #[must_use]
    pub fn header(&self) -> &[u8] {
        &self.header
    }

    /// Application payload.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consume the message and return its body.
    #[must_use]
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Append a big-endian `u32` to the header.
    pub fn put_u32(&mut self, value: u32) {
        self.header.put_u32(value);
    }

    /// Consume a big-endian `u32` from the front of the header.
    ///
    /// # Errors
    ///
    /// Returns [`SpError::HeaderTooShort`] when fewer than four header bytes
    /// remain. The header is left untouched in that case.
    pub fn get_u32(&mut self) -> Result<u32> {
        if self.header.len() < 4 {
            return Err(SpError::header_too_short(self.header.len(), 4));
        }
        Ok(self.header.get_u32())
    }

    /// Total size on the wire (header + body).
    #[must_use]
    pub fn len(&self) -> usize {
        self.header.len() + self.body.len()
    }

    /// True when both header and body are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.body.is_empty()
    }
}

impl From<Bytes> for Message {
    fn from(body: Bytes) -> Self {
        Self::new(body)
    }
}

impl From<&'static str> for Message {
    fn from(body: &'static str) -> Self {
        Self::new(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_appends_big_endian() {
        let mut msg = Message::new("body");
        msg.put_u32(1);
        msg.put_u32(0x8000_0002);

        assert_eq!(msg.header(), &[0, 0, 0, 1, 0x80, 0, 0, 2][..]);
        assert_eq!(msg.len(), 12);
        assert_eq!(msg.body(), &Bytes::from_static(b"body"));
    }

    #[test]
    fn test_get_consumes_front() {
        let mut msg = Message::with_header([0x80, 0, 0, 7, 0xAA], "x");

        assert_eq!(msg.get_u32().unwrap(), 0x8000_0007);
        assert_eq!(msg.header(), &[0xAA][..]);
    }

    #[test]
    fn test_get_short_header_leaves_header() {
        let mut msg = Message::with_header([1, 2, 3], "x");

        let err = msg.get_u32().unwrap_err();
        assert!(matches!(err, SpError::HeaderTooShort { len: 3, need: 4 }));
        assert_eq!(msg.header(), &[1, 2, 3][..]);
    }

    #[test]
    fn test_empty_message() {
        let msg = Message::default();
        assert!(msg.is_empty());
        assert_eq!(msg.len(), 0);
        assert_eq!(Message::new("a").into_body(), Bytes::from_static(b"a"));
    }
}
