//! spreq Error Types
//!
//! Error handling shared by the core building blocks and the protocol layer.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Main error type for spreq operations
#[derive(Error, Debug)]
pub enum SpError {
    /// IO error surfaced by a transport
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Message header does not hold enough bytes for the requested field
    #[error("Message header too short: {len} bytes (need {need})")]
    HeaderTooShort { len: usize, need: usize },

    /// The endpoint cannot accept a message right now
    #[error("Endpoint is backpressured")]
    Backpressure,

    /// The endpoint's peer went away
    #[error("Endpoint closed")]
    EndpointClosed,

    /// An endpoint with the same id is already registered
    #[error("Endpoint {0} already attached")]
    DuplicateEndpoint(u64),

    /// Peer advertised a protocol that cannot talk to this socket
    #[error("Incompatible peer protocol {peer} for {ours}")]
    IncompatiblePeer { ours: &'static str, peer: u16 },

    /// Receive did not complete in time
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Socket closed
    #[error("Socket closed")]
    SocketClosed,
}

/// Result type alias for spreq operations
pub type Result<T> = std::result::Result<T, SpError>;

impl SpError {
    /// Create a header-too-short error
    pub const fn header_too_short(len: usize, need: usize) -> Self {
        Self::HeaderTooShort { len, need }
    }

    /// Create an incompatible peer error
    pub const fn incompatible_peer(ours: &'static str, peer: u16) -> Self {
        Self::IncompatiblePeer { ours, peer }
    }

    /// Check if this error is a transient delivery condition.
    ///
    /// Transient errors are absorbed by the retry loop and never reach the
    /// application.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Backpressure | Self::EndpointClosed => true,
            Self::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}

impl From<SpError> for io::Error {
    fn from(err: SpError) -> Self {
        let kind = match &err {
            SpError::Io(e) => e.kind(),
            SpError::HeaderTooShort { .. } => io::ErrorKind::InvalidData,
            SpError::Backpressure => io::ErrorKind::WouldBlock,
            SpError::EndpointClosed | SpError::SocketClosed => io::ErrorKind::BrokenPipe,
            SpError::DuplicateEndpoint(_) => io::ErrorKind::AlreadyExists,
            SpError::IncompatiblePeer { .. } => io::ErrorKind::ConnectionRefused,
            SpError::Timeout(_) => io::ErrorKind::TimedOut,
        };
        Self::new(kind, err)
    }
}
