//! Endpoint abstraction: one connected peer able to accept outbound messages.
//!
//! Endpoints are owned by the registry. Protocols keep only an [`EndpointId`]
//! as a passive reference, so a peer can disappear at any time.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;
use crate::message::Message;

static NEXT_ENDPOINT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique endpoint identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndpointId(u64);

impl EndpointId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        Self(NEXT_ENDPOINT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ep#{}", self.0)
    }
}

/// A connected peer.
///
/// `send_msg` must never block: when the peer cannot take the message right
/// now it fails fast with a transient error (see `SpError::is_transient`).
pub trait Endpoint: Send + Sync {
    /// Stable identity of this endpoint.
    fn id(&self) -> EndpointId;

    /// Protocol number the peer advertised during negotiation.
    fn peer_protocol(&self) -> u16;

    /// Attempt a single non-blocking delivery.
    fn send_msg(&self, msg: &Message) -> Result<()>;
}
