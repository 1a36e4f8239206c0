//! Socket event monitoring.
//!
//! Provides event streams for tracking endpoint churn on a socket.

use crate::endpoint::EndpointId;
use std::fmt;

/// Socket lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketEvent {
    /// An endpoint joined the registry.
    EndpointAttached(EndpointId),

    /// An endpoint left the registry.
    EndpointDetached(EndpointId),

    /// The socket stopped processing.
    Closed,
}

impl fmt::Display for SocketEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndpointAttached(ep) => write!(f, "Attached {ep}"),
            Self::EndpointDetached(ep) => write!(f, "Detached {ep}"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

/// Handle for receiving socket events.
pub type SocketMonitor = flume::Receiver<SocketEvent>;

/// Internal sender for socket events.
pub type SocketEventSender = flume::Sender<SocketEvent>;

/// Creates a new monitoring channel pair.
#[must_use]
pub fn create_monitor() -> (SocketEventSender, SocketMonitor) {
    flume::unbounded()
}
