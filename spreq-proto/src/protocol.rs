//! Seams between a socket and the protocol running on it.
//!
//! - [`ProtocolSocket`]: what the socket offers a protocol (endpoint selection,
//!   wake-ups, the application queues)
//! - [`Protocol`]: what a protocol offers the socket (hooks, processing,
//!   endpoint notifications)
//! - [`ProtocolFactory`]: builds one fresh protocol per socket

use std::sync::Arc;

use spreq_core::endpoint::{Endpoint, EndpointId};
use spreq_core::message::Message;
use spreq_core::options::SocketOptions;
use spreq_core::protocol::ProtocolInfo;

/// Socket services consumed by a protocol.
///
/// Every method is non-blocking. Implementations must not call back into the
/// protocol, so a protocol may call these while holding its own lock.
pub trait ProtocolSocket: Send + Sync {
    /// Candidate endpoint for the next send; selection policy is the socket's.
    fn next_send_endpoint(&self) -> Option<Arc<dyn Endpoint>>;

    /// Ask for another processing cycle.
    fn wake_up(&self);

    /// An endpoint refused a send because its peer is gone. The socket stops
    /// selecting it immediately and reports the removal to the protocol on a
    /// later cycle.
    fn endpoint_closed(&self, id: EndpointId);

    /// Oldest message the application queued for sending.
    fn pop_send(&self) -> Option<Message>;

    /// Put a message back at the front of the send queue.
    fn unpop_send(&self, msg: Message);

    /// Oldest inbound message accepted for the application.
    fn pop_recv(&self) -> Option<Message>;

    /// Put a message back at the front of the inbound queue.
    fn unpop_recv(&self, msg: Message);

    /// Hand a message to the application; gives it back when the
    /// application is not keeping up.
    fn deliver(&self, msg: Message) -> Result<(), Message>;
}

/// A socket protocol.
///
/// All methods take `&self`; implementations guard their state internally so
/// the application thread, the processing cycle and timer wake-ups can share
/// one instance.
pub trait Protocol: ProtocolInfo + Send + Sync {
    /// One processing cycle: send side, then receive side.
    fn process(&self) {
        self.process_send();
        self.process_recv();
    }

    fn process_send(&self);

    fn process_recv(&self);

    /// Intercept an application message before it is queued for sending.
    /// Returning `false` drops it.
    fn send_hook(&self, msg: &mut Message) -> bool;

    /// Intercept an inbound message before it reaches the application.
    /// Returning `false` drops it.
    fn recv_hook(&self, msg: &mut Message) -> bool;

    /// A new endpoint joined the socket.
    fn add_endpoint(&self, _id: EndpointId) {}

    /// An endpoint left the socket.
    fn remove_endpoint(&self, id: EndpointId);

    /// The socket is shutting down; release timers and pending state.
    fn close(&self) {}
}

/// Builds a fresh protocol instance per socket.
pub trait ProtocolFactory: Send + Sync {
    fn new_protocol(
        &self,
        sock: Arc<dyn ProtocolSocket>,
        options: &SocketOptions,
    ) -> Box<dyn Protocol>;
}
