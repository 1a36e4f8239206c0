//! In-process pipe: an [`Endpoint`] backed by a bounded channel.
//!
//! The pipe models a transport connection without any I/O. The socket side
//! holds a [`PipeEndpoint`]; the peer side holds a [`PipeRemote`] and reads
//! whatever the socket delivered.
//!
//! Delivery is strictly non-blocking: a full channel reports
//! [`SpError::Backpressure`], a dropped peer reports [`SpError::EndpointClosed`].
//!
//! # Usage
//!
//! ```
//! use spreq_core::endpoint::Endpoint;
//! use spreq_core::message::Message;
//! use spreq_core::pipe;
//! use spreq_core::protocol::ProtocolId;
//!
//! let (endpoint, remote) = pipe::pair(ProtocolId::Rep.number(), 4);
//! endpoint.send_msg(&Message::new("hello")).unwrap();
//! assert_eq!(remote.try_recv().unwrap().body().as_ref(), b"hello");
//! ```

use std::time::Duration;

use flume::{Receiver, Sender, TryRecvError, TrySendError};

use crate::endpoint::{Endpoint, EndpointId};
use crate::error::{Result, SpError};
use crate::message::Message;

/// Create a connected pipe with room for `capacity` undelivered messages.
///
/// A zero capacity is bumped to one so the pipe can ever accept a message.
pub fn pair(peer_protocol: u16, capacity: usize) -> (PipeEndpoint, PipeRemote) {
    let (tx, rx) = flume::bounded(capacity.max(1));
    let id = EndpointId::next();
    (
        PipeEndpoint {
            id,
            peer_protocol,
            tx,
        },
        PipeRemote { id, rx },
    )
}

/// Socket-side half of a pipe.
#[derive(Debug)]
pub struct PipeEndpoint {
    id: EndpointId,
    peer_protocol: u16,
    tx: Sender<Message>,
}

impl Endpoint for PipeEndpoint {
    fn id(&self) -> EndpointId {
        self.id
    }

    fn peer_protocol(&self) -> u16 {
        self.peer_protocol
    }

    fn send_msg(&self, msg: &Message) -> Result<()> {
        match self.tx.try_send(msg.clone()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(SpError::Backpressure),
            Err(TrySendError::Disconnected(_)) => Err(SpError::EndpointClosed),
        }
    }
}

/// Peer-side half of a pipe.
#[derive(Debug)]
pub struct PipeRemote {
    id: EndpointId,
    rx: Receiver<Message>,
}

impl PipeRemote {
    /// Id of the socket-side endpoint this remote is paired with.
    #[must_use]
    pub const fn endpoint_id(&self) -> EndpointId {
        self.id
    }

    /// Take a delivered message if one is waiting.
    pub fn try_recv(&self) -> Option<Message> {
        match self.rx.try_recv() {
            Ok(msg) => Some(msg),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Wait up to `timeout` for a delivered message.
    ///
    /// # Errors
    ///
    /// [`SpError::Timeout`] if nothing arrives in time, [`SpError::EndpointClosed`]
    /// once the socket side is gone and the channel is drained.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Message> {
        self.rx.recv_timeout(timeout).map_err(|e| match e {
            flume::RecvTimeoutError::Timeout => SpError::Timeout(timeout),
            flume::RecvTimeoutError::Disconnected => SpError::EndpointClosed,
        })
    }

    /// Wait for a delivered message.
    ///
    /// # Errors
    ///
    /// [`SpError::EndpointClosed`] once the socket side is gone.
    pub async fn recv(&self) -> Result<Message> {
        self.rx
            .recv_async()
            .await
            .map_err(|_| SpError::EndpointClosed)
    }

    /// Number of delivered messages not yet read.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}
