//! Generic requester send/receive engine (raw XREQ).
//!
//! `XReq` knows nothing about correlation or retries. It pumps the socket's
//! send queue into endpoints chosen by the registry and the socket's accepted
//! inbound queue into the application. Both pumps stop at the first sign of
//! backpressure and leave the blocked message at the front of its queue, so
//! the next processing cycle picks up where this one left off. An endpoint
//! whose peer is gone is reported to the socket and the message moves on to
//! the next endpoint in the same cycle.
//!
//! The cooked REQ protocol composes an `XReq` and delegates to it after its
//! own interception logic; `XReq` is also usable on its own as a raw protocol
//! that passes headers through untouched.

use std::sync::Arc;

use spreq_core::endpoint::EndpointId;
use spreq_core::error::SpError;
use spreq_core::message::Message;
use spreq_core::options::SocketOptions;
use spreq_core::protocol::{ProtocolId, ProtocolInfo};
use tracing::{trace, warn};

use crate::protocol::{Protocol, ProtocolFactory, ProtocolSocket};

/// Pattern-agnostic send/receive processing.
pub trait BaseEngine: Send + Sync {
    fn process_send(&self);
    fn process_recv(&self);
}

/// Raw requester engine.
pub struct XReq {
    sock: Arc<dyn ProtocolSocket>,
}

impl XReq {
    pub fn new(sock: Arc<dyn ProtocolSocket>) -> Self {
        Self { sock }
    }
}

impl BaseEngine for XReq {
    fn process_send(&self) {
        while let Some(msg) = self.sock.pop_send() {
            let Some(ep) = self.sock.next_send_endpoint() else {
                trace!("[XREQ] No endpoint, keeping message queued");
                self.sock.unpop_send(msg);
                break;
            };

            match ep.send_msg(&msg) {
                Ok(()) => trace!(endpoint = %ep.id(), bytes = msg.len(), "[XREQ] Sent"),
                Err(SpError::EndpointClosed) => {
                    trace!(endpoint = %ep.id(), "[XREQ] Endpoint closed, trying next");
                    self.sock.endpoint_closed(ep.id());
                    self.sock.unpop_send(msg);
                }
                Err(e) if e.is_transient() => {
                    trace!(endpoint = %ep.id(), error = %e, "[XREQ] Send deferred");
                    self.sock.unpop_send(msg);
                    break;
                }
                Err(e) => {
                    warn!(endpoint = %ep.id(), error = %e, "[XREQ] Endpoint failed, dropping it");
                    self.sock.endpoint_closed(ep.id());
                    self.sock.unpop_send(msg);
                }
            }
        }
    }

    fn process_recv(&self) {
        while let Some(msg) = self.sock.pop_recv() {
            if let Err(msg) = self.sock.deliver(msg) {
                trace!("[XREQ] Application backpressured, holding inbound message");
                self.sock.unpop_recv(msg);
                break;
            }
        }
    }
}

impl ProtocolInfo for XReq {
    fn name(&self) -> &'static str {
        "xreq"
    }

    fn number(&self) -> u16 {
        ProtocolId::Req.number()
    }

    fn is_raw(&self) -> bool {
        true
    }

    fn valid_peer(&self, peer: u16) -> bool {
        peer == ProtocolId::Rep.number()
    }
}

impl Protocol for XReq {
    fn process_send(&self) {
        BaseEngine::process_send(self);
    }

    fn process_recv(&self) {
        BaseEngine::process_recv(self);
    }

    fn send_hook(&self, _msg: &mut Message) -> bool {
        true
    }

    fn recv_hook(&self, _msg: &mut Message) -> bool {
        true
    }

    fn remove_endpoint(&self, _id: EndpointId) {}
}

/// Factory for the raw XREQ protocol.
#[derive(Debug, Clone, Copy, Default)]
pub struct XReqFactory;

impl ProtocolFactory for XReqFactory {
    fn new_protocol(
        &self,
        sock: Arc<dyn ProtocolSocket>,
        _options: &SocketOptions,
    ) -> Box<dyn Protocol> {
        Box::new(XReq::new(sock))
    }
}
