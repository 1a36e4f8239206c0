//! In-crate test double for [`ProtocolSocket`].

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use spreq_core::endpoint::{Endpoint, EndpointId};
use spreq_core::message::Message;
use spreq_core::pipe::{self, PipeRemote};
use spreq_core::protocol::ProtocolId;
use spreq_core::registry::EndpointRegistry;

use crate::protocol::ProtocolSocket;

/// Registry + queues + counters, no driver.
#[derive(Default)]
pub struct TestSocket {
    registry: Mutex<EndpointRegistry>,
    outbound: Mutex<VecDeque<Message>>,
    inbound: Mutex<VecDeque<Message>>,
    delivered: Mutex<Vec<Message>>,
    deliver_capacity: Option<usize>,
    wakes: AtomicUsize,
    closed: Mutex<Vec<EndpointId>>,
}

impl TestSocket {
    /// Socket whose application accepts at most `n` deliveries.
    pub fn with_deliver_capacity(n: usize) -> Self {
        Self {
            deliver_capacity: Some(n),
            ..Self::default()
        }
    }

    pub fn attach_pipe(&self, capacity: usize) -> PipeRemote {
        let (ep, remote) = pipe::pair(ProtocolId::Rep.number(), capacity);
        self.registry
            .lock()
            .add(Arc::new(ep))
            .expect("fresh endpoint id");
        remote
    }

    pub fn detach(&self, id: EndpointId) {
        self.registry.lock().remove(id);
    }

    pub fn queue_send(&self, msg: Message) {
        self.outbound.lock().push_back(msg);
    }

    pub fn queue_recv(&self, msg: Message) {
        self.inbound.lock().push_back(msg);
    }

    pub fn queued_sends(&self) -> usize {
        self.outbound.lock().len()
    }

    pub fn queued_recvs(&self) -> usize {
        self.inbound.lock().len()
    }

    pub fn delivered(&self) -> Vec<Message> {
        self.delivered.lock().clone()
    }

    pub fn wakes(&self) -> usize {
        self.wakes.load(Ordering::SeqCst)
    }

    /// Endpoints reported closed, in report order.
    pub fn closed_endpoints(&self) -> Vec<EndpointId> {
        self.closed.lock().clone()
    }
}

impl ProtocolSocket for TestSocket {
    fn next_send_endpoint(&self) -> Option<Arc<dyn Endpoint>> {
        self.registry.lock().next()
    }

    fn wake_up(&self) {
        self.wakes.fetch_add(1, Ordering::SeqCst);
    }

    fn endpoint_closed(&self, id: EndpointId) {
        if self.registry.lock().remove(id).is_some() {
            self.closed.lock().push(id);
        }
    }

    fn pop_send(&self) -> Option<Message> {
        self.outbound.lock().pop_front()
    }

    fn unpop_send(&self, msg: Message) {
        self.outbound.lock().push_front(msg);
    }

    fn pop_recv(&self) -> Option<Message> {
        self.inbound.lock().pop_front()
    }

    fn unpop_recv(&self, msg: Message) {
        self.inbound.lock().push_front(msg);
    }

    fn deliver(&self, msg: Message) -> Result<(), Message> {
        let mut delivered = self.delivered.lock();
        if self.deliver_capacity.is_some_and(|cap| delivered.len() >= cap) {
            return Err(msg);
        }
        delivered.push(msg);
        Ok(())
    }
}
