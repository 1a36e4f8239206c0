//! Cooked REQ protocol: correlated requests with automatic resend.
//!
//! # Architecture
//!
//! ```text
//! Application
//!     ↕  send_hook / recv_hook
//! Req (pending request, correlation id, retry timer)   ← one lock
//!     ↕  process_send / process_recv
//! XReq (generic queue pump)
//!     ↕
//! Endpoints (registry, round-robin)
//! ```
//!
//! Only one request is outstanding at a time. Sending a new request silently
//! supersedes the previous one; replies carrying the old id are dropped from
//! then on.
//!
//! # Wire format
//!
//! Each request gets a 32-bit big-endian correlation id appended to its header,
//! with the high (backtrace) bit set. Replies must echo it verbatim at the front
//! of their header.
//!
//! # Retry
//!
//! A request is resent when its deadline passes or when the endpoint that last
//! carried it goes away. A resend that cannot be delivered (no endpoint,
//! backpressure) is retried on the very next processing cycle instead of
//! waiting a full interval.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use spreq_core::endpoint::EndpointId;
use spreq_core::error::SpError;
use spreq_core::message::Message;
use spreq_core::options::SocketOptions;
use spreq_core::protocol::{ProtocolId, ProtocolInfo};
use spreq_core::timer::{Clock, SystemClock, Timer};
use tracing::{debug, trace};

use crate::base::{BaseEngine, XReq};
use crate::id::IdGenerator;
use crate::protocol::{Protocol, ProtocolFactory, ProtocolSocket};
use crate::retry::RetryScheduler;
use crate::timer::CompioTimer;

/// Where the pending request was last seen going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    /// Handed to the base engine; the carrying endpoint is not known.
    Unassigned,
    /// Resent directly on this endpoint.
    Sent(EndpointId),
    /// The carrying endpoint went away.
    Lost,
}

/// The single in-flight request.
#[derive(Debug)]
struct PendingRequest {
    msg: Message,
    id: u32,
    route: Route,
    next_retry: Instant,
}

struct ReqState {
    ids: IdGenerator,
    retry: RetryScheduler,
    pending: Option<PendingRequest>,

    // Reserved for a valid reply that arrives while the application is
    // backpressured. Nothing populates it yet.
    #[allow(dead_code)]
    held_reply: Option<Message>,
}

impl ReqState {
    fn needs_resend(&self) -> bool {
        match &self.pending {
            None => false,
            Some(p) => p.route == Route::Lost || self.retry.is_due(p.next_retry),
        }
    }

    /// Drop any pending request and its timer.
    fn clear(&mut self) {
        self.retry.cancel();
        self.pending = None;
    }

    /// One direct, non-blocking delivery attempt of the pending request.
    fn resend(&mut self, sock: &dyn ProtocolSocket) {
        // Stop retry accounting while we try.
        self.retry.cancel();

        let Some(pending) = self.pending.as_mut() else {
            return;
        };

        // Each closed endpoint leaves the registry, so this ends.
        loop {
            let Some(ep) = sock.next_send_endpoint() else {
                trace!(id = format_args!("{:#010x}", pending.id), "[REQ] No endpoint for resend");
                pending.next_retry = self.retry.now();
                return;
            };

            match ep.send_msg(&pending.msg) {
                Ok(()) => {
                    pending.route = Route::Sent(ep.id());
                    pending.next_retry = self.retry.reschedule();
                    debug!(
                        id = format_args!("{:#010x}", pending.id),
                        endpoint = %ep.id(),
                        "[REQ] Request resent"
                    );
                    return;
                }
                Err(e) if matches!(e, SpError::EndpointClosed) || !e.is_transient() => {
                    trace!(
                        id = format_args!("{:#010x}", pending.id),
                        endpoint = %ep.id(),
                        error = %e,
                        "[REQ] Endpoint gone, trying next"
                    );
                    sock.endpoint_closed(ep.id());
                }
                Err(e) => {
                    // Retry on the next cycle, typically triggered by a connection
                    // completing or backpressure easing.
                    pending.next_retry = self.retry.now();
                    trace!(
                        id = format_args!("{:#010x}", pending.id),
                        endpoint = %ep.id(),
                        error = %e,
                        "[REQ] Resend deferred"
                    );
                    return;
                }
            }
        }
    }
}

/// Deterministic construction inputs for [`Req`].
pub struct ReqParts {
    pub ids: IdGenerator,
    pub clock: Arc<dyn Clock>,
    pub timer: Arc<dyn Timer>,
    pub resend_ivl: Duration,
}

impl ReqParts {
    /// Entropy-seeded ids, wall clock, runtime timers.
    pub fn from_options(options: &SocketOptions) -> Self {
        Self {
            ids: IdGenerator::from_entropy(),
            clock: Arc::new(SystemClock),
            timer: Arc::new(CompioTimer),
            resend_ivl: options.resend_ivl,
        }
    }
}

/// REQ protocol state machine.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use spreq_core::message::Message;
/// use spreq_core::timer::{ManualClock, ManualTimer};
/// use spreq_proto::base::XReq;
/// use spreq_proto::id::IdGenerator;
/// use spreq_proto::protocol::{Protocol, ProtocolSocket};
/// use spreq_proto::req::{Req, ReqParts};
/// # use spreq_core::endpoint::Endpoint;
/// # struct Quiet;
/// # impl ProtocolSocket for Quiet {
/// #     fn next_send_endpoint(&self) -> Option<Arc<dyn Endpoint>> { None }
/// #     fn wake_up(&self) {}
/// #     fn endpoint_closed(&self, _: spreq_core::endpoint::EndpointId) {}
/// #     fn pop_send(&self) -> Option<Message> { None }
/// #     fn unpop_send(&self, _: Message) {}
/// #     fn pop_recv(&self) -> Option<Message> { None }
/// #     fn unpop_recv(&self, _: Message) {}
/// #     fn deliver(&self, _: Message) -> Result<(), Message> { Ok(()) }
/// # }
///
/// let sock: Arc<dyn ProtocolSocket> = Arc::new(Quiet);
/// let req = Req::with_parts(
///     Arc::clone(&sock),
///     Box::new(XReq::new(sock)),
///     ReqParts {
///         ids: IdGenerator::new(1),
///         clock: Arc::new(ManualClock::new()),
///         timer: Arc::new(ManualTimer::new()),
///         resend_ivl: Duration::from_secs(60),
///     },
/// );
///
/// let mut request = Message::new("ping");
/// assert!(req.send_hook(&mut request));
/// assert_eq!(req.pending_id(), Some(0x8000_0001));
///
/// let mut reply = Message::with_header(request.header(), "pong");
/// assert!(req.recv_hook(&mut reply));
/// assert_eq!(req.pending_id(), None);
/// ```
pub struct Req {
    sock: Arc<dyn ProtocolSocket>,
    base: Box<dyn BaseEngine>,
    state: Mutex<ReqState>,
}

impl Req {
    /// REQ over a fresh [`XReq`] with production clock, timer and entropy.
    pub fn new(sock: Arc<dyn ProtocolSocket>, options: &SocketOptions) -> Self {
        let base = Box::new(XReq::new(Arc::clone(&sock)));
        Self::with_parts(sock, base, ReqParts::from_options(options))
    }

    /// REQ with explicit collaborators.
    pub fn with_parts(
        sock: Arc<dyn ProtocolSocket>,
        base: Box<dyn BaseEngine>,
        parts: ReqParts,
    ) -> Self {
        let retry = RetryScheduler::new(parts.resend_ivl, parts.clock, parts.timer, Arc::clone(&sock));
        Self {
            sock,
            base,
            state: Mutex::new(ReqState {
                ids: parts.ids,
                retry,
                pending: None,
                held_reply: None,
            }),
        }
    }

    /// Correlation id of the outstanding request.
    pub fn pending_id(&self) -> Option<u32> {
        self.state.lock().pending.as_ref().map(|p| p.id)
    }

    /// Endpoint the outstanding request was last resent on.
    pub fn pending_endpoint(&self) -> Option<EndpointId> {
        match self.state.lock().pending.as_ref()?.route {
            Route::Sent(ep) => Some(ep),
            Route::Unassigned | Route::Lost => None,
        }
    }

    /// Deadline of the next resend, while a request is outstanding.
    pub fn next_retry(&self) -> Option<Instant> {
        self.state.lock().pending.as_ref().map(|p| p.next_retry)
    }

    /// Whether the next processing cycle will attempt a resend.
    pub fn needs_resend(&self) -> bool {
        self.state.lock().needs_resend()
    }

    /// Whether a retry timer is currently armed.
    pub fn timer_armed(&self) -> bool {
        self.state.lock().retry.is_armed()
    }

    /// Interval between resends of an unanswered request.
    pub fn resend_ivl(&self) -> Duration {
        self.state.lock().retry.interval()
    }
}

impl ProtocolInfo for Req {
    fn name(&self) -> &'static str {
        ProtocolId::Req.as_str()
    }

    fn number(&self) -> u16 {
        ProtocolId::Req.number()
    }

    fn is_raw(&self) -> bool {
        false
    }

    fn valid_peer(&self, peer: u16) -> bool {
        peer == ProtocolId::Rep.number()
    }
}

impl Protocol for Req {
    fn process_send(&self) {
        let mut state = self.state.lock();
        if state.needs_resend() {
            state.resend(&*self.sock);
        }
        drop(state);

        // The rest looks like ordinary XREQ handling.
        self.base.process_send();
    }

    fn process_recv(&self) {
        self.base.process_recv();
    }

    fn send_hook(&self, msg: &mut Message) -> bool {
        let mut state = self.state.lock();

        // Single outstanding request: whatever was pending is abandoned.
        if let Some(old) = state.pending.as_ref() {
            debug!(id = format_args!("{:#010x}", old.id), "[REQ] Superseding pending request");
        }
        state.clear();

        let id = state.ids.next_id();
        msg.put_u32(id);
        let next_retry = state.retry.reschedule();
        state.pending = Some(PendingRequest {
            msg: msg.clone(),
            id,
            route: Route::Unassigned,
            next_retry,
        });

        trace!(id = format_args!("{id:#010x}"), "[REQ] Request tagged");
        true
    }

    fn recv_hook(&self, msg: &mut Message) -> bool {
        let mut state = self.state.lock();

        let Some(expected) = state.pending.as_ref().map(|p| p.id) else {
            trace!("[REQ] Dropping reply, no request outstanding");
            return false;
        };

        match msg.get_u32() {
            Ok(id) if id == expected => {
                state.clear();
                trace!(id = format_args!("{id:#010x}"), "[REQ] Reply matched");
                true
            }
            Ok(id) => {
                trace!(
                    id = format_args!("{id:#010x}"),
                    expected = format_args!("{expected:#010x}"),
                    "[REQ] Dropping stale reply"
                );
                false
            }
            Err(e) => {
                trace!(error = %e, "[REQ] Dropping malformed reply");
                false
            }
        }
    }

    fn remove_endpoint(&self, id: EndpointId) {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let Some(pending) = state.pending.as_mut() else {
            return;
        };
        if pending.route != Route::Sent(id) {
            return;
        }

        // Losing the route makes the request due right away.
        pending.route = Route::Lost;
        pending.next_retry = state.retry.reschedule();
        debug!(
            id = format_args!("{:#010x}", pending.id),
            endpoint = %id,
            "[REQ] Endpoint carrying request removed"
        );
    }

    fn close(&self) {
        self.state.lock().clear();
    }
}

/// Factory for the REQ protocol.
///
/// Defaults to the wall clock, [`CompioTimer`] and entropy-seeded ids; tests
/// swap in deterministic collaborators.
#[derive(Clone)]
pub struct ReqFactory {
    clock: Arc<dyn Clock>,
    timer: Arc<dyn Timer>,
    seed: Option<u32>,
}

impl ReqFactory {
    /// Factory with production collaborators.
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            timer: Arc::new(CompioTimer),
            seed: None,
        }
    }

    /// Judge retry deadlines against `clock`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Arm retry timers on `timer`.
    pub fn with_timer(mut self, timer: Arc<dyn Timer>) -> Self {
        self.timer = timer;
        self
    }

    /// Start every socket's id counter at `seed`.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for ReqFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolFactory for ReqFactory {
    fn new_protocol(
        &self,
        sock: Arc<dyn ProtocolSocket>,
        options: &SocketOptions,
    ) -> Box<dyn Protocol> {
        let ids = self.seed.map_or_else(IdGenerator::from_entropy, IdGenerator::new);
        let base = Box::new(XReq::new(Arc::clone(&sock)));
        Box::new(Req::with_parts(
            sock,
            base,
            ReqParts {
                ids,
                clock: Arc::clone(&self.clock),
                timer: Arc::clone(&self.timer),
                resend_ivl: options.resend_ivl,
            },
        ))
    }
}
