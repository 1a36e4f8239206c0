//! Socket driver and application handle.
//!
//! # Architecture
//!
//! ```text
//! Socket (handle, cloneable) ──cmd──┐
//! PipePeer (remote side)     ──cmd──┼──► SocketDriver ──► Protocol ──► SocketCore
//! Retry timer (wake)         ──cmd──┘                                  (registry, queues)
//! ```
//!
//! Every state change flows through one command channel and is applied by a
//! single driver, which then runs a processing cycle. The driver never holds
//! the registry lock while calling into the protocol.
//!
//! Run the driver with [`SocketDriver::run`] on any async runtime, with
//! [`SocketDriver::run_blocking`] on a thread, or step it by hand with
//! [`SocketDriver::run_pending`] in tests. [`Socket::spawn`] runs it on its
//! own thread under a compio runtime.
//!
//! An endpoint whose peer is gone leaves the registry as soon as a send to it
//! fails, and the protocol hears about it on the next command.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use flume::{Receiver, Sender, TryRecvError};
use futures::StreamExt;
use parking_lot::Mutex;
use spreq_core::endpoint::{Endpoint, EndpointId};
use spreq_core::error::{Result, SpError};
use spreq_core::message::Message;
use spreq_core::monitor::{create_monitor, SocketEvent, SocketEventSender, SocketMonitor};
use spreq_core::options::SocketOptions;
use spreq_core::pipe::{self, PipeRemote};
use spreq_core::protocol::ProtocolId;
use spreq_core::registry::EndpointRegistry;
use tracing::{debug, trace, warn};

use crate::protocol::{Protocol, ProtocolFactory, ProtocolSocket};
use crate::req::ReqFactory;

/// Commands consumed by the driver.
pub enum SocketCmd {
    /// Application request.
    Send(Message),
    Attach(Arc<dyn Endpoint>),
    Detach(EndpointId),
    /// Endpoint found dead while sending; already out of the registry.
    Lost(EndpointId),
    /// Message arriving from an endpoint.
    Inbound(Message),
    /// Run a processing cycle.
    Wake,
    Close,
}

impl std::fmt::Debug for SocketCmd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Send(msg) => f.debug_tuple("Send").field(&msg.len()).finish(),
            Self::Attach(ep) => f.debug_tuple("Attach").field(&ep.id()).finish(),
            Self::Detach(id) => f.debug_tuple("Detach").field(id).finish(),
            Self::Lost(id) => f.debug_tuple("Lost").field(id).finish(),
            Self::Inbound(msg) => f.debug_tuple("Inbound").field(&msg.len()).finish(),
            Self::Wake => f.write_str("Wake"),
            Self::Close => f.write_str("Close"),
        }
    }
}

/// Socket-owned state shared with the protocol.
struct SocketCore {
    registry: Mutex<EndpointRegistry>,
    outbound: Mutex<VecDeque<Message>>,
    inbound: Mutex<VecDeque<Message>>,
    reply_tx: Mutex<Option<Sender<Message>>>,
    monitors: Mutex<Vec<SocketEventSender>>,
    cmd_tx: Sender<SocketCmd>,
    send_hwm: usize,
}

impl SocketCore {
    /// Queue an application request, evicting the oldest one past the HWM.
    fn enqueue(&self, msg: Message) {
        let mut outbound = self.outbound.lock();
        outbound.push_back(msg);
        if outbound.len() > self.send_hwm {
            outbound.pop_front();
            warn!(hwm = self.send_hwm, "[SOCKET] Send queue full, dropped oldest message");
        }
    }

    fn emit(&self, event: SocketEvent) {
        self.monitors.lock().retain(|tx| tx.send(event).is_ok());
    }

    /// Disconnect the application's reply channel.
    fn shutdown(&self) {
        self.reply_tx.lock().take();
        self.registry.lock().clear();
        self.outbound.lock().clear();
        self.inbound.lock().clear();
    }
}

impl ProtocolSocket for SocketCore {
    fn next_send_endpoint(&self) -> Option<Arc<dyn Endpoint>> {
        self.registry.lock().next()
    }

    fn wake_up(&self) {
        // The driver may already be gone.
        let _ = self.cmd_tx.send(SocketCmd::Wake);
    }

    fn endpoint_closed(&self, id: EndpointId) {
        let removed = self.registry.lock().remove(id);
        if removed.is_some() {
            debug!(endpoint = %id, "[SOCKET] Endpoint peer gone");
            let _ = self.cmd_tx.send(SocketCmd::Lost(id));
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

    fn deliver(&self, msg: Message) -> std::result::Result<(), Message> {
        match self.reply_tx.lock().as_ref() {
            Some(tx) => tx.try_send(msg).map_err(flume::TrySendError::into_inner),
            None => Err(msg),
        }
    }
}

/// Single consumer of a socket's commands.
pub struct SocketDriver {
    core: Arc<SocketCore>,
    protocol: Arc<dyn Protocol>,
    cmd_rx: Receiver<SocketCmd>,
    closed: bool,
}

impl SocketDriver {
    /// Apply one command. Returns `false` once the socket is closed.
    pub fn handle(&mut self, cmd: SocketCmd) -> bool {
        if self.closed {
            return false;
        }
        trace!(?cmd, "[SOCKET] Command");

        match cmd {
            SocketCmd::Send(mut msg) => {
                if self.protocol.send_hook(&mut msg) {
                    self.core.enqueue(msg);
                } else {
                    trace!("[SOCKET] Send hook dropped message");
                }
            }
            SocketCmd::Attach(ep) => {
                let id = ep.id();
                let added = self.core.registry.lock().add(ep);
                match added {
                    Ok(()) => {
                        self.protocol.add_endpoint(id);
                        self.core.emit(SocketEvent::EndpointAttached(id));
                        debug!(endpoint = %id, "[SOCKET] Endpoint attached");
                    }
                    Err(e) => warn!(endpoint = %id, error = %e, "[SOCKET] Attach failed"),
                }
            }
            SocketCmd::Detach(id) => {
                let removed = self.core.registry.lock().remove(id);
                if removed.is_some() {
                    self.endpoint_removed(id);
                }
            }
            SocketCmd::Lost(id) => self.endpoint_removed(id),
            SocketCmd::Inbound(mut msg) => {
                if self.protocol.recv_hook(&mut msg) {
                    self.core.inbound.lock().push_back(msg);
                }
            }
            SocketCmd::Wake => {}
            SocketCmd::Close => {
                self.finish();
                return false;
            }
        }

        self.protocol.process();
        true
    }

    /// Drain every queued command without blocking.
    pub fn run_pending(&mut self) -> usize {
        let mut handled = 0;
        while !self.closed {
            match self.cmd_rx.try_recv() {
                Ok(cmd) => {
                    self.handle(cmd);
                    handled += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.finish(),
            }
        }
        handled
    }

    /// Event loop for async runtimes.
    pub async fn run(mut self) {
        let mut cmds = self.cmd_rx.clone().into_stream();
        while let Some(cmd) = cmds.next().await {
            if !self.handle(cmd) {
                break;
            }
        }
        self.finish();
    }

    /// Event loop for a dedicated thread.
    pub fn run_blocking(mut self) {
        while let Ok(cmd) = self.cmd_rx.recv() {
            if !self.handle(cmd) {
                break;
            }
        }
        self.finish();
    }

    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    fn endpoint_removed(&self, id: EndpointId) {
        self.protocol.remove_endpoint(id);
        self.core.emit(SocketEvent::EndpointDetached(id));
        debug!(endpoint = %id, "[SOCKET] Endpoint detached");
    }

    fn finish(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.protocol.close();
        self.core.shutdown();
        self.core.emit(SocketEvent::Closed);
        debug!(protocol = self.protocol.name(), "[SOCKET] Closed");
    }
}

struct SocketInner {
    core: Arc<SocketCore>,
    protocol: Arc<dyn Protocol>,
    cmd_tx: Sender<SocketCmd>,
    reply_rx: Receiver<Message>,
    options: SocketOptions,
}

impl Drop for SocketInner {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(SocketCmd::Close);
    }
}

/// Application handle to a socket.
///
/// Clones share the socket; the socket closes when the last clone drops.
///
/// # Example
///
/// ```
/// use spreq_proto::socket::Socket;
/// use spreq_core::options::SocketOptions;
///
/// let (socket, mut driver) = Socket::new(SocketOptions::new());
/// let peer = socket.pipe().unwrap();
///
/// socket.send("ping").unwrap();
/// driver.run_pending();
///
/// let request = peer.try_recv().unwrap();
/// peer.reply(&request, "pong").unwrap();
/// driver.run_pending();
///
/// assert_eq!(socket.try_recv().unwrap().body().as_ref(), b"pong");
/// ```
#[derive(Clone)]
pub struct Socket {
    inner: Arc<SocketInner>,
}

impl Socket {
    /// REQ socket with production defaults.
    pub fn new(options: SocketOptions) -> (Self, SocketDriver) {
        Self::with_factory(&ReqFactory::default(), options)
    }

    /// Socket running whatever protocol `factory` builds.
    pub fn with_factory(
        factory: &dyn ProtocolFactory,
        options: SocketOptions,
    ) -> (Self, SocketDriver) {
        let (cmd_tx, cmd_rx) = flume::unbounded();
        let (reply_tx, reply_rx) = flume::bounded(options.recv_hwm.max(1));

        let core = Arc::new(SocketCore {
            registry: Mutex::new(EndpointRegistry::new()),
            outbound: Mutex::new(VecDeque::new()),
            inbound: Mutex::new(VecDeque::new()),
            reply_tx: Mutex::new(Some(reply_tx)),
            monitors: Mutex::new(Vec::new()),
            cmd_tx: cmd_tx.clone(),
            send_hwm: options.send_hwm.max(1),
        });

        let sock: Arc<dyn ProtocolSocket> = Arc::clone(&core) as Arc<dyn ProtocolSocket>;
        let protocol: Arc<dyn Protocol> = Arc::from(factory.new_protocol(sock, &options));
        debug!(
            protocol = protocol.name(),
            resend_ivl = ?options.resend_ivl,
            "[SOCKET] Created"
        );

        let driver = SocketDriver {
            core: Arc::clone(&core),
            protocol: Arc::clone(&protocol),
            cmd_rx,
            closed: false,
        };
        let socket = Self {
            inner: Arc::new(SocketInner {
                core,
                protocol,
                cmd_tx,
                reply_rx,
                options,
            }),
        };
        (socket, driver)
    }

    /// Create a socket and run its driver on a dedicated thread with its own
    /// compio runtime.
    pub fn spawn(factory: &dyn ProtocolFactory, options: SocketOptions) -> Result<Self> {
        let (socket, driver) = Self::with_factory(factory, options);
        std::thread::Builder::new()
            .name("spreq-driver".into())
            .spawn(move || match compio::runtime::Runtime::new() {
                Ok(runtime) => runtime.block_on(driver.run()),
                Err(e) => {
                    warn!(error = %e, "[SOCKET] No compio runtime, driving on a plain thread");
                    driver.run_blocking();
                }
            })?;
        Ok(socket)
    }

    pub fn protocol_name(&self) -> &'static str {
        self.inner.protocol.name()
    }

    pub fn options(&self) -> &SocketOptions {
        &self.inner.options
    }

    /// Send a request body.
    pub fn send(&self, body: impl Into<Bytes>) -> Result<()> {
        self.send_msg(Message::new(body))
    }

    pub fn send_msg(&self, msg: Message) -> Result<()> {
        self.command(SocketCmd::Send(msg))
    }

    /// Wait for the next accepted reply, honouring the receive timeout.
    pub async fn recv(&self) -> Result<Message> {
        let rx = &self.inner.reply_rx;
        match self.inner.options.recv_timeout {
            None => rx.recv_async().await.map_err(|_| SpError::SocketClosed),
            Some(d) if d.is_zero() => self.try_recv_now(d),
            Some(d) => match compio::time::timeout(d, rx.recv_async()).await {
                Ok(res) => res.map_err(|_| SpError::SocketClosed),
                Err(_elapsed) => Err(SpError::Timeout(d)),
            },
        }
    }

    /// Blocking variant of [`Socket::recv`].
    pub fn recv_blocking(&self) -> Result<Message> {
        let rx = &self.inner.reply_rx;
        match self.inner.options.recv_timeout {
            None => rx.recv().map_err(|_| SpError::SocketClosed),
            Some(d) if d.is_zero() => self.try_recv_now(d),
            Some(d) => rx.recv_timeout(d).map_err(|e| match e {
                flume::RecvTimeoutError::Timeout => SpError::Timeout(d),
                flume::RecvTimeoutError::Disconnected => SpError::SocketClosed,
            }),
        }
    }

    /// Accepted reply if one is ready.
    pub fn try_recv(&self) -> Option<Message> {
        self.inner.reply_rx.try_recv().ok()
    }

    fn try_recv_now(&self, d: Duration) -> Result<Message> {
        self.inner.reply_rx.try_recv().map_err(|e| match e {
            TryRecvError::Empty => SpError::Timeout(d),
            TryRecvError::Disconnected => SpError::SocketClosed,
        })
    }

    /// Add an endpoint; incompatible peers are rejected here.
    pub fn attach(&self, ep: Arc<dyn Endpoint>) -> Result<EndpointId> {
        let peer = ep.peer_protocol();
        if !self.inner.protocol.valid_peer(peer) {
            warn!(
                protocol = self.protocol_name(),
                peer,
                "[SOCKET] Rejected incompatible peer"
            );
            return Err(SpError::incompatible_peer(self.protocol_name(), peer));
        }
        let id = ep.id();
        self.command(SocketCmd::Attach(ep))?;
        Ok(id)
    }

    pub fn detach(&self, id: EndpointId) -> Result<()> {
        self.command(SocketCmd::Detach(id))
    }

    /// Inject a message as if an endpoint had received it.
    pub fn deliver(&self, msg: Message) -> Result<()> {
        self.command(SocketCmd::Inbound(msg))
    }

    /// Attach an in-process REP-side pipe and return its far end.
    pub fn pipe(&self) -> Result<PipePeer> {
        let (ep, remote) = pipe::pair(ProtocolId::Rep.number(), self.inner.options.pipe_capacity);
        self.attach(Arc::new(ep))?;
        Ok(PipePeer {
            remote,
            cmd_tx: self.inner.cmd_tx.clone(),
            attached: true,
        })
    }

    /// Subscribe to lifecycle events.
    pub fn monitor(&self) -> SocketMonitor {
        let (tx, rx) = create_monitor();
        self.inner.core.monitors.lock().push(tx);
        rx
    }

    pub fn close(&self) -> Result<()> {
        self.command(SocketCmd::Close)
    }

    fn command(&self, cmd: SocketCmd) -> Result<()> {
        self.inner
            .cmd_tx
            .send(cmd)
            .map_err(|_| SpError::SocketClosed)
    }
}

/// Far end of an in-process pipe, playing the replier.
///
/// Dropping it detaches the pipe from the socket.
pub struct PipePeer {
    remote: PipeRemote,
    cmd_tx: Sender<SocketCmd>,
    attached: bool,
}

impl PipePeer {
    pub const fn endpoint_id(&self) -> EndpointId {
        self.remote.endpoint_id()
    }

    pub fn try_recv(&self) -> Option<Message> {
        self.remote.try_recv()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<Message> {
        self.remote.recv_timeout(timeout)
    }

    pub async fn recv(&self) -> Result<Message> {
        self.remote.recv().await
    }

    /// Answer `request`, echoing its header.
    pub fn reply(&self, request: &Message, body: impl Into<Bytes>) -> Result<()> {
        self.send_raw(Message::with_header(request.header(), body))
    }

    /// Push an arbitrary message back to the socket.
    pub fn send_raw(&self, msg: Message) -> Result<()> {
        self.cmd_tx
            .send(SocketCmd::Inbound(msg))
            .map_err(|_| SpError::EndpointClosed)
    }

    /// Remove this pipe from the socket.
    pub fn disconnect(mut self) -> Result<()> {
        self.attached = false;
        self.cmd_tx
            .send(SocketCmd::Detach(self.remote.endpoint_id()))
            .map_err(|_| SpError::EndpointClosed)
    }
}

impl Drop for PipePeer {
    fn drop(&mut self) {
        if self.attached {
            // The socket may already be closed.
            let _ = self.cmd_tx.send(SocketCmd::Detach(self.remote.endpoint_id()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::XReqFactory;
    use spreq_core::timer::{ManualClock, ManualTimer};

    const IVL: Duration = Duration::from_secs(60);

    fn req_socket() -> (Socket, SocketDriver, ManualClock, ManualTimer) {
        let clock = ManualClock::new();
        let timer = ManualTimer::new();
        let factory = ReqFactory::new()
            .with_clock(Arc::new(clock.clone()))
            .with_timer(Arc::new(timer.clone()))
            .with_seed(7);
        let (socket, driver) =
            Socket::with_factory(&factory, SocketOptions::new().with_resend_ivl(IVL));
        (socket, driver, clock, timer)
    }

    #[test]
    fn test_request_reply_roundtrip() {
        let (socket, mut driver, _, _) = req_socket();
        let peer = socket.pipe().unwrap();

        socket.send("M").unwrap();
        driver.run_pending();

        let request = peer.try_recv().unwrap();
        assert_eq!(request.header(), &[0x80, 0, 0, 7][..]);
        assert_eq!(request.body().as_ref(), b"M");

        peer.reply(&request, "R").unwrap();
        driver.run_pending();

        let reply = socket.try_recv().unwrap();
        assert!(reply.header().is_empty());
        assert_eq!(reply.body().as_ref(), b"R");
    }

    #[test]
    fn test_timer_wake_resends() {
        let (socket, mut driver, clock, timer) = req_socket();
        let peer = socket.pipe().unwrap();
        socket.send("M").unwrap();
        driver.run_pending();
        let first = peer.try_recv().unwrap();

        clock.advance(IVL);
        assert_eq!(timer.fire(), 1);
        driver.run_pending();

        assert_eq!(peer.try_recv().unwrap(), first);
    }

    #[test]
    fn test_stale_reply_never_surfaces() {
        let (socket, mut driver, _, _) = req_socket();
        let peer = socket.pipe().unwrap();
        socket.send("old").unwrap();
        driver.run_pending();
        let old = peer.try_recv().unwrap();

        socket.send("new").unwrap();
        driver.run_pending();
        let new = peer.try_recv().unwrap();

        peer.reply(&old, "late").unwrap();
        peer.reply(&new, "fresh").unwrap();
        driver.run_pending();

        assert_eq!(socket.try_recv().unwrap().body().as_ref(), b"fresh");
        assert!(socket.try_recv().is_none());
    }

    #[test]
    fn test_detach_moves_request_to_other_endpoint() {
        let (socket, mut driver, clock, timer) = req_socket();
        let a = socket.pipe().unwrap();
        socket.send("M").unwrap();
        driver.run_pending();
        a.try_recv().unwrap();

        // Resend once so the request is pinned to `a`.
        clock.advance(IVL);
        timer.fire();
        driver.run_pending();
        let pinned = a.try_recv().unwrap();

        let b = socket.pipe().unwrap();
        a.disconnect().unwrap();
        driver.run_pending();

        assert_eq!(b.try_recv().unwrap(), pinned);
    }

    #[test]
    fn test_dropped_peer_detaches() {
        let (socket, mut driver, _, _) = req_socket();
        let monitor = socket.monitor();
        let a = socket.pipe().unwrap();
        let b = socket.pipe().unwrap();
        let a_id = a.endpoint_id();
        drop(a);

        socket.send("M").unwrap();
        driver.run_pending();
        assert_eq!(b.try_recv().unwrap().body().as_ref(), b"M");

        for body in ["N0", "N1", "N2"] {
            socket.send(body).unwrap();
            driver.run_pending();
            assert_eq!(b.try_recv().unwrap().body().as_ref(), body.as_bytes());
        }
        assert!(monitor.try_iter().any(|e| e == SocketEvent::EndpointDetached(a_id)));
    }

    #[test]
    fn test_dead_raw_endpoint_removed_on_send() {
        let (socket, mut driver, _, _) = req_socket();
        let monitor = socket.monitor();
        let (ep, remote) = pipe::pair(ProtocolId::Rep.number(), 4);
        let dead = socket.attach(Arc::new(ep)).unwrap();
        let live = socket.pipe().unwrap();
        drop(remote);

        socket.send("M").unwrap();
        driver.run_pending();

        assert_eq!(live.try_recv().unwrap().body().as_ref(), b"M");
        let events: Vec<_> = monitor.try_iter().collect();
        assert!(events.contains(&SocketEvent::EndpointDetached(dead)));

        socket.send("N").unwrap();
        driver.run_pending();
        assert_eq!(live.try_recv().unwrap().body().as_ref(), b"N");
    }

    #[test]
    fn test_incompatible_peer_rejected() {
        let (socket, mut driver, _, _) = req_socket();
        let monitor = socket.monitor();
        let (ep, _remote) = pipe::pair(ProtocolId::Req.number(), 4);

        let err = socket.attach(Arc::new(ep)).unwrap_err();
        assert!(matches!(err, SpError::IncompatiblePeer { ours: "req", peer: 48 }));

        driver.run_pending();
        assert!(monitor.try_recv().is_err());
    }

    #[test]
    fn test_monitor_sees_lifecycle() {
        let (socket, mut driver, _, _) = req_socket();
        let monitor = socket.monitor();
        let peer = socket.pipe().unwrap();
        let id = peer.endpoint_id();
        peer.disconnect().unwrap();
        socket.close().unwrap();
        driver.run_pending();

        let events: Vec<_> = monitor.try_iter().collect();
        assert_eq!(
            events,
            vec![
                SocketEvent::EndpointAttached(id),
                SocketEvent::EndpointDetached(id),
                SocketEvent::Closed,
            ]
        );
    }

    #[test]
    fn test_close_cancels_timer_and_ends_recv() {
        let (socket, mut driver, _, timer) = req_socket();
        let _peer = socket.pipe().unwrap();
        socket.send("M").unwrap();
        driver.run_pending();
        assert_eq!(timer.live(), 1);

        socket.close().unwrap();
        driver.run_pending();

        assert!(driver.is_closed());
        assert_eq!(timer.live(), 0);
        assert!(matches!(socket.recv_blocking(), Err(SpError::SocketClosed)));
    }

    #[test]
    fn test_dropping_last_handle_closes() {
        let (socket, mut driver, _, _) = req_socket();
        let clone = socket.clone();
        drop(socket);
        driver.run_pending();
        assert!(!driver.is_closed());

        drop(clone);
        driver.run_pending();
        assert!(driver.is_closed());
    }

    #[test]
    fn test_send_queue_drops_oldest_past_hwm() {
        let factory = XReqFactory;
        let (socket, mut driver) =
            Socket::with_factory(&factory, SocketOptions::new().with_send_hwm(2));

        for body in ["a", "b", "c"] {
            socket.send(body).unwrap();
        }
        driver.run_pending();

        let peer = socket.pipe().unwrap();
        driver.run_pending();
        assert_eq!(peer.try_recv().unwrap().body().as_ref(), b"b");
        assert_eq!(peer.try_recv().unwrap().body().as_ref(), b"c");
        assert!(peer.try_recv().is_none());
    }

    #[test]
    fn test_recv_timeout_nonblocking() {
        let (socket, _driver) = Socket::with_factory(
            &XReqFactory,
            SocketOptions::new().with_recv_timeout(Duration::ZERO),
        );
        assert!(matches!(socket.recv_blocking(), Err(SpError::Timeout(_))));
    }

    #[compio::test]
    async fn test_async_driver_roundtrip() {
        let (socket, driver) = Socket::new(SocketOptions::new());
        let peer = socket.pipe().unwrap();
        compio::runtime::spawn(driver.run()).detach();

        socket.send("hello").unwrap();
        let request = peer.recv().await.unwrap();
        peer.reply(&request, "world").unwrap();

        let reply = socket.recv().await.unwrap();
        assert_eq!(reply.body().as_ref(), b"world");
    }
}
