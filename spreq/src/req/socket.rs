//! REQ socket implementation.

use std::io;
use std::sync::Arc;

use bytes::Bytes;
use spreq_core::endpoint::{Endpoint, EndpointId};
use spreq_core::monitor::SocketMonitor;
use spreq_core::options::SocketOptions;
use spreq_proto::{PipePeer, ReqFactory, Socket, SocketDriver};

/// A REQ socket for request-reply with automatic resend.
///
/// Only one request is outstanding at a time. Sending again abandons the
/// previous request, and a late reply to it is discarded. Until a reply
/// arrives the request is resent every [`SocketOptions::resend_ivl`], and
/// immediately when the connection that carried it goes away.
///
/// ## Example
///
/// ```rust,no_run
/// use spreq::req::ReqSocket;
///
/// # async fn example() -> std::io::Result<()> {
/// let socket = ReqSocket::new()?;
/// let replier = socket.pipe()?;
///
/// socket.send("REQUEST")?;
/// let request = replier.recv().await?;
/// replier.reply(&request, "REPLY")?;
///
/// let reply = socket.recv().await?;
/// println!("Got reply: {:?}", reply);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ReqSocket {
    inner: Socket,
}

impl ReqSocket {
    /// Create a REQ socket with default options and a background driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver thread cannot be spawned.
    pub fn new() -> io::Result<Self> {
        Self::with_options(SocketOptions::default())
    }

    /// Create a REQ socket with custom options and a background driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver thread cannot be spawned.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use spreq::req::ReqSocket;
    /// use spreq::SocketOptions;
    /// use std::time::Duration;
    ///
    /// # fn example() -> std::io::Result<()> {
    /// let socket = ReqSocket::with_options(
    ///     SocketOptions::new()
    ///         .with_resend_ivl(Duration::from_secs(5))
    ///         .with_recv_timeout(Duration::from_secs(30)),
    /// )?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_options(options: SocketOptions) -> io::Result<Self> {
        let inner = Socket::spawn(&ReqFactory::default(), options)?;
        Ok(Self { inner })
    }

    /// Create a REQ socket whose driver the caller runs.
    ///
    /// Run the returned driver with `run().await` on an async runtime, or step
    /// it with `run_pending()`.
    pub fn with_driver(options: SocketOptions) -> (Self, SocketDriver) {
        Self::with_factory(&ReqFactory::default(), options)
    }

    /// Like [`ReqSocket::with_driver`], with a custom clock, timer or id seed.
    pub fn with_factory(factory: &ReqFactory, options: SocketOptions) -> (Self, SocketDriver) {
        let (inner, driver) = Socket::with_factory(factory, options);
        (Self { inner }, driver)
    }

    /// Send a request, superseding any request still awaiting a reply.
    ///
    /// # Errors
    ///
    /// Returns `BrokenPipe` if the socket is closed.
    pub fn send(&self, body: impl Into<Bytes>) -> io::Result<()> {
        Ok(self.inner.send(body)?)
    }

    /// Receive the reply to the current request.
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` when the receive timeout elapses and `BrokenPipe`
    /// once the socket is closed.
    pub async fn recv(&self) -> io::Result<Bytes> {
        Ok(self.inner.recv().await?.into_body())
    }

    /// Blocking variant of [`ReqSocket::recv`].
    ///
    /// # Errors
    ///
    /// Same as [`ReqSocket::recv`].
    pub fn recv_blocking(&self) -> io::Result<Bytes> {
        Ok(self.inner.recv_blocking()?.into_body())
    }

    /// Reply already waiting, if any.
    pub fn try_recv(&self) -> Option<Bytes> {
        self.inner.try_recv().map(spreq_core::message::Message::into_body)
    }

    /// Connect an endpoint.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionRefused` if the endpoint's peer does not speak REP.
    pub fn attach(&self, endpoint: Arc<dyn Endpoint>) -> io::Result<EndpointId> {
        Ok(self.inner.attach(endpoint)?)
    }

    /// Disconnect an endpoint.
    ///
    /// # Errors
    ///
    /// Returns `BrokenPipe` if the socket is closed.
    pub fn detach(&self, id: EndpointId) -> io::Result<()> {
        Ok(self.inner.detach(id)?)
    }

    /// Connect an in-process replier and return its end of the pipe.
    ///
    /// # Errors
    ///
    /// Returns `BrokenPipe` if the socket is closed.
    pub fn pipe(&self) -> io::Result<PipePeer> {
        Ok(self.inner.pipe()?)
    }

    /// Subscribe to endpoint and shutdown events.
    pub fn monitor(&self) -> SocketMonitor {
        self.inner.monitor()
    }

    /// Socket options in effect.
    pub fn options(&self) -> &SocketOptions {
        self.inner.options()
    }

    /// Close the socket; pending receives fail with `BrokenPipe`.
    ///
    /// # Errors
    ///
    /// Returns `BrokenPipe` if the socket is already closed.
    pub fn close(&self) -> io::Result<()> {
        Ok(self.inner.close()?)
    }
}
