//! Socket configuration options
//!
//! Options are plain data passed by value at socket construction, built with
//! `with_*` methods in the style of `nn_setsockopt`.

use std::time::Duration;

/// Default interval after which an unanswered request is resent.
pub const DEFAULT_RESEND_IVL: Duration = Duration::from_secs(60);

/// Smallest accepted resend interval.
pub const MIN_RESEND_IVL: Duration = Duration::from_millis(1);

/// Socket configuration options.
///
/// # Examples
///
/// ```
/// use spreq_core::options::SocketOptions;
/// use std::time::Duration;
///
/// let opts = SocketOptions::default()
///     .with_resend_ivl(Duration::from_secs(5))
///     .with_recv_timeout(Duration::from_secs(1));
/// assert_eq!(opts.resend_ivl, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct SocketOptions {
    /// Request resend interval (NN_REQ_RESEND_IVL)
    ///
    /// A request with no matching reply is sent again after this long.
    /// - Default: 60 seconds
    /// - Fixed: no backoff growth, no retry ceiling
    pub resend_ivl: Duration,

    /// Receive timeout (NN_RCVTIMEO)
    ///
    /// - `None`: Block until a reply arrives (default)
    /// - `Some(duration)`: Give up after duration
    pub recv_timeout: Option<Duration>,

    /// High water mark for sending (NN_SNDBUF, in messages)
    ///
    /// Bound on messages queued in the base engine waiting for an endpoint.
    /// - Default: 1000 messages
    pub send_hwm: usize,

    /// High water mark for receiving (NN_RCVBUF, in messages)
    ///
    /// Bound on accepted replies waiting for the application.
    /// - Default: 1000 messages
    pub recv_hwm: usize,

    /// Capacity of in-process pipes created by the socket.
    ///
    /// - Default: 16 messages
    pub pipe_capacity: usize,
}

impl Default for SocketOptions {
    fn default() -> Self {
        Self {
            resend_ivl: DEFAULT_RESEND_IVL,
            recv_timeout: None, // Block indefinitely
            send_hwm: 1000,
            recv_hwm: 1000,
            pipe_capacity: 16,
        }
    }
}

impl SocketOptions {
    /// Create new socket options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set request resend interval.
    ///
    /// Raised to [`MIN_RESEND_IVL`] if shorter.
    pub fn with_resend_ivl(mut self, ivl: Duration) -> Self {
        self.resend_ivl = ivl.max(MIN_RESEND_IVL);
        self
    }

    /// Set receive timeout.
    pub fn with_recv_timeout(mut self, timeout: Duration) -> Self {
        self.recv_timeout = Some(timeout);
        self
    }

    /// Set send high water mark.
    pub fn with_send_hwm(mut self, hwm: usize) -> Self {
        self.send_hwm = hwm;
        self
    }

    /// Set receive high water mark.
    pub fn with_recv_hwm(mut self, hwm: usize) -> Self {
        self.recv_hwm = hwm;
        self
    }

    /// Set in-process pipe capacity.
    pub fn with_pipe_capacity(mut self, capacity: usize) -> Self {
        self.pipe_capacity = capacity;
        self
    }

    /// Check if receive is non-blocking (zero timeout).
    #[inline]
    pub fn is_recv_nonblocking(&self) -> bool {
        self.recv_timeout == Some(Duration::ZERO)
    }
}
