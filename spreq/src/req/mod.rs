//! REQ socket.
//!
//! # Socket Types
//!
//! - [`ReqSocket`] - requester with correlated replies and automatic resend
//!
//! # Quick Start
//!
//! ```rust
//! use spreq::req::ReqSocket;
//! use spreq::SocketOptions;
//!
//! let (socket, mut driver) = ReqSocket::with_driver(SocketOptions::new());
//! let replier = socket.pipe().unwrap();
//!
//! socket.send("REQUEST").unwrap();
//! driver.run_pending();
//!
//! let request = replier.try_recv().unwrap();
//! replier.reply(&request, "REPLY").unwrap();
//! driver.run_pending();
//!
//! assert_eq!(socket.try_recv().unwrap(), "REPLY");
//! ```

mod socket;

pub use socket::ReqSocket;

pub use spreq_core::endpoint::{Endpoint, EndpointId};
pub use spreq_core::message::Message;
pub use spreq_core::monitor::{SocketEvent, SocketMonitor};
pub use spreq_proto::{PipePeer, ReqFactory, SocketDriver};

/// Convenient imports for the REQ socket.
///
/// # Example
///
/// ```rust
/// use spreq::req::prelude::*;
///
/// // Now you have:
/// // - ReqSocket, SocketOptions, SocketEvent
/// // - Bytes for zero-copy messages
/// ```
pub mod prelude {
    pub use super::{PipePeer, ReqSocket, SocketEvent, SocketMonitor};
    pub use crate::SocketOptions;
    pub use bytes::Bytes;
}
