//! # spreq proto
//!
//! Requester side of the scalability-protocol request/reply pattern.
//!
//! ## Overview
//!
//! - **`XReq`** ([`base`]): raw requester engine that pumps queued messages to
//!   endpoints round-robin and accepted replies to the application
//! - **`Req`** ([`req`]): cooked protocol layered on `XReq` that tags each
//!   request with a correlation id, drops replies that do not match it, and
//!   resends the request on a timer or when its endpoint disappears
//! - **`Socket`** ([`socket`]): command-driven socket that runs a protocol
//! - **`CompioTimer`** ([`timer`]): resend timer on the compio runtime
//!
//! ## Quick Start
//!
//! ```rust
//! use spreq_core::options::SocketOptions;
//! use spreq_proto::Socket;
//!
//! let (socket, mut driver) = Socket::new(SocketOptions::new());
//! let replier = socket.pipe().unwrap();
//!
//! socket.send("Hello").unwrap();
//! driver.run_pending();
//!
//! let request = replier.try_recv().unwrap();
//! replier.reply(&request, "World").unwrap();
//! driver.run_pending();
//!
//! assert_eq!(socket.try_recv().unwrap().body().as_ref(), b"World");
//! ```

// Allow some pedantic lints
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::new_without_default)]

pub mod base;
pub mod id;
pub mod protocol;
pub mod req;
pub mod retry;
pub mod socket;
pub mod timer;

#[cfg(test)]
mod testing;

pub use base::{BaseEngine, XReq, XReqFactory};
pub use id::IdGenerator;
pub use protocol::{Protocol, ProtocolFactory, ProtocolSocket};
pub use req::{Req, ReqFactory, ReqParts};
pub use retry::RetryScheduler;
pub use socket::{PipePeer, Socket, SocketCmd, SocketDriver};
pub use timer::CompioTimer;
