//! # spreq
//!
//! Requester side of the scalability-protocol request/reply pattern.
//!
//! ## Architecture
//!
//! - **`spreq-core`**: messages, endpoints, registry, timers, options, errors
//! - **`spreq-proto`**: the REQ state machine and the socket driver
//! - **`spreq`**: public API surface (this crate)
//!
//! A REQ socket tags every request with a correlation id, delivers only the
//! reply that carries it, and resends the request when no reply arrives within
//! the resend interval or when the connection carrying it goes away.
//!
//! ## Protocols (opt-in via features)
//!
//! - **`req`** - REQ socket (enabled by default)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # #[cfg(feature = "req")]
//! use spreq::req::prelude::*;
//!
//! # #[cfg(feature = "req")]
//! # async fn example() -> std::io::Result<()> {
//! let socket = ReqSocket::new()?;
//! let replier = socket.pipe()?;
//!
//! socket.send("Hello")?;
//! let request = replier.recv().await?;
//! replier.reply(&request, "World")?;
//!
//! let reply = socket.recv().await?;
//! assert_eq!(reply, Bytes::from("World"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export core types
pub use bytes::Bytes;
pub use spreq_core::error::SpError;
pub use spreq_core::options::SocketOptions;

pub mod dev_tracing;

// Protocol modules (opt-in via features)
#[cfg(feature = "req")]
pub mod req;
