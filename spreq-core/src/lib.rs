//! spreq Core
//!
//! This crate contains the protocol-agnostic building blocks:
//! - SP message with a protocol header (`message`)
//! - Protocol identity (`protocol`)
//! - Endpoint abstraction + in-process pipe (`endpoint`, `pipe`)
//! - Round-robin endpoint registry (`registry`)
//! - Clocks and single-shot timers (`timer`)
//! - Socket options and monitoring (`options`, `monitor`)
//! - Error types (`error`)

#![deny(unsafe_code)]
// Allow some pedantic lints that are intentional in this crate
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::new_without_default)]
pub mod endpoint;
pub mod error;
pub mod message;
pub mod monitor;
pub mod options;
pub mod pipe;
pub mod protocol;
pub mod registry;
pub mod timer;

// Optional: a small prelude to make downstream crates ergonomic.
// Keep it minimal to avoid API lock-in.
pub mod prelude {
    pub use crate::endpoint::{Endpoint, EndpointId};
    pub use crate::error::{Result, SpError};
    pub use crate::message::Message;
    pub use crate::monitor::{SocketEvent, SocketMonitor};
    pub use crate::options::SocketOptions;
    pub use crate::pipe::{PipeEndpoint, PipeRemote};
    pub use crate::protocol::{ProtocolId, ProtocolInfo};
    pub use crate::registry::EndpointRegistry;
    pub use crate::timer::{Clock, ManualClock, ManualTimer, SystemClock, ThreadTimer, Timer, TimerHandle};
}
