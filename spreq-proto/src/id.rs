//! Correlation id generation.
//!
//! Ids are a wrapping 32-bit counter with the high bit forced on. The high bit
//! is the backtrace sentinel: intermediate peers stop unwinding the routing
//! trail at the first word that has it set, so it must never be cleared.

use rand::RngCore;

/// Bit that marks the end of a backtrace.
pub const BACKTRACE_BIT: u32 = 0x8000_0000;

/// Allocates correlation ids for one socket.
///
/// Uniqueness is only guaranteed within one pass of the counter; after
/// 2^32 allocations ids repeat. With a single outstanding request that is
/// only observable if a very stale reply arrives.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: u32,
}

impl IdGenerator {
    /// Start counting at `seed`.
    pub const fn new(seed: u32) -> Self {
        Self { next: seed }
    }

    /// Seed from a caller-provided entropy source.
    pub fn from_rng<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        Self::new(rng.next_u32())
    }

    /// Seed from the thread-local entropy source.
    pub fn from_entropy() -> Self {
        Self::from_rng(&mut rand::thread_rng())
    }

    /// Return the next id and advance the counter.
    pub fn next_id(&mut self) -> u32 {
        let id = self.next | BACKTRACE_BIT;
        self.next = self.next.wrapping_add(1);
        id
    }
}
