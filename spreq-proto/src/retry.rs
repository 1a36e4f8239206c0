//! Retry scheduling for the pending request.
//!
//! The scheduler owns at most one armed timer. Expiry only asks the socket for
//! another processing cycle; whether a resend is actually due is decided by
//! the processing path under the protocol lock, by comparing the clock with
//! the deadline returned from [`RetryScheduler::reschedule`].
//!
//! The interval is fixed: no backoff growth and no attempt ceiling. It is never
//! shorter than [`MIN_RESEND_IVL`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use spreq_core::options::MIN_RESEND_IVL;
use spreq_core::timer::{Clock, Timer, TimerHandle};
use tracing::trace;

use crate::protocol::ProtocolSocket;

/// Single-shot retry timer plus the clock used to judge deadlines.
pub struct RetryScheduler {
    interval: Duration,
    clock: Arc<dyn Clock>,
    timer: Arc<dyn Timer>,
    sock: Arc<dyn ProtocolSocket>,
    handle: Option<TimerHandle>,
}

impl RetryScheduler {
    pub fn new(
        interval: Duration,
        clock: Arc<dyn Clock>,
        timer: Arc<dyn Timer>,
        sock: Arc<dyn ProtocolSocket>,
    ) -> Self {
        Self {
            interval: interval.max(MIN_RESEND_IVL),
            clock,
            timer,
            sock,
            handle: None,
        }
    }

    /// Stop and release the armed timer, if any.
    pub fn cancel(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.cancel();
        }
    }

    /// Re-arm for a full interval and return the new retry deadline.
    pub fn reschedule(&mut self) -> Instant {
        self.cancel();

        let deadline = self.clock.now() + self.interval;
        let sock = Arc::clone(&self.sock);
        self.handle = Some(self.timer.after(
            self.interval,
            Box::new(move || sock.wake_up()),
        ));

        trace!(interval = ?self.interval, "[REQ] Retry rescheduled");
        deadline
    }

    /// Current instant according to the scheduler's clock.
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// True once `deadline` is not in the future.
    pub fn is_due(&self, deadline: Instant) -> bool {
        self.clock.now() >= deadline
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestSocket;
    use spreq_core::timer::{ManualClock, ManualTimer};

    fn scheduler(interval: Duration) -> (RetryScheduler, ManualClock, ManualTimer, Arc<TestSocket>) {
        let clock = ManualClock::new();
        let timer = ManualTimer::new();
        let sock = Arc::new(TestSocket::default());
        let sched = RetryScheduler::new(
            interval,
            Arc::new(clock.clone()),
            Arc::new(timer.clone()),
            Arc::clone(&sock) as Arc<dyn ProtocolSocket>,
        );
        (sched, clock, timer, sock)
    }

    #[test]
    fn test_reschedule_sets_deadline_and_arms() {
        let (mut sched, clock, timer, _) = scheduler(Duration::from_secs(60));
        let start = clock.now();

        let deadline = sched.reschedule();
        assert_eq!(deadline, start + Duration::from_secs(60));
        assert!(sched.is_armed());
        assert_eq!(timer.live(), 1);
        assert_eq!(timer.last_delay(), Some(Duration::from_secs(60)));
        assert!(!sched.is_due(deadline));

        clock.advance(Duration::from_secs(60));
        assert!(sched.is_due(deadline));
    }

    #[test]
    fn test_reschedule_replaces_previous_timer() {
        let (mut sched, _, timer, _) = scheduler(Duration::from_secs(1));
        sched.reschedule();
        sched.reschedule();

        assert_eq!(timer.armed_total(), 2);
        assert_eq!(timer.live(), 1);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let (mut sched, _, timer, _) = scheduler(Duration::from_secs(1));
        sched.cancel();
        sched.reschedule();
        sched.cancel();
        sched.cancel();

        assert!(!sched.is_armed());
        assert_eq!(timer.live(), 0);
    }

    #[test]
    fn test_expiry_only_wakes_socket() {
        let (mut sched, _, timer, sock) = scheduler(Duration::from_secs(1));
        sched.reschedule();

        assert_eq!(timer.fire(), 1);
        assert_eq!(sock.wakes(), 1);
        // The scheduler still believes it owns a handle; firing mutates nothing.
        assert!(sched.is_armed());
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let (mut sched, clock, timer, _) = scheduler(Duration::ZERO);
        let start = clock.now();

        assert_eq!(sched.interval(), MIN_RESEND_IVL);
        let deadline = sched.reschedule();
        assert_eq!(deadline, start + MIN_RESEND_IVL);
        assert_eq!(timer.last_delay(), Some(MIN_RESEND_IVL));
        assert!(!sched.is_due(deadline));
    }
}
