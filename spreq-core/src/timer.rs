//! Clocks and single-shot timers.
//!
//! Protocols never read ambient time or spawn timers directly; they receive a
//! [`Clock`] and a [`Timer`] at construction. [`ThreadTimer`] serves code that
//! runs without an async runtime; tests use [`ManualClock`] + [`ManualTimer`].
//!
//! A timer callback runs on the timer's own thread of execution. Callbacks are
//! expected to do nothing but signal (e.g. enqueue a wake-up); they must not
//! touch state guarded by the caller's locks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{trace, warn};

/// Callback run when a timer expires.
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

/// Arms single-shot timers.
pub trait Timer: Send + Sync {
    /// Run `callback` once after `delay`, unless the returned handle is
    /// cancelled or dropped first.
    fn after(&self, delay: Duration, callback: Callback) -> TimerHandle;
}

/// Ownership of one armed timer.
///
/// Dropping the handle cancels the timer. Cancelling twice is a no-op.
#[must_use = "dropping a TimerHandle cancels the timer"]
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl TimerHandle {
    /// Wrap the action that disarms a timer.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Disarm the timer.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// True until `cancel()` has been called.
    pub fn is_armed(&self) -> bool {
        self.cancel.is_some()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHandle")
            .field("armed", &self.is_armed())
            .finish()
    }
}

/// One thread per armed timer, parked on a channel with a deadline.
///
/// Cancelling drops the channel's sender, which wakes the thread with a
/// disconnect instead of a timeout, so the callback never runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadTimer;

impl Timer for ThreadTimer {
    fn after(&self, delay: Duration, callback: Callback) -> TimerHandle {
        let (cancel_tx, cancel_rx) = flume::bounded::<()>(1);

        let spawned = thread::Builder::new()
            .name("spreq-timer".into())
            .spawn(move || {
                if let Err(flume::RecvTimeoutError::Timeout) = cancel_rx.recv_timeout(delay) {
                    trace!(?delay, "[TIMER] Expired");
                    callback();
                }
            });

        if let Err(e) = spawned {
            warn!(error = %e, "[TIMER] Failed to spawn timer thread");
        }

        TimerHandle::new(move || drop(cancel_tx))
    }
}

struct ManualEntry {
    delay: Duration,
    callback: Option<Callback>,
    cancelled: Arc<AtomicBool>,
}

impl ManualEntry {
    fn is_live(&self) -> bool {
        self.callback.is_some() && !self.cancelled.load(Ordering::SeqCst)
    }
}

/// Timer that never fires on its own.
///
/// Tests inspect what was armed and fire live timers explicitly. Clones share
/// the same set of timers.
#[derive(Clone, Default)]
pub struct ManualTimer {
    entries: Arc<Mutex<Vec<ManualEntry>>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of timers ever armed.
    pub fn armed_total(&self) -> usize {
        self.entries.lock().len()
    }

    /// Timers that are armed, not cancelled and not yet fired.
    pub fn live(&self) -> usize {
        self.entries.lock().iter().filter(|e| e.is_live()).count()
    }

    /// Delay of the most recently armed timer.
    pub fn last_delay(&self) -> Option<Duration> {
        self.entries.lock().last().map(|e| e.delay)
    }

    /// Run every live timer's callback; returns how many fired.
    pub fn fire(&self) -> usize {
        let callbacks: Vec<Callback> = {
            let mut entries = self.entries.lock();
            entries
                .iter_mut()
                .filter(|e| !e.cancelled.load(Ordering::SeqCst))
                .filter_map(|e| e.callback.take())
                .collect()
        };

        // Run outside the lock: callbacks may arm new timers.
        let fired = callbacks.len();
        for callback in callbacks {
            callback();
        }
        fired
    }
}

impl Timer for ManualTimer {
    fn after(&self, delay: Duration, callback: Callback) -> TimerHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.entries.lock().push(ManualEntry {
            delay,
            callback: Some(callback),
            cancelled: Arc::clone(&cancelled),
        });
        TimerHandle::new(move || cancelled.store(true, Ordering::SeqCst))
    }
}
