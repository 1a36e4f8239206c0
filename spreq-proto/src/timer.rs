//! Retry timers on the compio runtime.
//!
//! [`CompioTimer`] spawns a task that sleeps with `compio::time::sleep` and
//! then runs the callback, unless its handle was cancelled first. Arming a
//! timer on a thread that is not running a compio runtime falls back to
//! [`ThreadTimer`], so drivers stepped by hand keep working.

use std::time::Duration;

use compio::runtime::Runtime;
use futures::FutureExt;
use spreq_core::timer::{Callback, ThreadTimer, Timer, TimerHandle};
use tracing::trace;

/// Timer backed by the current thread's compio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompioTimer;

impl Timer for CompioTimer {
    fn after(&self, delay: Duration, callback: Callback) -> TimerHandle {
        let Some(runtime) = Runtime::try_current() else {
            trace!(?delay, "[TIMER] No compio runtime, using a timer thread");
            return ThreadTimer.after(delay, callback);
        };

        let (cancel_tx, cancel_rx) = flume::bounded::<()>(1);
        runtime
            .spawn(async move {
                let sleep = compio::time::sleep(delay).fuse();
                let cancelled = cancel_rx.recv_async().fuse();
                futures::pin_mut!(sleep, cancelled);

                futures::select! {
                    () = sleep => {
                        trace!(?delay, "[TIMER] Expired");
                        callback();
                    }
                    _ = cancelled => {}
                }
            })
            .detach();

        TimerHandle::new(move || drop(cancel_tx))
    }
}
