//! Development helper: initialize a tracing subscriber when `RUST_LOG` is set.
//!
//! Tests and demos call `spreq::dev_tracing::init_tracing()` to see the
//! `[REQ]` / `[SOCKET]` events. This is a no-op when `RUST_LOG` is not set or
//! when a global subscriber is already installed.

/// Install a `fmt` subscriber filtered by `RUST_LOG`, if set.
pub fn init_tracing() {
    use std::env;

    if env::var("RUST_LOG").is_ok() {
        // Best-effort: another test may have installed one already.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}
