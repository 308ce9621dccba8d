//! Shared fixtures for logpanes integration tests.

pub mod builders;
pub mod fake_backend;
pub mod recording_surface;

use tracing_subscriber::{fmt, EnvFilter};

/// Install a test-captured tracing subscriber once per test binary.
///
/// Filter comes from `LOGPANES_LOG` (same directive syntax as `RUST_LOG`),
/// defaulting to `logpanes=debug` so coordinator decisions show up in the
/// output of a failing test.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOGPANES_LOG")
        .unwrap_or_else(|_| EnvFilter::new("logpanes=debug"));

    // A second call in the same binary finds a subscriber already set.
    let _ = fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .with_target(false)
        .try_init();
}
