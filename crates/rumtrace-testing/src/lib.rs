//! Testing infrastructure for rumtrace lifecycle tests.
//!
//! - `TestApp`: sequential driver with a fake clock and an in-memory sink
//! - `assertions`: duration tolerance, non-overlap and session count helpers

pub mod app;
pub mod assertions;

pub use app::TestApp;
pub use assertions::{SessionsExt, assert_duration, assert_non_overlapping};

/// Install a test-friendly tracing subscriber once per process.
///
/// Honors `RUST_LOG`; silent by default.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
