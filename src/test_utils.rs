//! Shared helpers for the unit-test suites.
//!
//! Every test starts with [`init_test_logging`] + [`test_phase!`](crate::test_phase)
//! so failures come with a readable, filterable event stream
//! (`RUST_LOG=trace cargo test -- --nocapture` shows the full promise
//! lifecycle). Assertions go through
//! [`assert_with_log!`](crate::assert_with_log), which logs the expected
//! and actual values before panicking.
//!
//! Integration tests under `tests/` carry their own copy of these
//! helpers in `tests/common.rs`; this module only serves the in-crate
//! `#[cfg(test)]` suites.

use std::sync::Once;

/// Installs the test tracing subscriber once per process.
///
/// Respects `RUST_LOG`; defaults to `info` so test output stays quiet
/// unless a failure needs investigating.
pub(crate) fn init_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Marks the start of a test phase in the event stream.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(target: "pledge::test", "=== phase: {} ===", $name);
    };
}

/// Asserts a condition, logging the expected and actual values either
/// way so failures are diagnosable from the event stream alone.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $what:expr, $expected:expr, $actual:expr) => {{
        let passed = $cond;
        let expected = &$expected;
        let actual = &$actual;
        if passed {
            tracing::debug!(
                target: "pledge::test",
                "ok: {} (actual {:?})",
                $what,
                actual
            );
        } else {
            tracing::error!(
                target: "pledge::test",
                "FAILED: {} (expected {:?}, actual {:?})",
                $what,
                expected,
                actual
            );
            panic!(
                "assertion failed: {} (expected {:?}, actual {:?})",
                $what, expected, actual
            );
        }
    }};
}

/// Marks the end of a successful test in the event stream.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(target: "pledge::test", "=== complete: {} ===", $name);
    };
}
