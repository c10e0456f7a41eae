//! Shared logging shim for the integration suites.
//!
//! Mirrors the in-crate test helpers: install a tracing subscriber once,
//! mark phases, and assert through a logging macro so a failing run
//! explains itself. Kept as a `tests/` module because integration tests
//! link the library without its `#[cfg(test)]` items.

use std::sync::Once;

pub fn init_test_logging() {
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

macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(target: "pledge::test", "=== phase: {} ===", $name);
    };
}

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

macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(target: "pledge::test", "=== complete: {} ===", $name);
    };
}
