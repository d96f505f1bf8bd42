//! Shared test setup. Not compiled as its own test binary (Cargo excludes
//! any `tests/<dir>/mod.rs`), so integration test files pull it in via
//! `mod common;`.

/// Installs a `tracing` subscriber that writes to the test harness's
/// captured output, so `--nocapture` shows log lines from the code under
/// test. Safe to call from every test; only the first call in the
/// process wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
