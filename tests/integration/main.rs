//! Integration tests across all layers
//!
//! Tests that drive a populated store through the scene serializer and back.

mod diagnostics;

use tracing_subscriber::EnvFilter;

/// Routes store logs to the test harness. Set `RUST_LOG=scenery_storage=trace`
/// to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
