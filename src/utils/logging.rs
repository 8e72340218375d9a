//! Log setup for the relay binary and tests.

use tracing::Level;

/// Initialize the global tracing subscriber.
///
/// `default_level` is used unless it does not name a known level, in which
/// case logging falls back to `info`.
pub fn init(default_level: &str) {
    let level = match default_level.to_ascii_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" | "warning" => Level::WARN,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    // try_init so repeated calls (tests, embedding) are harmless.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}
