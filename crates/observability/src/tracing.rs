//! Subscriber installation.

use tracing_subscriber::fmt::time::SystemTime;
use tracing_subscriber::EnvFilter;

/// Install the process-wide subscriber with `info` as the fallback level.
pub fn init() {
    init_with_default("info");
}

/// Install the process-wide subscriber.
///
/// `RUST_LOG` wins when set; `fallback` is the directive used otherwise.
/// JSON lines, no target field. Safe to call more than once; only the first
/// call installs anything.
pub fn init_with_default(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(SystemTime)
        .with_target(false)
        .json()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init();
        init_with_default("debug");
        init();
    }
}
