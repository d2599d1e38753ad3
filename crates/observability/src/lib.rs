//! Tracing/logging setup shared by whatever process embeds the core.

/// Initialize process-wide tracing/logging.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Like [`init`], with an explicit fallback filter directive for when
/// `RUST_LOG` is unset.
pub fn init_with_default(fallback: &str) {
    tracing::init_with_default(fallback);
}

/// Tracing configuration (filters, layers).
pub mod tracing;
