//! Process-wide tracing setup shared by the binary and tests.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::LogFormat;

/// Initialize JSON logging.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::Json);
}

/// Initialize logging with an explicit output format.
pub fn init_with(format: LogFormat) {
    tracing::init(format);
}
