//! Structured logging configuration.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingSection;

/// Initialize the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` when set, falling back to the
/// configured level. Calling this more than once is harmless: later calls
/// leave the installed subscriber in place.
pub fn init(config: &LoggingSection) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if installed.is_err() {
        tracing::debug!("Global subscriber already installed");
    }
}

/// Initialize logging with default settings
pub fn init_default() {
    init(&LoggingSection::default());
}
