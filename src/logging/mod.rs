//! env_logger setup driven by [`LogSettings`].

use std::env;

use crate::config::LogSettings;

/// Installs the global logger. `RUST_LOG`, when set, wins over the configured
/// level. Returns false when a logger was already installed.
pub fn init_logging(settings: &LogSettings) -> bool {
    let filters = env::var("RUST_LOG").unwrap_or_else(|_| settings.level.to_ascii_lowercase());
    env_logger::Builder::new()
        .parse_filters(&filters)
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}
