mod structs;

pub use structs::*;

use std::sync::OnceLock;

static CONFIG: OnceLock<StaticConfig> = OnceLock::new();

/// Load the static configuration exactly once.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init_config() -> &'static StaticConfig {
    CONFIG.get_or_init(StaticConfig::load)
}

/// Get the loaded configuration.
///
/// Falls back to loading on first access so tests don't need an explicit
/// init call.
pub fn get_config() -> &'static StaticConfig {
    CONFIG.get_or_init(StaticConfig::load)
}
