/// Logger configuration
///
/// The embedding application decides what to show; scanbot itself never
/// parses command-line flags. Configuration is process-wide and cheap to
/// read on every log call.

use super::levels::LogLevel;
use super::tags::LogTag;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Minimum level that gets printed (errors always pass)
    pub min_level: LogLevel,
    /// Tags with Debug-level logging enabled (keys from `LogTag::to_debug_key`)
    pub debug_tags: HashSet<String>,
    /// Tags with Verbose-level logging enabled
    pub verbose_tags: HashSet<String>,
    /// If non-empty, only these tags are printed at all (errors still pass)
    pub enabled_tags: HashSet<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            verbose_tags: HashSet::new(),
            enabled_tags: HashSet::new(),
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG.read().clone()
}

pub fn set_logger_config(config: LoggerConfig) {
    *LOGGER_CONFIG.write() = config;
}

/// Mutate the active config in place
pub fn update_logger_config<F: FnOnce(&mut LoggerConfig)>(f: F) {
    let mut config = LOGGER_CONFIG.write();
    f(&mut config);
}

pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    LOGGER_CONFIG.read().debug_tags.contains(&tag.to_debug_key())
}

pub fn is_verbose_enabled_for_tag(tag: &LogTag) -> bool {
    LOGGER_CONFIG.read().verbose_tags.contains(&tag.to_debug_key())
}
