/// Core logging implementation with automatic filtering
///
/// Filtering rules:
/// 1. Errors are always shown
/// 2. Debug level requires a Debug min_level OR the tag in `debug_tags`
/// 3. Verbose level requires a Verbose min_level OR the tag in `verbose_tags`
/// 4. Other levels check against the minimum level threshold
/// 5. If enabled_tags is non-empty, the tag must be in the set

use super::config::{get_logger_config, is_debug_enabled_for_tag, is_verbose_enabled_for_tag};
use super::levels::LogLevel;
use super::tags::LogTag;

pub fn should_log(tag: &LogTag, level: LogLevel) -> bool {
    let config = get_logger_config();

    if level == LogLevel::Error {
        return true;
    }

    let level_allowed = match level {
        LogLevel::Debug => {
            config.min_level >= LogLevel::Debug || is_debug_enabled_for_tag(tag)
        }
        LogLevel::Verbose => {
            config.min_level == LogLevel::Verbose || is_verbose_enabled_for_tag(tag)
        }
        _ => level <= config.min_level,
    };
    if !level_allowed {
        return false;
    }

    if !config.enabled_tags.is_empty() && !config.enabled_tags.contains(&tag.to_debug_key()) {
        return false;
    }

    true
}

pub fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    if !should_log(&tag, level) {
        return;
    }

    super::format::format_and_log(tag, level, message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_always_pass() {
        assert!(should_log(&LogTag::Scanner, LogLevel::Error));
    }

    #[test]
    fn test_debug_gated_by_tag() {
        // default config: Info min level, no debug tags
        assert!(!should_log(&LogTag::Scanner, LogLevel::Debug));
        assert!(should_log(&LogTag::Scanner, LogLevel::Info));
    }
}
