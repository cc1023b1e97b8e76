//! Structured logging for scanbot
//!
//! Tag + level console logging with per-tag debug gating:
//! - Standard log levels (Error/Warning/Info/Debug/Verbose)
//! - Per-subsystem tags so scan noise can be filtered at the source
//! - Programmatic configuration (the host application owns the CLI)
//!
//! ## Usage
//!
//! ```rust
//! use scanbot::logger::{self, LogTag};
//!
//! logger::info(LogTag::Scanner, "Scan started");
//! logger::warning(LogTag::Tracker, "Signal write failed, continuing");
//! logger::debug(LogTag::Scoring, "penalties_total=-3.5"); // gated per tag
//! ```

mod config;
mod core;
mod format;
mod levels;
mod tags;

pub use config::{get_logger_config, set_logger_config, update_logger_config, LoggerConfig};
pub use levels::LogLevel;
pub use tags::LogTag;

/// Log at ERROR level (always shown)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level (shown unless min_level is Error)
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operations)
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level (only for tags enabled in the config)
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level (requires verbose min_level or per-tag opt-in)
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}
