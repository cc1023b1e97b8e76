//! Log formatting and console output
//!
//! Colorized `[TIME] [TAG] [LEVEL] message` lines with numeric highlighting
//! so scores, prices and percentages stand out in scan output.

use super::levels::LogLevel;
use super::tags::LogTag;
use chrono::Local;
use colored::*;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{stdout, Write};

/// Column width for the tag field
const TAG_WIDTH: usize = 9;

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?-?[\d,]+\.?\d*%?)").expect("static regex"));

pub fn format_and_log(tag: LogTag, level: LogLevel, message: &str) {
    let time = Local::now().format("%H:%M:%S").to_string();

    let tag_str = colorize_tag(&tag, format!("{:<width$}", tag.as_str(), width = TAG_WIDTH));
    let level_str = colorize_level(level);
    let body = highlight_values(message, level);

    let line = format!(
        "{} [{}] [{}] {}",
        time.dimmed(),
        tag_str,
        level_str,
        body
    );

    let mut out = stdout();
    // Ignore broken pipes when output is piped into head/grep
    let _ = writeln!(out, "{}", line);
    let _ = out.flush();
}

fn colorize_tag(tag: &LogTag, padded: String) -> String {
    match tag {
        LogTag::Scanner => padded.cyan().bold().to_string(),
        LogTag::Scoring => padded.yellow().bold().to_string(),
        LogTag::Regime => padded.magenta().bold().to_string(),
        LogTag::Thresholds => padded.blue().bold().to_string(),
        LogTag::Display => padded.green().bold().to_string(),
        LogTag::Entry => padded.bright_yellow().bold().to_string(),
        LogTag::Session => padded.bright_blue().bold().to_string(),
        LogTag::Tracker => padded.bright_magenta().bold().to_string(),
        LogTag::Ml => padded.bright_green().bold().to_string(),
        LogTag::Snapshot => padded.bright_cyan().bold().to_string(),
        LogTag::Cache => padded.white().bold().to_string(),
        LogTag::Config => padded.bright_white().bold().to_string(),
    }
}

fn colorize_level(level: LogLevel) -> String {
    let name = format!("{:<7}", level.as_str());
    match level {
        LogLevel::Error => name.red().bold().to_string(),
        LogLevel::Warning => name.yellow().to_string(),
        LogLevel::Info => name.normal().to_string(),
        LogLevel::Debug => name.purple().to_string(),
        LogLevel::Verbose => name.dimmed().to_string(),
    }
}

/// Highlight numbers (prices, scores, percentages) in the message body
fn highlight_values(message: &str, level: LogLevel) -> String {
    if level == LogLevel::Error {
        return message.red().to_string();
    }
    NUMBER_RE
        .replace_all(message, |caps: &regex::Captures| {
            caps[1].bright_white().bold().to_string()
        })
        .to_string()
}
