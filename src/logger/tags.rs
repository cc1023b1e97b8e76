/// Subsystem tags for log filtering
///
/// One tag per scanbot subsystem. The tag string doubles as the debug key
/// used by `LoggerConfig::debug_tags`.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    Scanner,
    Scoring,
    Regime,
    Thresholds,
    Display,
    Entry,
    Session,
    Tracker,
    Ml,
    Snapshot,
    Cache,
    Config,
}

impl LogTag {
    /// Display name, also used for column alignment in the console output
    pub fn as_str(&self) -> &'static str {
        match self {
            LogTag::Scanner => "SCANNER",
            LogTag::Scoring => "SCORING",
            LogTag::Regime => "REGIME",
            LogTag::Thresholds => "THRESHOLD",
            LogTag::Display => "DISPLAY",
            LogTag::Entry => "ENTRY",
            LogTag::Session => "SESSION",
            LogTag::Tracker => "TRACKER",
            LogTag::Ml => "ML",
            LogTag::Snapshot => "SNAPSHOT",
            LogTag::Cache => "CACHE",
            LogTag::Config => "CONFIG",
        }
    }

    /// Key used when enabling per-tag debug logging
    pub fn to_debug_key(&self) -> String {
        self.as_str().to_lowercase()
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
