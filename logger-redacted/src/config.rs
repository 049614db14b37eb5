// Logger configuration
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggerConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Mask e-mail addresses and phone numbers before writing
    pub redaction_enabled: bool,
    /// Replace redacted values with a short hash instead of a mask
    pub hash_for_correlation: bool,
    /// Write to daily rotated files in this directory instead of stderr
    pub log_dir: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            redaction_enabled: true,
            hash_for_correlation: false,
            log_dir: None,
        }
    }
}
