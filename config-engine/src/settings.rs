use std::time::Duration;

use logger_redacted::LoggerConfig;
use serde::{Deserialize, Serialize};

/// Complete client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PulseConfig {
    pub backend: BackendConfig,
    pub polling: PollingConfig,
    pub storage: StorageConfig,
    pub account: AccountConfig,
    pub profile: ProfileDefaults,
    pub logging: LoggerConfig,
}

/// Where the external backend lives
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BackendConfig {
    /// Vitals collector, alert, chat, upload and activity feed endpoints
    pub base_url: String,
    /// Crash simulation hook; `/crash` and `/cancel` are appended
    pub simulation_url: String,
    /// Sent as `X-Trigger-Token` to the simulation hook
    pub trigger_token: String,
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            simulation_url: "http://127.0.0.1:8000/api/trigger".to_string(),
            trigger_token: "CRASH_BUTTON".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Periods of the three recurring timers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PollingConfig {
    pub telemetry_interval_ms: u64,
    pub alert_interval_ms: u64,
    pub feed_interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            telemetry_interval_ms: 30_000,
            alert_interval_ms: 3_000,
            feed_interval_ms: 3_000,
        }
    }
}

impl PollingConfig {
    pub fn telemetry_period(&self) -> Duration {
        Duration::from_millis(self.telemetry_interval_ms)
    }

    pub fn alert_period(&self) -> Duration {
        Duration::from_millis(self.alert_interval_ms)
    }

    pub fn feed_period(&self) -> Duration {
        Duration::from_millis(self.feed_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file path, or `:memory:` for a throwaway store
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { path: "pulseiq.db".to_string() }
    }
}

impl StorageConfig {
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }
}

/// The single mock account accepted by login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AccountConfig {
    pub email: String,
    pub password: String,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            email: "test@example.com".to_string(),
            password: "123456".to_string(),
        }
    }
}

/// Profile shown before the user edits anything
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProfileDefaults {
    pub name: String,
    pub email: String,
    pub blood_type: String,
    pub phone: String,
    pub age: String,
}

impl Default for ProfileDefaults {
    fn default() -> Self {
        Self {
            name: "Alex Morgan".to_string(),
            email: "alex@example.com".to_string(),
            blood_type: "O+".to_string(),
            phone: "+91 98765 43210".to_string(),
            age: "21 Years".to_string(),
        }
    }
}
