// Configuration validation
use crate::error::{ConfigError, Result};
use crate::settings::PulseConfig;

/// Reject configurations the client cannot run with
pub fn validate(config: &PulseConfig) -> Result<()> {
    let base_url = config.backend.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "backend.base_url must be an http(s) URL, got '{base_url}'"
        )));
    }

    let periods = [
        ("polling.telemetry_interval_ms", config.polling.telemetry_interval_ms),
        ("polling.alert_interval_ms", config.polling.alert_interval_ms),
        ("polling.feed_interval_ms", config.polling.feed_interval_ms),
    ];
    for (key, value) in periods {
        if value == 0 {
            return Err(ConfigError::ValidationError(format!("{key} must be greater than zero")));
        }
    }

    if config.backend.request_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "backend.request_timeout_secs must be greater than zero".to_string(),
        ));
    }

    if config.storage.path.trim().is_empty() {
        return Err(ConfigError::ValidationError("storage.path must not be empty".to_string()));
    }

    Ok(())
}
