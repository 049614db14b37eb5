//! Tracing setup with automatic PII redaction
//!
//! Installs the global `tracing` subscriber for PulseIQ binaries. Every
//! formatted event passes through a [`PiiRedactor`] before it reaches
//! stderr or the rotated log file, so e-mail addresses and phone numbers
//! from the session flag and the profile record never land in logs.
//!
//! # Example
//!
//! ```rust,no_run
//! use logger_redacted::{init, LoggerConfig};
//!
//! let _guard = init(&LoggerConfig::default())?;
//! tracing::info!("logged in as test@example.com");
//! // Output: "logged in as t***@e***"
//! # Ok::<(), logger_redacted::LoggerError>(())
//! ```

pub mod config;
pub mod redactor;
pub mod writer;

pub use config::*;
pub use redactor::*;
pub use writer::*;

use thiserror::Error;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log filter '{0}'")]
    InvalidFilter(String),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

/// Keeps file logging alive; drop it only at process exit
pub struct LoggingGuard {
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Build the redactor described by `config`
pub fn redactor_for(config: &LoggerConfig) -> PiiRedactor {
    PiiRedactor::new(RedactionConfig {
        redact_emails: config.redaction_enabled,
        redact_phones: config.redaction_enabled,
        hash_for_correlation: config.hash_for_correlation,
        custom_patterns: Vec::new(),
    })
}

/// Install the global subscriber
pub fn init(config: &LoggerConfig) -> Result<LoggingGuard, LoggerError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|_| LoggerError::InvalidFilter(config.level.clone()))?,
    };
    let redactor = redactor_for(config);

    let (non_blocking, file_guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "pulseiq.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let result = match (non_blocking, config.json) {
        (Some(file), true) => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .with_writer(RedactingMakeWriter::new(redactor, file)),
            )
            .try_init(),
        (Some(file), false) => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .with_writer(RedactingMakeWriter::new(redactor, file)),
            )
            .try_init(),
        (None, true) => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .with_writer(RedactingMakeWriter::new(redactor, std::io::stderr)),
            )
            .try_init(),
        (None, false) => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(RedactingMakeWriter::new(redactor, std::io::stderr)),
            )
            .try_init(),
    };
    result.map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))?;

    Ok(LoggingGuard { _file_guard: file_guard })
}
