use thiserror::Error;

use crate::codes;

/// Top-level error reported by PulseIQ binaries
#[derive(Error, Debug)]
pub enum PulseError {
    /// Form or argument validation failed; nothing was mutated
    #[error("Validation error: {message}")]
    Validation { code: &'static str, message: String },

    /// Credentials did not match or no session exists
    #[error("Authentication error: {message}")]
    Auth { code: &'static str, message: String },

    /// Durable client storage could not be read or written
    #[error("Storage error: {message}")]
    Storage { code: &'static str, message: String },

    /// Backend unreachable, bad status or unreadable reply
    #[error("Network error: {message}")]
    Network { code: &'static str, message: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PulseError {
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::Validation { code, message: message.into() }
    }

    pub fn auth(code: &'static str, message: impl Into<String>) -> Self {
        Self::Auth { code, message: message.into() }
    }

    pub fn storage(code: &'static str, message: impl Into<String>) -> Self {
        Self::Storage { code, message: message.into() }
    }

    pub fn network(code: &'static str, message: impl Into<String>) -> Self {
        Self::Network { code, message: message.into() }
    }

    /// Stable code for this error, see [`crate::codes`]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { code, .. }
            | Self::Auth { code, .. }
            | Self::Storage { code, .. }
            | Self::Network { code, .. } => code,
            Self::Config(_) => codes::system::CONFIGURATION,
            Self::Other(_) => codes::system::INTERNAL,
        }
    }
}

/// Result type alias for PulseIQ operations
pub type Result<T> = std::result::Result<T, PulseError>;

/// Log an error with its code at the call site that swallowed it
pub fn log_error(context: &str, error: &PulseError) {
    tracing::error!(
        context = context,
        error_code = error.code(),
        error = %error,
        "PulseIQ error occurred"
    );
}
