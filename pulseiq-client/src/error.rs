//! Error types for the client core

use error_common::{codes, PulseError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend returned status {status}: {body}")]
    BadStatus { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Configuration error: {0}")]
    Config(#[from] config_engine::ConfigError),
}

impl ClientError {
    /// Stable code, see [`error_common::codes`]
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::Database(_) | ClientError::Storage(_) => codes::storage::WRITE_FAILED,
            ClientError::Serialization(_) => codes::storage::CORRUPT_DATA,
            ClientError::Network(_) => codes::network::UNREACHABLE,
            ClientError::BadStatus { .. } => codes::network::BAD_STATUS,
            ClientError::MalformedResponse(_) => codes::network::MALFORMED_RESPONSE,
            ClientError::InvalidCredentials => codes::authentication::INVALID_CREDENTIALS,
            ClientError::Validation(_) => codes::validation::MISSING_REQUIRED_FIELD,
            ClientError::PasswordMismatch => codes::validation::PASSWORD_MISMATCH,
            ClientError::Config(_) => codes::system::CONFIGURATION,
        }
    }

    /// Failures of a single request that a transcript consumer reports inline
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ClientError::Network(_) | ClientError::BadStatus { .. } | ClientError::MalformedResponse(_)
        )
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::MalformedResponse(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<ClientError> for PulseError {
    fn from(err: ClientError) -> Self {
        let code = err.code();
        let message = err.to_string();
        match err {
            ClientError::InvalidCredentials => PulseError::auth(code, message),
            ClientError::Validation(_) | ClientError::PasswordMismatch => {
                PulseError::validation(code, message)
            }
            ClientError::Database(_) | ClientError::Storage(_) | ClientError::Serialization(_) => {
                PulseError::storage(code, message)
            }
            ClientError::Network(_)
            | ClientError::BadStatus { .. }
            | ClientError::MalformedResponse(_) => PulseError::network(code, message),
            ClientError::Config(_) => PulseError::Config(message),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
