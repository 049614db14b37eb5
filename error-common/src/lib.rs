//! Common error handling utilities for the PulseIQ client
//!
//! Every crate in the workspace defines its own `thiserror` enum for the
//! failures it can produce. This crate holds what they share:
//!
//! - **Error Codes**: stable string codes, grouped by category, that crate
//!   errors map onto so log lines and CLI output can be grepped
//! - **PulseError**: the top-level error the binary reports, with `anyhow`
//!   interop for anything that does not need its own category
//!
//! # Example
//!
//! ```rust
//! use error_common::{codes, PulseError};
//!
//! fn require_email(email: &str) -> Result<(), PulseError> {
//!     if email.is_empty() {
//!         return Err(PulseError::validation(
//!             codes::validation::MISSING_REQUIRED_FIELD,
//!             "email must not be empty",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! let err = require_email("").unwrap_err();
//! assert_eq!(err.code(), codes::validation::MISSING_REQUIRED_FIELD);
//! ```

pub mod codes;
pub mod types;

pub use types::*;
