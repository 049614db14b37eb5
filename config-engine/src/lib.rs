//! Layered configuration for the PulseIQ client
//!
//! Sources, later ones overriding earlier ones:
//!
//! - **Defaults**: every section implements `Default`
//! - **Local file**: optional YAML, TOML or JSON file
//! - **Environment**: `PULSEIQ_<SECTION>__<KEY>`, e.g.
//!   `PULSEIQ_BACKEND__BASE_URL=http://10.0.0.5:5000`
//!
//! # Example
//!
//! ```rust,no_run
//! use config_engine::ConfigEngine;
//!
//! let config = ConfigEngine::new()
//!     .with_file("pulseiq.yaml")
//!     .load()?;
//! println!("backend at {}", config.backend.base_url);
//! # Ok::<(), config_engine::ConfigError>(())
//! ```

pub mod engine;
pub mod settings;
pub mod validation;
pub mod error;

pub use engine::*;
pub use settings::*;
pub use error::*;
