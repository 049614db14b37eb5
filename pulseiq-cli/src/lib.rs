//! Command-line front end for the PulseIQ client
//!
//! ```bash
//! pulseiq login test@example.com 123456
//! pulseiq open /dashboard
//! pulseiq monitor --ticks 5
//! pulseiq chat "my head hurts" --confirm
//! pulseiq upload labs.pdf
//! pulseiq activity list
//! pulseiq logout
//! ```

pub mod cli;
pub mod commands;
pub mod output;

pub use cli::{ActivityCommand, Args, Command};
