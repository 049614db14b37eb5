use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pulseiq")]
#[command(about = "PulseIQ health dashboard client")]
#[command(version)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "pulseiq.yaml", env = "PULSEIQ_CONFIG")]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Log in with the demo account
    Login {
        email: String,
        #[arg(env = "PULSEIQ_PASSWORD")]
        password: String,
    },

    /// End the current session
    Logout,

    /// Validate a signup form
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
    },

    /// Show session and local state
    Status,

    /// Navigate to a route and show where it lands
    Open { path: String },

    /// Watch live vitals and alerts on the dashboard
    Monitor {
        /// Number of telemetry ticks to wait for
        #[arg(long, default_value_t = 3)]
        ticks: u32,
    },

    /// Ask the assistant
    Chat {
        message: String,
        /// Confirm an appointment if the assistant proposes one
        #[arg(long)]
        confirm: bool,
    },

    /// Send a PDF or image report for analysis
    Upload {
        file: PathBuf,
        /// MIME type; guessed from the extension when omitted
        #[arg(long)]
        mime: Option<String>,
    },

    /// Local activity log
    #[command(subcommand)]
    Activity(ActivityCommand),

    /// Server activity feed
    Feed {
        /// Seconds to wait for the first refresh
        #[arg(long, default_value_t = 5)]
        wait: u64,
    },

    /// Start the crash simulation
    Trigger,

    /// Stop the crash simulation
    Cancel,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ActivityCommand {
    List,
    Clear,
}
