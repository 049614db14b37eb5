//! Client core of the PulseIQ health dashboard
//!
//! Provides:
//! - Session flag and route guard
//! - Process-wide conversation transcript with an alert suspend latch
//! - Activity log persisted to local SQLite storage
//! - Shared live-vitals simulator with lease-based start/stop
//! - Alert and activity-feed pollers tied to view lifetime
//! - `reqwest` client for the PulseIQ backend

pub mod activity;
pub mod alerts;
pub mod app;
pub mod backend;
pub mod chat;
pub mod conversation;
pub mod error;
pub mod feed;
pub mod profile;
pub mod scheduler;
pub mod session;
pub mod storage;
pub mod telemetry;
pub mod vitals;

pub use activity::{ActivityLog, ActivityRecord};
pub use app::{DashboardView, ProfileView, PulseApp, Screen};
pub use backend::{
    BackendApi, ChatReply, ChatRequest, DocumentUpload, HttpBackend, IncidentTicket, UploadReply,
};
pub use chat::{Assistant, ChatTurn};
pub use conversation::{AppointmentProposal, ChatEntry, ConversationStore};
pub use error::{ClientError, ClientResult};
pub use feed::FeedItem;
pub use profile::{ProfileEditor, ProfileField, ProfileRecord};
pub use scheduler::{PollingTask, TimerRegistry};
pub use session::{Route, SessionStore, SignupForm};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
pub use telemetry::{TelemetryHub, TelemetryLease};
pub use vitals::{Severity, VitalField, VitalsSnapshot};
