//! Process-wide chat transcript and the alert suspend latch

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

pub const GREETING: &str = "Hello, I am PulseIQ Guardian. Upload your medical PDF or ask anything.";

/// A booking the assistant proposed and the user has not confirmed yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentProposal {
    pub hospital: String,
    pub doctor_name: Option<String>,
    pub specialty: Option<String>,
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "from", rename_all = "snake_case")]
pub enum ChatEntry {
    User { text: String },
    Bot { text: String },
    Appointment(AppointmentProposal),
}

impl ChatEntry {
    pub fn user(text: impl Into<String>) -> Self {
        ChatEntry::User { text: text.into() }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        ChatEntry::Bot { text: text.into() }
    }
}

/// Transcript plus suspend latch, built once at boot and shared by `Arc`
///
/// Entries are only ever appended. The latch only ever goes from open to
/// closed; a new store (fresh boot) is the only way to reopen it.
#[derive(Debug)]
pub struct ConversationStore {
    entries: RwLock<Vec<ChatEntry>>,
    suspended: AtomicBool,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(vec![ChatEntry::bot(GREETING)]),
            suspended: AtomicBool::new(false),
        }
    }

    /// Append at the end and return the new length
    pub fn append(&self, entry: ChatEntry) -> usize {
        let mut entries = self.entries.write();
        entries.push(entry);
        entries.len()
    }

    /// Append several entries with no other append in between
    pub fn append_all(&self, batch: impl IntoIterator<Item = ChatEntry>) -> usize {
        let mut entries = self.entries.write();
        entries.extend(batch);
        entries.len()
    }

    pub fn read_all(&self) -> Vec<ChatEntry> {
        self.entries.read().clone()
    }

    pub fn last(&self) -> Option<ChatEntry> {
        self.entries.read().last().cloned()
    }

    /// Close the alert gate; idempotent
    pub fn set_suspend(&self) {
        if !self.suspended.swap(true, Ordering::SeqCst) {
            tracing::debug!("alert polling suspended by user interaction");
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::SeqCst)
    }
}
