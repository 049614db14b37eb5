//! Process-wide activity log with write-through persistence

use std::sync::Arc;

use chrono::{DateTime, Utc};
use error_common::codes;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::ClientResult;
use crate::storage::{KeyValueStore, ACTIVITY_KEY};

/// Immutable, timestamped log entry; `label` may carry `<b>` markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: i64,
    pub label: String,
    pub timestamp: DateTime<Utc>,
}

/// Newest-first log, written through to storage on every mutation
///
/// The lock is held across the storage write so two rapid mutations never
/// interleave their read-modify-persist sequences.
pub struct ActivityLog {
    storage: Arc<dyn KeyValueStore>,
    records: Mutex<Vec<ActivityRecord>>,
}

impl ActivityLog {
    /// Load the persisted log; unreadable data starts an empty log
    pub async fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let records = match storage.get(ACTIVITY_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<ActivityRecord>>(&raw) {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        error_code = codes::storage::CORRUPT_DATA,
                        "stored activity log unreadable, starting empty"
                    );
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    error_code = codes::storage::READ_FAILED,
                    "failed to read activity log, starting empty"
                );
                Vec::new()
            }
        };

        tracing::debug!(count = records.len(), "activity log loaded");
        Self { storage, records: Mutex::new(records) }
    }

    /// Prepend a new record and return it
    pub async fn record(&self, label: impl Into<String>) -> ActivityRecord {
        let mut records = self.records.lock().await;

        let now = Utc::now();
        let last_id = records.first().map_or(i64::MIN, |r| r.id);
        let record = ActivityRecord {
            id: now.timestamp_millis().max(last_id.saturating_add(1)),
            label: label.into(),
            timestamp: now,
        };
        records.insert(0, record.clone());

        self.persist(&records).await;
        record
    }

    pub async fn clear(&self) {
        let mut records = self.records.lock().await;
        records.clear();
        self.persist(&records).await;
    }

    pub async fn read_all(&self) -> Vec<ActivityRecord> {
        self.records.lock().await.clone()
    }

    async fn persist(&self, records: &[ActivityRecord]) {
        if let Err(e) = self.write_through(records).await {
            tracing::warn!(error = %e, error_code = e.code(), "failed to persist activity log");
        }
    }

    async fn write_through(&self, records: &[ActivityRecord]) -> ClientResult<()> {
        let serialized = serde_json::to_string(records)?;
        self.storage.set(ACTIVITY_KEY, &serialized).await
    }
}
