//! Server-maintained activity feed, refreshed while a profile view is open

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::backend::BackendApi;
use crate::scheduler::{PollingTask, TimerRegistry};

/// One feed row; `time` is a display string chosen by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub label: String,
    pub time: String,
}

/// Fetch the feed now and then every `period`
///
/// The receiver always holds the last list that arrived. A failed fetch is
/// logged and leaves it untouched.
pub fn spawn_feed_poller(
    timers: &TimerRegistry,
    backend: Arc<dyn BackendApi>,
    period: Duration,
) -> (PollingTask, watch::Receiver<Vec<FeedItem>>) {
    let (tx, rx) = watch::channel(Vec::new());
    let tx = Arc::new(tx);

    let task = timers.spawn_every("activity_feed", period, true, move || {
        let backend = Arc::clone(&backend);
        let tx = Arc::clone(&tx);
        async move {
            match backend.fetch_activity_feed().await {
                Ok(items) => {
                    tracing::debug!(count = items.len(), "activity feed refreshed");
                    tx.send_replace(items);
                }
                Err(e) => {
                    tracing::warn!(error = %e, error_code = e.code(), "activity feed refresh failed");
                }
            }
        }
    });

    (task, rx)
}
