//! Alert poller for the dashboard

use std::sync::Arc;
use std::time::Duration;

use crate::backend::BackendApi;
use crate::conversation::{ChatEntry, ConversationStore};
use crate::scheduler::{PollingTask, TimerRegistry};

/// Poll the alert endpoint every `period` and post alerts to the transcript
///
/// The suspend latch is read when the tick fires and again when the reply
/// arrives; once the user has interacted, nothing is queried or appended.
pub fn spawn_alert_poller(
    timers: &TimerRegistry,
    conversation: Arc<ConversationStore>,
    backend: Arc<dyn BackendApi>,
    period: Duration,
) -> PollingTask {
    timers.spawn_every("alerts", period, false, move || {
        let conversation = Arc::clone(&conversation);
        let backend = Arc::clone(&backend);
        async move {
            if conversation.is_suspended() {
                return;
            }

            match backend.check_alert().await {
                Ok(Some(alert)) => {
                    if conversation.is_suspended() {
                        tracing::debug!("alert dropped, polling suspended while in flight");
                        return;
                    }
                    tracing::info!("health alert received");
                    conversation.append(ChatEntry::bot(alert));
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, error_code = e.code(), "alert check failed");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackendApi;
    use crate::conversation::GREETING;
    use crate::error::ClientError;

    const PERIOD: Duration = Duration::from_secs(3);

    #[tokio::test(start_paused = true)]
    async fn test_alert_is_appended_as_bot_entry() {
        let mut first = true;
        let mut backend = MockBackendApi::new();
        backend.expect_check_alert().returning(move || {
            let alert = first.then(|| "Glucose spike detected".to_string());
            first = false;
            Ok(alert)
        });

        let conversation = Arc::new(ConversationStore::new());
        let timers = TimerRegistry::new();
        let _task = spawn_alert_poller(&timers, Arc::clone(&conversation), Arc::new(backend), PERIOD);

        tokio::time::sleep(Duration::from_millis(9_500)).await;
        assert_eq!(
            conversation.read_all(),
            vec![ChatEntry::bot(GREETING), ChatEntry::bot("Glucose spike detected")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_suspended_poller_makes_no_requests() {
        let mut backend = MockBackendApi::new();
        backend.expect_check_alert().never();

        let conversation = Arc::new(ConversationStore::new());
        conversation.set_suspend();
        let timers = TimerRegistry::new();
        let _task = spawn_alert_poller(&timers, Arc::clone(&conversation), Arc::new(backend), PERIOD);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(conversation.read_all().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latch_closed_while_request_in_flight() {
        let conversation = Arc::new(ConversationStore::new());
        let latch = Arc::clone(&conversation);

        let mut backend = MockBackendApi::new();
        backend.expect_check_alert().returning(move || {
            // user typed while the request was outstanding
            latch.set_suspend();
            Ok(Some("Blood pressure high".to_string()))
        });

        let timers = TimerRegistry::new();
        let _task = spawn_alert_poller(&timers, Arc::clone(&conversation), Arc::new(backend), PERIOD);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(conversation.read_all(), vec![ChatEntry::bot(GREETING)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_not_appended() {
        let mut backend = MockBackendApi::new();
        backend
            .expect_check_alert()
            .returning(|| Err(ClientError::MalformedResponse("expected value".to_string())));

        let conversation = Arc::new(ConversationStore::new());
        let timers = TimerRegistry::new();
        let task = spawn_alert_poller(&timers, Arc::clone(&conversation), Arc::new(backend), PERIOD);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(conversation.read_all().len(), 1);

        drop(task);
        assert_eq!(timers.active(), 0);
    }
}
