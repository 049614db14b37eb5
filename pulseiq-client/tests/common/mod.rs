#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use pulseiq_client::feed::FeedItem;
use pulseiq_client::{
    BackendApi, ChatReply, ChatRequest, ClientError, ClientResult, DocumentUpload, IncidentTicket,
    UploadReply, VitalsSnapshot,
};

/// Backend double answering from queued scripts
#[derive(Default)]
pub struct ScriptedBackend {
    pub alerts: Mutex<VecDeque<String>>,
    pub chat_replies: Mutex<VecDeque<String>>,
    pub alert_calls: AtomicUsize,
    pub chat_requests: Mutex<Vec<ChatRequest>>,
    pub published: Mutex<Vec<VitalsSnapshot>>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn queue_alert(&self, alert: &str) {
        self.alerts.lock().push_back(alert.to_string());
    }

    pub fn queue_reply(&self, reply: &str) {
        self.chat_replies.lock().push_back(reply.to_string());
    }

    pub fn alert_calls(&self) -> usize {
        self.alert_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackendApi for ScriptedBackend {
    async fn publish_vitals(&self, vitals: VitalsSnapshot) -> ClientResult<()> {
        self.published.lock().push(vitals);
        Ok(())
    }

    async fn check_alert(&self) -> ClientResult<Option<String>> {
        self.alert_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.alerts.lock().pop_front())
    }

    async fn send_chat(&self, request: ChatRequest) -> ClientResult<ChatReply> {
        self.chat_requests.lock().push(request);
        let response = self
            .chat_replies
            .lock()
            .pop_front()
            .ok_or_else(|| ClientError::Network("no scripted reply".to_string()))?;
        Ok(ChatReply { response, action: None, hospital: None, doctor: None })
    }

    async fn upload_document(
        &self,
        document: DocumentUpload,
        _vitals: VitalsSnapshot,
    ) -> ClientResult<UploadReply> {
        Ok(UploadReply { response: format!("Received {}", document.file_name) })
    }

    async fn fetch_activity_feed(&self) -> ClientResult<Vec<FeedItem>> {
        Ok(vec![FeedItem { label: "Checked vitals".to_string(), time: "09:00".to_string() }])
    }

    async fn trigger_simulation(&self) -> ClientResult<IncidentTicket> {
        Ok(IncidentTicket { incident_id: "inc_test".to_string() })
    }

    async fn cancel_simulation(&self) -> ClientResult<()> {
        Ok(())
    }
}
