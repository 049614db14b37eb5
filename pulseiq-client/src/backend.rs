//! Backend API surface and its HTTP implementation
//!
//! Every outbound call the client makes goes through [`BackendApi`]. The
//! pollers and chat flows only see the trait, so tests swap in a mock while
//! [`HttpBackend`] talks to the real services with `reqwest`.

use async_trait::async_trait;
use config_engine::BackendConfig;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};
use crate::feed::FeedItem;
use crate::vitals::VitalsSnapshot;

/// Header the simulation hook authenticates with
pub const TRIGGER_TOKEN_HEADER: &str = "X-Trigger-Token";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub vitals: VitalsSnapshot,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DoctorInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
}

/// Assistant reply; `action == "appointment"` carries a booking proposal
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub hospital: Option<String>,
    #[serde(default)]
    pub doctor: Option<DoctorInfo>,
}

impl ChatReply {
    pub fn is_appointment(&self) -> bool {
        self.action.as_deref() == Some("appointment")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadReply {
    pub response: String,
}

/// A file picked by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), mime_type: mime_type.into(), bytes }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IncidentTicket {
    pub incident_id: String,
}

#[derive(Debug, Deserialize)]
struct AlertReply {
    #[serde(default)]
    alert: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// `POST /update_vitals`; the acknowledgement body is ignored
    async fn publish_vitals(&self, vitals: VitalsSnapshot) -> ClientResult<()>;

    /// `GET /check_alert`
    async fn check_alert(&self) -> ClientResult<Option<String>>;

    /// `POST /chat`
    async fn send_chat(&self, request: ChatRequest) -> ClientResult<ChatReply>;

    /// `POST /upload_pdf` as multipart `file` + `vitals`
    async fn upload_document(
        &self,
        document: DocumentUpload,
        vitals: VitalsSnapshot,
    ) -> ClientResult<UploadReply>;

    /// `GET /get_activity`
    async fn fetch_activity_feed(&self) -> ClientResult<Vec<FeedItem>>;

    /// `GET {simulation_url}/crash`
    async fn trigger_simulation(&self) -> ClientResult<IncidentTicket>;

    /// `GET {simulation_url}/cancel`
    async fn cancel_simulation(&self) -> ClientResult<()>;
}

/// `reqwest` client for the PulseIQ backend and the simulation hook
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    simulation_url: String,
    trigger_token: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            simulation_url: config.simulation_url.trim_end_matches('/').to_string(),
            trigger_token: config.trigger_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn simulation(&self, action: &str) -> String {
        format!("{}/{}", self.simulation_url, action)
    }

    async fn ensure_success(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::BadStatus { status: status.as_u16(), body })
    }

    /// Read the whole body and parse it; a non-JSON body is a malformed reply
    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn publish_vitals(&self, vitals: VitalsSnapshot) -> ClientResult<()> {
        let response = self.client.post(self.url("update_vitals")).json(&vitals).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn check_alert(&self) -> ClientResult<Option<String>> {
        let response = self.client.get(self.url("check_alert")).send().await?;
        let reply: AlertReply = Self::read_json(response).await?;
        Ok(reply.alert.filter(|alert| !alert.is_empty()))
    }

    async fn send_chat(&self, request: ChatRequest) -> ClientResult<ChatReply> {
        let response = self.client.post(self.url("chat")).json(&request).send().await?;
        Self::read_json(response).await
    }

    async fn upload_document(
        &self,
        document: DocumentUpload,
        vitals: VitalsSnapshot,
    ) -> ClientResult<UploadReply> {
        let file = Part::bytes(document.bytes)
            .file_name(document.file_name)
            .mime_str(&document.mime_type)?;
        let form = Form::new()
            .part("file", file)
            .text("vitals", serde_json::to_string(&vitals)?);

        let response = self.client.post(self.url("upload_pdf")).multipart(form).send().await?;
        Self::read_json(response).await
    }

    async fn fetch_activity_feed(&self) -> ClientResult<Vec<FeedItem>> {
        let response = self.client.get(self.url("get_activity")).send().await?;
        Self::read_json(response).await
    }

    async fn trigger_simulation(&self) -> ClientResult<IncidentTicket> {
        let response = self
            .client
            .get(self.simulation("crash"))
            .header(TRIGGER_TOKEN_HEADER, &self.trigger_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn cancel_simulation(&self) -> ClientResult<()> {
        let response = self
            .client
            .get(self.simulation("cancel"))
            .header(TRIGGER_TOKEN_HEADER, &self.trigger_token)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn backend_for(server: &mockito::ServerGuard) -> HttpBackend {
        let config = BackendConfig {
            base_url: server.url(),
            simulation_url: format!("{}/api/trigger", server.url()),
            ..BackendConfig::default()
        };
        HttpBackend::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_publish_vitals_posts_snapshot() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/update_vitals")
            .match_body(Matcher::PartialJson(serde_json::json!({ "heart_rate": 110, "spo2": 92 })))
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        backend_for(&server).publish_vitals(VitalsSnapshot::default()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_check_alert_null_and_text() {
        let mut server = mockito::Server::new_async().await;
        let backend = backend_for(&server);

        let quiet = server
            .mock("GET", "/check_alert")
            .with_header("content-type", "application/json")
            .with_body(r#"{"alert": null}"#)
            .create_async()
            .await;
        assert_eq!(backend.check_alert().await.unwrap(), None);
        quiet.remove_async().await;

        server
            .mock("GET", "/check_alert")
            .with_header("content-type", "application/json")
            .with_body(r#"{"alert": "Heart rate critical"}"#)
            .create_async()
            .await;
        assert_eq!(backend.check_alert().await.unwrap().as_deref(), Some("Heart rate critical"));
    }

    #[tokio::test]
    async fn test_chat_reply_with_appointment() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat")
            .match_body(Matcher::PartialJson(serde_json::json!({ "message": "book me a doctor" })))
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"response": "Booking now", "action": "appointment",
                    "hospital": "Apollo", "doctor": {"name": "Dr. Iyer"}}"#,
            )
            .create_async()
            .await;

        let reply = backend_for(&server)
            .send_chat(ChatRequest {
                message: "book me a doctor".to_string(),
                vitals: VitalsSnapshot::default(),
            })
            .await
            .unwrap();

        assert!(reply.is_appointment());
        assert_eq!(reply.hospital.as_deref(), Some("Apollo"));
        let doctor = reply.doctor.unwrap();
        assert_eq!(doctor.name.as_deref(), Some("Dr. Iyer"));
        assert_eq!(doctor.specialty, None);
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat")
            .with_header("content-type", "text/html")
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let err = backend_for(&server)
            .send_chat(ChatRequest { message: "hi".to_string(), vitals: VitalsSnapshot::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/get_activity")
            .with_status(503)
            .with_body("down")
            .create_async()
            .await;

        let err = backend_for(&server).fetch_activity_feed().await.unwrap_err();
        assert!(matches!(err, ClientError::BadStatus { status: 503, .. }));
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let config = BackendConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            ..BackendConfig::default()
        };
        let err = HttpBackend::new(&config).unwrap().check_alert().await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }

    #[tokio::test]
    async fn test_upload_is_multipart_with_vitals() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/upload_pdf")
            .match_header("content-type", Matcher::Regex("multipart/form-data".to_string()))
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="file"; filename="report.pdf""#.to_string()),
                Matcher::Regex(r#"name="vitals""#.to_string()),
                Matcher::Regex(r#""glucose":100"#.to_string()),
            ]))
            .with_header("content-type", "application/json")
            .with_body(r#"{"response": "Report looks fine"}"#)
            .create_async()
            .await;

        let document = DocumentUpload::new("report.pdf", "application/pdf", b"%PDF-1.4".to_vec());
        assert!(!document.is_image());
        let reply = backend_for(&server)
            .upload_document(document, VitalsSnapshot::default())
            .await
            .unwrap();

        assert_eq!(reply.response, "Report looks fine");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_trigger_sends_token_and_reads_incident() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/trigger/crash")
            .match_header(TRIGGER_TOKEN_HEADER, "CRASH_BUTTON")
            .with_header("content-type", "application/json")
            .with_body(r#"{"incident_id": "inc_1700000000_ab12", "status": "monitoring"}"#)
            .create_async()
            .await;
        let cancel = server
            .mock("GET", "/api/trigger/cancel")
            .match_header(TRIGGER_TOKEN_HEADER, "CRASH_BUTTON")
            .with_status(200)
            .create_async()
            .await;

        let backend = backend_for(&server);
        let ticket = backend.trigger_simulation().await.unwrap();
        assert_eq!(ticket.incident_id, "inc_1700000000_ab12");

        backend.cancel_simulation().await.unwrap();
        cancel.assert_async().await;
    }
}
