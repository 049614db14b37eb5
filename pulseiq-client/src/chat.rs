//! Chat interactions of the dashboard assistant
//!
//! [`Assistant`] turns user actions (typing, sending, uploading, confirming a
//! booking) into transcript entries, activity records and backend calls.
//! Request failures never escape: they become synthetic bot entries.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::activity::ActivityLog;
use crate::backend::{BackendApi, ChatReply, ChatRequest, DocumentUpload};
use crate::conversation::{AppointmentProposal, ChatEntry, ConversationStore};
use crate::error::ClientError;
use crate::vitals::VitalsSnapshot;

pub const SERVER_UNREACHABLE: &str = "Server unreachable.";
pub const UNREADABLE_RESPONSE: &str = "Server sent a response that could not be read.";
pub const UPLOAD_FAILED: &str = "File upload failed.";

pub const DEFAULT_HOSPITAL: &str = "CityCare Hospital";
pub const DEFAULT_DOCTOR: &str = "Dr. Meera Desai";
pub const DEFAULT_SPECIALTY: &str = "General Physician";
pub const APPOINTMENT_TIME: &str = "5pm";

/// What became of one user action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatTurn {
    /// Nothing was sent: blank input or a request already in flight
    Ignored,
    /// The backend answered and the reply was appended
    Answered,
    /// The request failed and a synthetic bot entry was appended
    Failed,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct Assistant {
    conversation: Arc<ConversationStore>,
    activity: Arc<ActivityLog>,
    backend: Arc<dyn BackendApi>,
    vitals: watch::Receiver<VitalsSnapshot>,
    in_flight: AtomicUsize,
}

impl Assistant {
    pub fn new(
        conversation: Arc<ConversationStore>,
        activity: Arc<ActivityLog>,
        backend: Arc<dyn BackendApi>,
        vitals: watch::Receiver<VitalsSnapshot>,
    ) -> Self {
        Self { conversation, activity, backend, vitals, in_flight: AtomicUsize::new(0) }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    fn current_vitals(&self) -> VitalsSnapshot {
        *self.vitals.borrow()
    }

    /// The user typed into the input
    pub fn note_typing(&self) {
        self.conversation.set_suspend();
    }

    pub async fn send_message(&self, text: &str) -> ChatTurn {
        if text.trim().is_empty() {
            return ChatTurn::Ignored;
        }
        if self
            .in_flight
            .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("chat request already in flight, message ignored");
            return ChatTurn::Ignored;
        }
        let _in_flight = InFlight(&self.in_flight);

        self.conversation.set_suspend();
        self.conversation.append(ChatEntry::user(text));

        let request = ChatRequest { message: text.to_string(), vitals: self.current_vitals() };
        match self.backend.send_chat(request).await {
            Ok(reply) => {
                self.deliver(reply).await;
                ChatTurn::Answered
            }
            Err(e) => {
                tracing::warn!(error = %e, error_code = e.code(), "chat request failed");
                self.conversation.append(ChatEntry::bot(failure_text(&e)));
                ChatTurn::Failed
            }
        }
    }

    async fn deliver(&self, reply: ChatReply) {
        if !reply.is_appointment() {
            self.conversation.append(ChatEntry::bot(reply.response));
            return;
        }

        let hospital = reply.hospital.unwrap_or_else(|| DEFAULT_HOSPITAL.to_string());
        self.activity
            .record(format!("Started appointment booking at {hospital}"))
            .await;

        let doctor = reply.doctor.unwrap_or_default();
        self.conversation.append_all([
            ChatEntry::bot(reply.response),
            ChatEntry::Appointment(AppointmentProposal {
                hospital,
                doctor_name: doctor.name,
                specialty: doctor.specialty,
            }),
        ]);
    }

    /// Send a picked file with the current vitals for analysis
    pub async fn upload_document(&self, document: DocumentUpload) -> ChatTurn {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let _in_flight = InFlight(&self.in_flight);

        let (label, activity) = if document.is_image() {
            (format!("Uploaded image: {}", document.file_name), "Uploaded an image report")
        } else {
            (format!("Uploaded document: {}", document.file_name), "Uploaded a PDF report")
        };
        self.conversation.append(ChatEntry::user(label));
        self.activity.record(activity).await;
        self.conversation.set_suspend();

        let size = document.bytes.len();
        match self.backend.upload_document(document, self.current_vitals()).await {
            Ok(reply) => {
                tracing::debug!(bytes = size, "document analysed");
                self.conversation.append(ChatEntry::bot(reply.response));
                ChatTurn::Answered
            }
            Err(e) => {
                tracing::warn!(error = %e, error_code = e.code(), "document upload failed");
                self.conversation.append(ChatEntry::bot(UPLOAD_FAILED));
                ChatTurn::Failed
            }
        }
    }

    /// Book the proposed appointment; purely local
    pub async fn confirm_appointment(&self, proposal: &AppointmentProposal) {
        let doctor = proposal.doctor_name.as_deref().unwrap_or(DEFAULT_DOCTOR);
        let specialty = proposal.specialty.as_deref().unwrap_or(DEFAULT_SPECIALTY);
        let hospital = &proposal.hospital;

        self.activity
            .record(format!(
                "Appointment booked with <b>{doctor}</b> ({specialty}) at {hospital}, time {APPOINTMENT_TIME}"
            ))
            .await;
        self.conversation.append_all([
            ChatEntry::user(format!("Confirmed appointment at {hospital}")),
            ChatEntry::bot(format!("Appointment booked!\n{doctor} at {APPOINTMENT_TIME}")),
        ]);
    }

    /// Most recent proposal in the transcript, if any
    pub fn pending_proposal(&self) -> Option<AppointmentProposal> {
        self.conversation.read_all().into_iter().rev().find_map(|entry| match entry {
            ChatEntry::Appointment(proposal) => Some(proposal),
            _ => None,
        })
    }
}

fn failure_text(err: &ClientError) -> &'static str {
    match err {
        ClientError::MalformedResponse(_) => UNREADABLE_RESPONSE,
        _ => SERVER_UNREACHABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DoctorInfo, MockBackendApi, UploadReply};
    use crate::conversation::GREETING;
    use crate::storage::MemoryStore;

    async fn assistant_with(backend: MockBackendApi) -> (Assistant, Arc<ConversationStore>, Arc<ActivityLog>) {
        let conversation = Arc::new(ConversationStore::new());
        let activity = Arc::new(ActivityLog::load(Arc::new(MemoryStore::new())).await);
        let (_tx, vitals) = watch::channel(VitalsSnapshot::default());
        let assistant = Assistant::new(
            Arc::clone(&conversation),
            Arc::clone(&activity),
            Arc::new(backend),
            vitals,
        );
        (assistant, conversation, activity)
    }

    fn reply(text: &str) -> ChatReply {
        ChatReply { response: text.to_string(), action: None, hospital: None, doctor: None }
    }

    #[tokio::test]
    async fn test_blank_message_is_ignored() {
        let mut backend = MockBackendApi::new();
        backend.expect_send_chat().never();
        let (assistant, conversation, _) = assistant_with(backend).await;

        assert_eq!(assistant.send_message("   ").await, ChatTurn::Ignored);
        assert_eq!(conversation.read_all().len(), 1);
        assert!(!conversation.is_suspended());
    }

    #[tokio::test]
    async fn test_send_appends_user_then_bot_and_suspends() {
        let mut backend = MockBackendApi::new();
        backend
            .expect_send_chat()
            .withf(|request| request.message == "I feel dizzy" && request.vitals == VitalsSnapshot::default())
            .returning(|_| Ok(reply("Please sit down and drink water.")));
        let (assistant, conversation, activity) = assistant_with(backend).await;

        assert_eq!(assistant.send_message("I feel dizzy").await, ChatTurn::Answered);
        assert!(conversation.is_suspended());
        assert_eq!(
            conversation.read_all(),
            vec![
                ChatEntry::bot(GREETING),
                ChatEntry::user("I feel dizzy"),
                ChatEntry::bot("Please sit down and drink water."),
            ]
        );
        assert!(activity.read_all().await.is_empty());
        assert!(!assistant.is_busy());
    }

    #[tokio::test]
    async fn test_appointment_reply_adds_proposal_and_activity() {
        let mut backend = MockBackendApi::new();
        backend.expect_send_chat().returning(|_| {
            Ok(ChatReply {
                response: "I can book that for you.".to_string(),
                action: Some("appointment".to_string()),
                hospital: None,
                doctor: Some(DoctorInfo { name: Some("Dr. Rhea Kapur".to_string()), specialty: None }),
            })
        });
        let (assistant, conversation, activity) = assistant_with(backend).await;

        assistant.send_message("book a cardiologist").await;

        let proposal = AppointmentProposal {
            hospital: DEFAULT_HOSPITAL.to_string(),
            doctor_name: Some("Dr. Rhea Kapur".to_string()),
            specialty: None,
        };
        let entries = conversation.read_all();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[2], ChatEntry::bot("I can book that for you."));
        assert_eq!(entries[3], ChatEntry::Appointment(proposal.clone()));
        assert_eq!(assistant.pending_proposal(), Some(proposal));
        assert_eq!(
            activity.read_all().await[0].label,
            "Started appointment booking at CityCare Hospital"
        );
    }

    #[tokio::test]
    async fn test_network_and_malformed_failures_become_bot_entries() {
        let mut backend = MockBackendApi::new();
        let mut calls = 0;
        backend.expect_send_chat().returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(ClientError::Network("connection refused".to_string()))
            } else {
                Err(ClientError::MalformedResponse("expected value at line 1".to_string()))
            }
        });
        let (assistant, conversation, _) = assistant_with(backend).await;

        assert_eq!(assistant.send_message("hello").await, ChatTurn::Failed);
        assert_eq!(conversation.last(), Some(ChatEntry::bot(SERVER_UNREACHABLE)));

        assert_eq!(assistant.send_message("hello again").await, ChatTurn::Failed);
        assert_eq!(conversation.last(), Some(ChatEntry::bot(UNREADABLE_RESPONSE)));
        assert_eq!(conversation.read_all().len(), 5);
    }

    #[tokio::test]
    async fn test_second_send_while_in_flight_is_ignored() {
        let mut backend = MockBackendApi::new();
        backend.expect_send_chat().times(1).returning(|_| Ok(reply("ok")));
        let (assistant, conversation, _) = assistant_with(backend).await;

        let _held = {
            assistant.in_flight.fetch_add(1, Ordering::SeqCst);
            InFlight(&assistant.in_flight)
        };
        assert_eq!(assistant.send_message("are you there?").await, ChatTurn::Ignored);
        assert_eq!(conversation.read_all().len(), 1);

        drop(_held);
        assert_eq!(assistant.send_message("are you there?").await, ChatTurn::Answered);
    }

    #[tokio::test]
    async fn test_upload_image_and_pdf_labels() {
        let mut backend = MockBackendApi::new();
        let mut calls = 0;
        backend.expect_upload_document().returning(move |document, _| {
            calls += 1;
            if calls == 1 {
                Ok(UploadReply { response: format!("Read {}", document.file_name) })
            } else {
                Err(ClientError::BadStatus { status: 500, body: String::new() })
            }
        });
        let (assistant, conversation, activity) = assistant_with(backend).await;

        let scan = DocumentUpload::new("xray.png", "image/png", vec![0x89, 0x50]);
        assert_eq!(assistant.upload_document(scan).await, ChatTurn::Answered);
        let report = DocumentUpload::new("labs.pdf", "application/pdf", b"%PDF".to_vec());
        assert_eq!(assistant.upload_document(report).await, ChatTurn::Failed);

        assert!(conversation.is_suspended());
        assert_eq!(
            conversation.read_all()[1..],
            [
                ChatEntry::user("Uploaded image: xray.png"),
                ChatEntry::bot("Read xray.png"),
                ChatEntry::user("Uploaded document: labs.pdf"),
                ChatEntry::bot(UPLOAD_FAILED),
            ]
        );
        let labels: Vec<_> = activity.read_all().await.into_iter().map(|r| r.label).collect();
        assert_eq!(labels, ["Uploaded a PDF report", "Uploaded an image report"]);
    }

    #[tokio::test]
    async fn test_confirm_appointment_uses_defaults() {
        let (assistant, conversation, activity) = assistant_with(MockBackendApi::new()).await;
        let proposal = AppointmentProposal {
            hospital: "Apollo".to_string(),
            doctor_name: None,
            specialty: None,
        };

        assistant.confirm_appointment(&proposal).await;

        assert_eq!(
            activity.read_all().await[0].label,
            "Appointment booked with <b>Dr. Meera Desai</b> (General Physician) at Apollo, time 5pm"
        );
        assert_eq!(
            conversation.read_all()[1..],
            [
                ChatEntry::user("Confirmed appointment at Apollo"),
                ChatEntry::bot("Appointment booked!\nDr. Meera Desai at 5pm"),
            ]
        );
    }

    #[tokio::test]
    async fn test_typing_latches_suspend() {
        let (assistant, conversation, _) = assistant_with(MockBackendApi::new()).await;
        assistant.note_typing();
        assert!(conversation.is_suspended());
    }
}
