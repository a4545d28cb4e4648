//! Applies backend events to the UI-owned session state.

use client_core::SessionState;

use crate::controller::events::{UiErrorContext, UiEvent};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BackendHealth {
    #[default]
    Unknown,
    Ready(String),
    Unreachable,
}

#[derive(Debug, Default)]
pub struct StatusState {
    pub status: String,
    pub health: BackendHealth,
}

pub fn apply_ui_event(session: &mut SessionState, status: &mut StatusState, event: UiEvent) {
    match event {
        UiEvent::Info(text) => status.status = text,
        UiEvent::UploadResolved { file_name, outcome } => {
            session.record_upload(&file_name, outcome);
        }
        UiEvent::UploadBatchFinished => {
            session.finish_upload_batch();
            status.status = format!("{} document(s) in context", session.documents().len());
        }
        UiEvent::ChatResolved(outcome) => session.finish_chat(outcome),
        UiEvent::Health(health) => {
            status.health = if health.is_ok() {
                BackendHealth::Ready(health.message)
            } else {
                BackendHealth::Unreachable
            };
        }
        UiEvent::Error(err) => {
            tracing::warn!(context = ?err.context(), category = ?err.category(), "{}", err.message());
            if err.context() == UiErrorContext::Health {
                status.health = BackendHealth::Unreachable;
            }
            status.status = err.status_text();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use client_core::{BackendError, PdfCandidate};
    use shared::{
        domain::Message,
        protocol::{HealthResponse, UploadPdfResponse},
    };

    use crate::controller::events::UiError;

    fn pdf(name: &str) -> PdfCandidate {
        PdfCandidate::from_bytes(name, Some("application/pdf".into()), b"%PDF".to_vec())
    }

    #[test]
    fn upload_events_fill_context_and_release_flag_at_batch_end() {
        let mut session = SessionState::new();
        let mut status = StatusState::default();
        session
            .begin_upload_batch(vec![pdf("a.pdf"), pdf("b.pdf")])
            .expect("batch");

        apply_ui_event(
            &mut session,
            &mut status,
            UiEvent::UploadResolved {
                file_name: "a.pdf".into(),
                outcome: Ok(UploadPdfResponse {
                    filename: "a.pdf".into(),
                    text: "alpha".into(),
                    warning: None,
                }),
            },
        );
        apply_ui_event(
            &mut session,
            &mut status,
            UiEvent::UploadResolved {
                file_name: "b.pdf".into(),
                outcome: Err(BackendError::Unavailable),
            },
        );
        assert!(session.is_awaiting());

        apply_ui_event(&mut session, &mut status, UiEvent::UploadBatchFinished);
        assert!(!session.is_awaiting());
        assert_eq!(session.combined_context(), "alpha");
        assert_eq!(session.take_alerts().len(), 1);
        assert_eq!(status.status, "1 document(s) in context");
    }

    #[test]
    fn chat_resolution_appends_reply() {
        let mut session = SessionState::new();
        let mut status = StatusState::default();
        session.set_input("hi");
        session.begin_chat().expect("turn");

        apply_ui_event(&mut session, &mut status, UiEvent::ChatResolved(Ok("hello".into())));

        assert!(!session.is_awaiting());
        assert_eq!(session.messages().last(), Some(&Message::assistant("hello")));
    }

    #[test]
    fn health_events_update_link_state() {
        let mut session = SessionState::new();
        let mut status = StatusState::default();

        apply_ui_event(
            &mut session,
            &mut status,
            UiEvent::Health(HealthResponse {
                status: "ok".into(),
                message: "ready".into(),
            }),
        );
        assert_eq!(status.health, BackendHealth::Ready("ready".into()));

        apply_ui_event(
            &mut session,
            &mut status,
            UiEvent::Error(UiError::from_message(
                UiErrorContext::Health,
                "request to / failed: connection refused",
            )),
        );
        assert_eq!(status.health, BackendHealth::Unreachable);
        assert!(status.status.contains("unreachable"));
        assert!(session.messages().is_empty());
    }
}
