//! Backend-to-UI events and error modeling for desktop GUI controller.

use client_core::BackendError;
use shared::protocol::{HealthResponse, UploadPdfResponse};

pub enum UiEvent {
    Info(String),
    UploadResolved {
        file_name: String,
        outcome: Result<UploadPdfResponse, BackendError>,
    },
    UploadBatchFinished,
    ChatResolved(Result<String, BackendError>),
    Health(HealthResponse),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    CommandQueue,
    Health,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("invalid")
            || message_lower.contains("malformed")
            || message_lower.contains("must be")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("request to")
            || message_lower.contains("unavailable")
            || message_lower.contains("disconnected")
            || message_lower.contains("queue is full")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Short status-bar text for the error.
    pub fn status_text(&self) -> String {
        match (self.context, self.category) {
            (UiErrorContext::Health, UiErrorCategory::Transport) => {
                "Analysis service unreachable; check the server URL and that the backend is running."
                    .to_string()
            }
            (UiErrorContext::BackendStartup, _) => {
                format!("Backend worker failed to start: {}", self.message)
            }
            _ => self.message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_unreachable_service_as_transport() {
        let err = UiError::from_message(
            UiErrorContext::Health,
            "request to / failed: error sending request: connection refused",
        );
        assert_eq!(err.category(), UiErrorCategory::Transport);
        assert!(err.status_text().contains("unreachable"));
    }

    #[test]
    fn classifies_bad_responses_as_validation() {
        let err = UiError::from_message(
            UiErrorContext::Health,
            "malformed response from /: expected value at line 1 column 1",
        );
        assert_eq!(err.category(), UiErrorCategory::Validation);
        assert_eq!(err.status_text(), err.message());
    }

    #[test]
    fn startup_failures_keep_their_detail() {
        let err = UiError::from_message(UiErrorContext::BackendStartup, "no threads left");
        assert_eq!(err.category(), UiErrorCategory::Unknown);
        assert!(err.status_text().ends_with("no threads left"));
    }
}
