//! Session state: transcript, document context, input buffer and the `awaiting` flag.
//!
//! Every network operation is split into a local commit (`begin_*`) that returns the work
//! to perform, and a resolution step (`record_upload`, `finish_*`) that applies the outcome.
//! The owner performs the I/O in between, so the state itself never blocks and can live on a
//! UI thread while requests run elsewhere.

use shared::{
    domain::{Document, Message},
    protocol::{ChatRequest, UploadPdfResponse},
};
use tracing::{debug, info, warn};

use crate::{candidate::PdfCandidate, documents::DocumentStore, error::BackendError};

pub const UNSUPPORTED_FILE_ALERT: &str = "Error: Only PDF files are supported.";
pub const CHAT_FAILURE_MESSAGE: &str = "Error: Could not reach the AI. Check your backend terminal.";

pub fn loaded_announcement(file_name: &str) -> String {
    format!("System: Successfully loaded \"{file_name}\". You can now ask questions about it.")
}

pub fn upload_failure_alert(file_name: &str) -> String {
    format!("Failed to upload \"{file_name}\". Is the analysis backend running?")
}

pub fn upload_warning_message(file_name: &str, warning: &str) -> String {
    format!("System: Warning for \"{file_name}\": {warning}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    UnsupportedFile,
    UploadFailed,
}

/// A blocking, user-facing notice. Alerts are queued until the UI takes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

impl Alert {
    fn new(kind: AlertKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Accepted files of one upload action, to be sent one at a time in order.
#[derive(Debug, Clone)]
pub struct UploadBatch {
    files: Vec<PdfCandidate>,
}

impl UploadBatch {
    pub fn files(&self) -> &[PdfCandidate] {
        &self.files
    }
}

impl IntoIterator for UploadBatch {
    type Item = PdfCandidate;
    type IntoIter = std::vec::IntoIter<PdfCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

#[derive(Debug, Default)]
pub struct SessionState {
    messages: Vec<Message>,
    documents: DocumentStore,
    awaiting: bool,
    input: String,
    alerts: Vec<Alert>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn documents(&self) -> &[Document] {
        self.documents.documents()
    }

    pub fn combined_context(&self) -> String {
        self.documents.combined_context()
    }

    pub fn is_awaiting(&self) -> bool {
        self.awaiting
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Mutable access to the input buffer for text widgets that edit in place.
    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    pub fn can_submit(&self) -> bool {
        !self.awaiting && !self.input.trim().is_empty()
    }

    pub fn remove_document(&mut self, index: usize) -> Option<Document> {
        let removed = self.documents.remove_document(index)?;
        info!(
            file = %removed.name,
            documents = self.documents.len(),
            "removed document from context"
        );
        Some(removed)
    }

    pub fn take_alerts(&mut self) -> Vec<Alert> {
        std::mem::take(&mut self.alerts)
    }

    pub fn pending_alerts(&self) -> &[Alert] {
        &self.alerts
    }

    /// Commits a chat turn locally and returns the request to dispatch.
    ///
    /// Returns `None` (and leaves the state untouched) when the trimmed input is empty or
    /// another operation is outstanding. On `Some`, the input buffer has been cleared, the
    /// user message appended and `awaiting` set; the caller must pass the outcome to
    /// [`SessionState::finish_chat`].
    pub fn begin_chat(&mut self) -> Option<ChatRequest> {
        if self.input.trim().is_empty() {
            return None;
        }
        if self.awaiting {
            debug!("dropping chat submit while a request is outstanding");
            return None;
        }

        let text = std::mem::take(&mut self.input);
        self.messages.push(Message::user(text));
        self.awaiting = true;

        let request = ChatRequest {
            messages: self.messages.clone(),
            document_text: self.documents.combined_context(),
        };
        debug!(
            messages = request.messages.len(),
            documents = self.documents.len(),
            "dispatching chat turn"
        );
        Some(request)
    }

    pub fn finish_chat(&mut self, outcome: Result<String, BackendError>) {
        match outcome {
            Ok(reply) => self.messages.push(Message::assistant(reply)),
            Err(err) => {
                warn!(timeout = err.is_timeout(), "chat request failed: {err}");
                self.messages.push(Message::system(CHAT_FAILURE_MESSAGE));
            }
        }
        self.awaiting = false;
    }

    /// Single-file upload: a non-PDF file rejects the action with an alert.
    pub fn begin_single_upload(&mut self, file: PdfCandidate) -> Option<UploadBatch> {
        if !file.is_pdf() {
            info!(
                file = %file.file_name,
                media_type = file.media_type.as_deref().unwrap_or("unknown"),
                "rejecting non-pdf upload"
            );
            self.alerts
                .push(Alert::new(AlertKind::UnsupportedFile, UNSUPPORTED_FILE_ALERT));
            return None;
        }
        self.start_batch(vec![file])
    }

    /// Multi-file upload: non-PDF files are skipped without any notice.
    pub fn begin_upload_batch(
        &mut self,
        files: impl IntoIterator<Item = PdfCandidate>,
    ) -> Option<UploadBatch> {
        let accepted: Vec<_> = files
            .into_iter()
            .filter(|file| {
                let pdf = file.is_pdf();
                if !pdf {
                    debug!(file = %file.file_name, "skipping non-pdf file in batch");
                }
                pdf
            })
            .collect();

        if accepted.is_empty() {
            return None;
        }
        self.start_batch(accepted)
    }

    fn start_batch(&mut self, files: Vec<PdfCandidate>) -> Option<UploadBatch> {
        if self.awaiting {
            warn!(
                files = files.len(),
                "dropping upload while another operation is outstanding"
            );
            return None;
        }
        self.awaiting = true;
        info!(files = files.len(), "starting upload batch");
        Some(UploadBatch { files })
    }

    /// Applies the outcome of one upload in the current batch.
    pub fn record_upload(
        &mut self,
        file_name: &str,
        outcome: Result<UploadPdfResponse, BackendError>,
    ) {
        match outcome {
            Ok(uploaded) => {
                info!(
                    file = %uploaded.filename,
                    text_chars = uploaded.text.len(),
                    "document loaded"
                );
                self.messages
                    .push(Message::system(loaded_announcement(&uploaded.filename)));
                if let Some(warning) = uploaded.warning.as_deref() {
                    self.messages.push(Message::system(upload_warning_message(
                        &uploaded.filename,
                        warning,
                    )));
                }
                self.documents.add_document(uploaded.filename, uploaded.text);
            }
            Err(err) => {
                warn!(file = file_name, "upload failed: {err}");
                self.alerts.push(Alert::new(
                    AlertKind::UploadFailed,
                    upload_failure_alert(file_name),
                ));
            }
        }
    }

    pub fn finish_upload_batch(&mut self) {
        self.awaiting = false;
        debug!(documents = self.documents.len(), "upload batch finished");
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
