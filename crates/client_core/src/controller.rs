//! Drives a [`SessionState`] against an [`AnalysisBackend`] in straight-line async code.

use tracing::info;

use crate::{
    backend::AnalysisBackend,
    candidate::PdfCandidate,
    error::BackendError,
    session::{SessionState, UploadBatch},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub attempted: usize,
    pub loaded: usize,
}

pub struct ConversationController<B: AnalysisBackend> {
    backend: B,
    state: SessionState,
}

impl<B: AnalysisBackend> ConversationController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: SessionState::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Sets the input buffer and submits it. See [`ConversationController::submit`].
    pub async fn send(&mut self, text: impl Into<String>) -> bool {
        self.state.set_input(text);
        self.submit().await
    }

    /// Submits the current input. Returns `false` when the submit was a no-op.
    pub async fn submit(&mut self) -> bool {
        let Some(request) = self.state.begin_chat() else {
            return false;
        };
        let outcome = self
            .backend
            .chat(&request)
            .await
            .map(|response| response.reply);
        self.state.finish_chat(outcome);
        true
    }

    /// Multi-file upload: non-PDF files are skipped silently.
    pub async fn upload_files(
        &mut self,
        files: impl IntoIterator<Item = PdfCandidate>,
    ) -> UploadSummary {
        match self.state.begin_upload_batch(files) {
            Some(batch) => self.run_batch(batch).await,
            None => UploadSummary::default(),
        }
    }

    /// Single-file upload: a non-PDF file raises an alert and nothing is sent.
    pub async fn upload_file(&mut self, file: PdfCandidate) -> UploadSummary {
        match self.state.begin_single_upload(file) {
            Some(batch) => self.run_batch(batch).await,
            None => UploadSummary::default(),
        }
    }

    pub fn remove_document(&mut self, index: usize) -> bool {
        self.state.remove_document(index).is_some()
    }

    async fn run_batch(&mut self, batch: UploadBatch) -> UploadSummary {
        let mut summary = UploadSummary::default();
        for file in batch {
            summary.attempted += 1;
            let outcome = upload_one(&self.backend, &file).await;
            if outcome.is_ok() {
                summary.loaded += 1;
            }
            self.state.record_upload(&file.file_name, outcome);
        }
        self.state.finish_upload_batch();
        info!(
            attempted = summary.attempted,
            loaded = summary.loaded,
            "upload batch complete"
        );
        summary
    }
}

/// Reads a candidate's bytes and uploads them. Read failures count as upload failures.
pub async fn upload_one<B: AnalysisBackend + ?Sized>(
    backend: &B,
    file: &PdfCandidate,
) -> Result<shared::protocol::UploadPdfResponse, BackendError> {
    let bytes = file.read_bytes().await?;
    backend.upload_pdf(&file.file_name, bytes).await
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
