//! Backend commands queued from UI to backend worker.

use client_core::UploadBatch;
use shared::protocol::ChatRequest;

pub enum BackendCommand {
    /// Upload every file of the batch in order, one request at a time.
    UploadBatch { batch: UploadBatch },
    Chat { request: ChatRequest },
    CheckHealth,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::UploadBatch { .. } => "upload_batch",
            BackendCommand::Chat { .. } => "chat",
            BackendCommand::CheckHealth => "check_health",
        }
    }
}
