use serde::{Deserialize, Serialize};

use crate::domain::Message;

pub const UPLOAD_PDF_PATH: &str = "/upload-pdf";
pub const CHAT_PATH: &str = "/chat";
pub const HEALTH_PATH: &str = "/";
/// Multipart field carrying the raw PDF bytes.
pub const UPLOAD_FILE_FIELD: &str = "file";
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadPdfResponse {
    pub filename: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub document_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl HealthResponse {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}
