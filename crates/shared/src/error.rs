use serde::{Deserialize, Serialize};

/// Error body returned by the analysis service, `{ "detail": "..." }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    /// Pulls `detail` out of a raw error body, falling back to the trimmed body itself.
    pub fn detail_from_raw(raw: &str) -> String {
        match serde_json::from_str::<ErrorBody>(raw) {
            Ok(body) => body.detail,
            Err(_) => raw.trim().to_string(),
        }
    }
}
