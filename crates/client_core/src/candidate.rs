//! Files offered for upload, before any media-type filtering.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use shared::protocol::PDF_MEDIA_TYPE;

use crate::error::BackendError;

#[derive(Debug, Clone)]
pub enum FileSource {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

/// A file picked or dropped by the user, with the media type the platform declared for it.
#[derive(Debug, Clone)]
pub struct PdfCandidate {
    pub file_name: String,
    pub media_type: Option<String>,
    pub source: FileSource,
}

impl PdfCandidate {
    /// Builds a candidate from a path, declaring the media type from the file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let media_type = mime_guess::from_path(path)
            .first_raw()
            .map(ToOwned::to_owned);
        Self {
            file_name,
            media_type,
            source: FileSource::Path(path.to_path_buf()),
        }
    }

    pub fn from_bytes(
        file_name: impl Into<String>,
        media_type: Option<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type,
            source: FileSource::Bytes(bytes.into()),
        }
    }

    /// Exact match on the declared media type; file contents are not sniffed.
    pub fn is_pdf(&self) -> bool {
        self.media_type.as_deref() == Some(PDF_MEDIA_TYPE)
    }

    pub async fn read_bytes(&self) -> Result<Vec<u8>, BackendError> {
        match &self.source {
            FileSource::Bytes(bytes) => Ok(bytes.to_vec()),
            FileSource::Path(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|source| BackendError::Io {
                        path: path.clone(),
                        source,
                    })
            }
        }
    }
}
