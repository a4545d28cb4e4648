//! HTTP access to the document analysis service.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, ClientBuilder, Response,
};
use serde::de::DeserializeOwned;
use shared::{
    error::ErrorBody,
    protocol::{
        ChatRequest, ChatResponse, HealthResponse, UploadPdfResponse, CHAT_PATH, HEALTH_PATH,
        PDF_MEDIA_TYPE, UPLOAD_FILE_FIELD, UPLOAD_PDF_PATH,
    },
};
use tracing::{debug, warn};
use url::Url;

use crate::{
    config::Settings,
    error::{BackendError, ConfigError},
};

#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn upload_pdf(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadPdfResponse, BackendError>;
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError>;
    async fn health(&self) -> Result<HealthResponse, BackendError>;
}

#[async_trait]
impl<T> AnalysisBackend for Arc<T>
where
    T: AnalysisBackend + ?Sized,
{
    async fn upload_pdf(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadPdfResponse, BackendError> {
        (**self).upload_pdf(file_name, bytes).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        (**self).chat(request).await
    }

    async fn health(&self) -> Result<HealthResponse, BackendError> {
        (**self).health().await
    }
}

#[derive(Debug, Clone)]
pub struct HttpAnalysisBackend {
    http: Client,
    base_url: Url,
}

impl HttpAnalysisBackend {
    pub fn with_client(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Self::from_settings_with(settings, Client::builder())
    }

    pub(crate) fn from_settings_with(
        settings: &Settings,
        mut builder: ClientBuilder,
    ) -> Result<Self, ConfigError> {
        let base_url = settings.server_url()?;
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, base_url))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    async fn read_json<T: DeserializeOwned>(
        endpoint: &'static str,
        response: Response,
    ) -> Result<T, BackendError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| BackendError::Transport { endpoint, source })?;

        if !status.is_success() {
            let detail = ErrorBody::detail_from_raw(&body);
            warn!(endpoint, %status, %detail, "analysis service rejected request");
            return Err(BackendError::Status {
                endpoint,
                status,
                detail,
            });
        }

        serde_json::from_str(&body).map_err(|source| BackendError::Decode { endpoint, source })
    }
}

#[async_trait]
impl AnalysisBackend for HttpAnalysisBackend {
    async fn upload_pdf(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadPdfResponse, BackendError> {
        let endpoint = UPLOAD_PDF_PATH;
        debug!(file = file_name, bytes = bytes.len(), "uploading pdf");
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(PDF_MEDIA_TYPE)
            .map_err(|source| BackendError::Transport { endpoint, source })?;
        let form = Form::new().part(UPLOAD_FILE_FIELD, part);

        let response = self
            .http
            .post(self.endpoint(endpoint))
            .multipart(form)
            .send()
            .await
            .map_err(|source| BackendError::Transport { endpoint, source })?;
        Self::read_json(endpoint, response).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        let endpoint = CHAT_PATH;
        debug!(
            messages = request.messages.len(),
            context_chars = request.document_text.len(),
            "sending chat request"
        );
        let response = self
            .http
            .post(self.endpoint(endpoint))
            .json(request)
            .send()
            .await
            .map_err(|source| BackendError::Transport { endpoint, source })?;
        Self::read_json(endpoint, response).await
    }

    async fn health(&self) -> Result<HealthResponse, BackendError> {
        let endpoint = HEALTH_PATH;
        let response = self
            .http
            .get(self.endpoint(endpoint))
            .send()
            .await
            .map_err(|source| BackendError::Transport { endpoint, source })?;
        Self::read_json(endpoint, response).await
    }
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
