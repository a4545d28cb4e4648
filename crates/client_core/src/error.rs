use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        source: reqwest::Error,
    },
    #[error("{endpoint} returned {status}: {detail}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        detail: String,
    },
    #[error("malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        source: serde_json::Error,
    },
    #[error("analysis backend is unavailable")]
    Unavailable,
}

impl BackendError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, BackendError::Transport { source, .. } if source.is_timeout())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid server url '{url}': {source}")]
    InvalidServerUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("server url '{0}' must use http or https")]
    UnsupportedScheme(String),
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
