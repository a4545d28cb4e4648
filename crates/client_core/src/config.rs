use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const CONFIG_FILE_NAME: &str = "doc_chat.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    /// Zero disables the timeout and lets requests wait indefinitely.
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    server_url: Option<String>,
    request_timeout_secs: Option<u64>,
}

impl Settings {
    pub fn server_url(&self) -> Result<Url, ConfigError> {
        let raw = self.server_url.trim();
        let url = Url::parse(raw).map_err(|source| ConfigError::InvalidServerUrl {
            url: raw.to_string(),
            source,
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(raw.to_string()));
        }
        Ok(url)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// Applies command-line overrides, which take precedence over file and environment.
    pub fn apply_overrides(&mut self, server_url: Option<String>, timeout_secs: Option<u64>) {
        if let Some(v) = server_url {
            self.server_url = v;
        }
        if let Some(v) = timeout_secs {
            self.request_timeout_secs = v;
        }
    }

    fn apply_file(&mut self, file: FileSettings) {
        if let Some(v) = file.server_url {
            self.server_url = v;
        }
        if let Some(v) = file.request_timeout_secs {
            self.request_timeout_secs = v;
        }
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("DOC_CHAT_SERVER_URL") {
            self.server_url = v;
        }
        if let Some(v) = lookup("APP__SERVER_URL") {
            self.server_url = v;
        }

        if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
            match v.trim().parse::<u64>() {
                Ok(parsed) => self.request_timeout_secs = parsed,
                Err(err) => {
                    tracing::warn!(value = %v, "ignoring invalid APP__REQUEST_TIMEOUT_SECS: {err}")
                }
            }
        }
    }
}

/// Loads settings: defaults, then the config file, then environment variables.
///
/// With no explicit path, `doc_chat.toml` in the working directory is used if present,
/// falling back to `<config dir>/doc_chat/doc_chat.toml`. A missing default file is not an
/// error; a missing explicit file is.
pub fn load_settings(explicit_path: Option<&Path>) -> Result<Settings, ConfigError> {
    let path = match explicit_path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path(),
    };
    load_settings_with(path.as_deref(), |name| std::env::var(name).ok())
}

fn load_settings_with(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();

    if let Some(path) = path {
        settings.apply_file(read_file_settings(path)?);
        tracing::debug!(path = %path.display(), "loaded config file");
    }
    settings.apply_env(env);

    settings.server_url()?;
    Ok(settings)
}

fn read_file_settings(path: &Path) -> Result<FileSettings, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    let user = dirs::config_dir()?.join("doc_chat").join(CONFIG_FILE_NAME);
    user.is_file().then_some(user)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
