//! Client configuration and credential store factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use examdesk_core::parser::DEFAULT_QUESTION_LABEL;
use examdesk_core::traits::CredentialStore;

use crate::session::DEFAULT_MAX_AUTH_RETRIES;
use crate::store::{FileCredentialStore, MemoryCredentialStore};

/// Environment variable overriding `base_url`.
pub const BASE_URL_ENV: &str = "EXAMDESK_BASE_URL";

/// Top-level examdesk configuration.
///
/// `Debug` prints `refresh_token` as `***`.
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend root, e.g. `http://localhost:3001/`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Refreshes allowed per request chain before a denial is surfaced.
    #[serde(default = "default_max_auth_retries")]
    pub max_auth_retries: u32,
    /// Where the refresh credential is persisted.
    #[serde(default)]
    pub credential_path: Option<PathBuf>,
    /// Label word that introduces a question block.
    #[serde(default = "default_question_label")]
    pub question_label: String,
    /// A refresh credential to use instead of the persisted one. When set,
    /// nothing is written to disk.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_auth_retries", &self.max_auth_retries)
            .field("credential_path", &self.credential_path)
            .field("question_label", &self.question_label)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .finish()
    }
}

fn default_base_url() -> String {
    "http://localhost:3001/".to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_max_auth_retries() -> u32 {
    DEFAULT_MAX_AUTH_RETRIES
}
fn default_question_label() -> String {
    DEFAULT_QUESTION_LABEL.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            max_auth_retries: default_max_auth_retries(),
            credential_path: None,
            question_label: default_question_label(),
            refresh_token: None,
        }
    }
}

impl ClientConfig {
    /// Credential file location, falling back to the per-user config dir.
    pub fn credential_path(&self) -> PathBuf {
        self.credential_path.clone().unwrap_or_else(|| {
            dirs_path()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("credentials.json")
        })
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `examdesk.toml` in the current directory
/// 2. `~/.config/examdesk/config.toml`
///
/// Environment variable override: `EXAMDESK_BASE_URL`.
pub fn load_config() -> Result<ClientConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ClientConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("examdesk.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ClientConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ClientConfig::default(),
    };

    if let Ok(url) = std::env::var(BASE_URL_ENV) {
        config.base_url = url;
    }

    config.base_url = resolve_env_vars(&config.base_url);
    config.credential_path = config
        .credential_path
        .as_ref()
        .map(|p| PathBuf::from(resolve_env_vars(&p.to_string_lossy())));
    config.refresh_token = config
        .refresh_token
        .as_deref()
        .map(resolve_env_vars)
        .filter(|t| !t.is_empty());

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("examdesk"))
}

/// Create the credential store the configuration asks for.
pub fn create_credential_store(config: &ClientConfig) -> Arc<dyn CredentialStore> {
    match &config.refresh_token {
        Some(token) => Arc::new(MemoryCredentialStore::with_token(token)),
        None => Arc::new(FileCredentialStore::new(config.credential_path())),
    }
}
