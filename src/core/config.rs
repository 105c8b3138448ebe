//! Client configuration: explicit values layered over a TOML file and
//! `PROMPTMGR_*` environment variables.

use crate::api::{ModelSettings, PromptError};
use crate::core::logging::Redacted;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

pub const ENV_URL: &str = "PROMPTMGR_URL";
pub const ENV_SECRET_KEY: &str = "PROMPTMGR_SECRET_KEY";
pub const ENV_ENVIRONMENT: &str = "PROMPTMGR_ENVIRONMENT";
pub const ENV_PROJECT_ID: &str = "PROMPTMGR_PROJECT_ID";
pub const ENV_CONFIG_PATH: &str = "PROMPTMGR_CONFIG";

/// Settings used to construct a [`PromptManager`](crate::api::PromptManager).
#[derive(Clone, Default, Deserialize)]
pub struct ClientConfig {
    pub base_url: Option<String>,
    pub secret_key: Option<String>,
    pub environment: Option<String>,
    pub project_id: Option<String>,
    #[serde(default)]
    pub model_settings: ModelSettings,
    pub timeout_secs: Option<u64>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("secret_key", &self.secret_key.as_deref().map(Redacted))
            .field("environment", &self.environment)
            .field("project_id", &self.project_id)
            .field("model_settings", &self.model_settings)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn secret_key(mut self, key: impl Into<String>) -> Self {
        self.secret_key = Some(key.into());
        self
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn model_settings(mut self, settings: ModelSettings) -> Self {
        self.model_settings = settings;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Reads `PROMPTMGR_*` variables, loading a `.env` file first if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            base_url: get(ENV_URL),
            secret_key: get(ENV_SECRET_KEY),
            environment: get(ENV_ENVIRONMENT),
            project_id: get(ENV_PROJECT_ID),
            ..Self::default()
        }
    }

    /// Parses a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, PromptError> {
        let content = fs::read_to_string(path).map_err(|e| {
            PromptError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            PromptError::config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Fills every unset field of `self` from `fallback`.
    pub fn or(self, fallback: ClientConfig) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.or(fallback.base_url),
            secret_key: self.secret_key.or(fallback.secret_key),
            environment: self.environment.or(fallback.environment),
            project_id: self.project_id.or(fallback.project_id),
            model_settings: fallback.model_settings.merged_with(Some(&self.model_settings)),
            timeout_secs: self.timeout_secs.or(fallback.timeout_secs),
        }
    }

    /// Layers `self` over the environment.
    pub fn with_env_defaults(self) -> ClientConfig {
        self.or(Self::from_env())
    }

    /// Returns `(base_url, secret_key)` or the first missing one as an error.
    pub(crate) fn endpoint(&self) -> Result<(String, String), PromptError> {
        let base_url = self
            .base_url
            .as_deref()
            .map(|u| u.trim().trim_end_matches('/'))
            .filter(|u| !u.is_empty())
            .ok_or_else(|| PromptError::config("Base URL is required"))?;
        let secret_key = self
            .secret_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| PromptError::config("Secret key is required"))?;
        Ok((base_url.to_string(), secret_key.to_string()))
    }
}

/// Loads the layered config for the CLI: flags, then file, then environment.
pub fn load_config(explicit: ClientConfig, path: Option<&Path>) -> Result<ClientConfig, PromptError> {
    let env_path = env::var(ENV_CONFIG_PATH).ok();
    let path = path.or(env_path.as_deref().map(Path::new));
    layer_config(explicit, path, ClientConfig::from_env())
}

/// Field by field: `explicit`, then the file at `path`, then `ambient`.
pub fn layer_config(
    explicit: ClientConfig,
    path: Option<&Path>,
    ambient: ClientConfig,
) -> Result<ClientConfig, PromptError> {
    let file = match path {
        Some(p) => ClientConfig::from_file(p)?,
        None => ClientConfig::default(),
    };
    Ok(explicit.or(file).or(ambient))
}
