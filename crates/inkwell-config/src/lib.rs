//! Multi-tier TOML configuration for Inkwell.
//!
//! Reads configuration from multiple sources with precedence:
//! CLI flags > env vars > config file > defaults

use inkwell_types::provider::{BoxFuture, SecretResolver};
use inkwell_types::request::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use inkwell_types::wire::DEFAULT_ENDPOINT_URL;
use inkwell_types::{ConfigError, GenerationOptions, ModelId, WireFormat, default_model};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: &[&str] = &["INKWELL_API_KEY", "GEMINI_API_KEY"];

/// Resolved configuration for an Inkwell process.
#[derive(Debug, Clone)]
pub struct InkwellConfig {
    pub model: ModelId,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
    pub endpoint_url: String,
    pub wire: WireFormat,
    pub config_dir: PathBuf,
    api_key_override: Option<String>,
}

/// Settings that can be read from a TOML config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub wire: WireFormat,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiSettings {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub stream: Option<bool>,
    pub endpoint_url: Option<String>,
}

/// CLI overrides that take highest precedence.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub stream: Option<bool>,
}

impl InkwellConfig {
    /// Load configuration from the config directory and the process environment.
    ///
    /// The API key is not required here; a missing key is reported when a
    /// request is made.
    pub fn load(overrides: CliOverrides) -> Self {
        Self::load_from(config_dir(), overrides, |key| std::env::var(key).ok())
    }

    /// Load configuration from `config_dir`, reading env vars through `env`.
    pub fn load_from(
        config_dir: PathBuf,
        overrides: CliOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let env = |key: &str| env(key).and_then(non_blank);
        let settings = read_settings(&config_dir.join("config.toml"))
            .unwrap_or_else(|e| {
                tracing::warn!("{e}");
                None
            })
            .unwrap_or_default();

        let model = overrides
            .model
            .or_else(|| env("INKWELL_MODEL"))
            .or(settings.api.model.and_then(non_blank))
            .map(ModelId::from)
            .unwrap_or_else(default_model);

        let temperature = overrides
            .temperature
            .or(settings.api.temperature)
            .unwrap_or(DEFAULT_TEMPERATURE);

        let max_tokens = overrides
            .max_tokens
            .or(settings.api.max_tokens)
            .unwrap_or(DEFAULT_MAX_TOKENS);

        let stream = overrides.stream.or(settings.api.stream).unwrap_or(false);

        let endpoint_url = env("INKWELL_ENDPOINT_URL")
            .or(settings.api.endpoint_url.and_then(non_blank))
            .unwrap_or_else(|| DEFAULT_ENDPOINT_URL.to_string());

        InkwellConfig {
            model,
            temperature,
            max_tokens,
            stream,
            endpoint_url,
            wire: settings.wire,
            config_dir,
            api_key_override: overrides.api_key.and_then(non_blank),
        }
    }

    /// Options for a request built from this configuration.
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            model: Some(self.model.clone()),
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            stream: Some(self.stream),
        }
    }

    /// The API key source matching this configuration.
    pub fn secret_resolver(&self) -> ConfigSecretResolver {
        ConfigSecretResolver {
            override_key: self.api_key_override.clone(),
            settings_path: self.config_dir.join("config.toml"),
        }
    }
}

/// Resolves the API key from a CLI override, the environment, or the config file.
///
/// Sources are re-read on every call so a key added while running is picked up.
#[derive(Debug, Clone)]
pub struct ConfigSecretResolver {
    override_key: Option<String>,
    settings_path: PathBuf,
}

impl ConfigSecretResolver {
    fn resolve_with(&self, env: impl Fn(&str) -> Option<String>) -> Option<String> {
        if let Some(key) = &self.override_key {
            return Some(key.clone());
        }
        API_KEY_ENV_VARS
            .iter()
            .find_map(|&var| env(var).and_then(non_blank))
            .or_else(|| {
                read_settings(&self.settings_path)
                    .ok()
                    .flatten()
                    .and_then(|s| s.api.api_key)
                    .and_then(non_blank)
            })
    }
}

/// Treat empty or whitespace-only values as unset.
fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl SecretResolver for ConfigSecretResolver {
    fn api_key(&self) -> BoxFuture<'_, Option<String>> {
        let key = self.resolve_with(|var| std::env::var(var).ok());
        Box::pin(async move { key })
    }
}

/// Get the Inkwell config directory path (~/.inkwell/).
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("INKWELL_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".inkwell")
}

/// Read and parse a TOML settings file. A missing file is `Ok(None)`.
pub fn read_settings(path: &Path) -> Result<Option<SettingsFile>, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            });
        }
    };
    toml::from_str(&content)
        .map(Some)
        .map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}
