//! Configuration for the Lectern runtime.
//!
//! Covers provider selection, the API credential, endpoint overrides, the
//! request timeout, and the CLI's catalog/state file locations.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use lectern_gateway::{gemini, openai, GeminiGateway, LlmGateway, OpenAiGateway};

use crate::error::{LecternError, Result};

/// The default config file name.
const CONFIG_FILE_NAME: &str = "lectern.json";

/// Default gateway timeout in seconds.
const fn default_timeout() -> u64 {
    30
}

/// Default lesson catalog path for the CLI.
fn default_catalog() -> String {
    "lessons.json".to_string()
}

/// Default question state file path for the CLI.
fn default_state_file() -> String {
    ".lectern/questions.json".to_string()
}

/// Main configuration for Lectern.
///
/// The API credential and endpoint are explicit configuration values
/// injected into the gateway at construction, never ambient global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// LLM provider to send generation requests to.
    #[serde(default)]
    pub provider: Provider,

    /// API credential for the configured provider.
    #[serde(default)]
    pub api_key: String,

    /// Override for the provider's default API base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Override for the provider's default model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Gateway request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Path to the lesson catalog file loaded by the CLI.
    #[serde(default = "default_catalog")]
    pub catalog: String,

    /// Path to the question state file persisted by the CLI.
    #[serde(default = "default_state_file")]
    pub state_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            api_key: String::new(),
            base_url: None,
            model: None,
            timeout: default_timeout(),
            catalog: default_catalog(),
            state_file: default_state_file(),
        }
    }
}

impl Config {
    /// Loads configuration from the current working directory.
    ///
    /// Looks for `lectern.json` in the current directory. If found, loads and
    /// validates the configuration. If not found, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            LecternError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads configuration from a specific directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        Self::load_from_file(&config_path)
    }

    /// Loads configuration from a specific file path.
    ///
    /// If the file does not exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns `LecternError::ConfigParseError` if the file exists but
    /// contains invalid JSON or invalid enum values, and
    /// `LecternError::ConfigValidationError` if the values are invalid.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(LecternError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| LecternError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// The API credential is checked later, when the gateway is built, so a
    /// config file without one still loads (the CLI merges the credential
    /// from the environment).
    ///
    /// # Errors
    ///
    /// Returns `LecternError::ConfigValidationError` if any check fails.
    pub fn validate(&self) -> Result<()> {
        if self.timeout == 0 {
            return Err(LecternError::config_validation(
                "timeout must be greater than 0",
                "Set timeout to at least 1 second in your lectern.json",
            ));
        }

        if self.catalog.trim().is_empty() {
            return Err(LecternError::config_validation(
                "catalog path must not be empty",
                "Provide a valid lesson catalog path in your lectern.json",
            ));
        }

        if self.state_file.trim().is_empty() {
            return Err(LecternError::config_validation(
                "stateFile must not be empty",
                "Provide a valid state file path in your lectern.json",
            ));
        }

        Ok(())
    }

    /// The effective API base URL (override or provider default).
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(match self.provider {
                Provider::OpenAi => openai::DEFAULT_BASE_URL,
                Provider::Gemini => gemini::DEFAULT_BASE_URL,
            })
    }

    /// The effective model name (override or provider default).
    #[must_use]
    pub fn model_name(&self) -> &str {
        self.model.as_deref().unwrap_or(match self.provider {
            Provider::OpenAi => openai::DEFAULT_MODEL,
            Provider::Gemini => gemini::DEFAULT_MODEL,
        })
    }

    /// The gateway request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Builds the configured provider gateway.
    ///
    /// # Errors
    ///
    /// Returns `LecternError::ConfigValidationError` when the credential is
    /// missing or the HTTP client cannot be constructed.
    pub fn build_gateway(&self) -> Result<Arc<dyn LlmGateway>> {
        if self.api_key.trim().is_empty() {
            return Err(LecternError::config_validation(
                "apiKey must not be empty",
                "Set apiKey in your lectern.json or export LECTERN_API_KEY",
            ));
        }

        let gateway: Arc<dyn LlmGateway> = match self.provider {
            Provider::OpenAi => Arc::new(
                OpenAiGateway::new(
                    self.api_key.clone(),
                    self.endpoint(),
                    self.model_name(),
                    self.request_timeout(),
                )
                .map_err(|e| {
                    LecternError::config_validation(
                        e.to_string(),
                        "Check the configured base URL and timeout",
                    )
                })?,
            ),
            Provider::Gemini => Arc::new(
                GeminiGateway::new(
                    self.api_key.clone(),
                    self.endpoint(),
                    self.model_name(),
                    self.request_timeout(),
                )
                .map_err(|e| {
                    LecternError::config_validation(
                        e.to_string(),
                        "Check the configured base URL and timeout",
                    )
                })?,
            ),
        };
        Ok(gateway)
    }
}

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Provider {
    /// OpenAI-style chat completions (default).
    #[default]
    OpenAi,
    /// Google Gemini generateContent.
    Gemini,
}

impl Provider {
    /// Parses a string into a `Provider`, case-insensitively.
    fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "gemini" => Some(Self::Gemini),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Provider {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str_case_insensitive(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid provider '{s}': expected one of 'openai', 'gemini'"
            ))
        })
    }
}

impl Serialize for Provider {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let s = match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        };
        serializer.serialize_str(s)
    }
}
