// crates/mutant-lab-config/src/config.rs
// ============================================================================
// Module: Mutant Lab Configuration
// Description: Configuration loading and validation for Mutant Lab hosts.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: mutant-lab-core, mutant-lab-providers, mutant-lab-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Unknown keys and out-of-range values are rejected. The API key itself never
//! appears in the file; `[synthesis]` names the environment variable that
//! holds it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use mutant_lab_core::DEFAULT_SLOT_KEY;
use mutant_lab_core::Language;
use mutant_lab_core::MAX_SLOT_BYTES;
use mutant_lab_providers::DEFAULT_ENDPOINT;
use mutant_lab_providers::DEFAULT_IMAGE_MODEL;
use mutant_lab_providers::DEFAULT_TEXT_MODEL;
use mutant_lab_providers::GeminiConfig;
use mutant_lab_store_sqlite::SqliteStoreConfig;
use mutant_lab_store_sqlite::SqliteStoreMode;
use mutant_lab_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "mutant-lab.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "MUTANT_LAB_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum slot key length.
const MAX_SLOT_KEY_LENGTH: usize = 256;
/// Default environment variable holding the API key.
const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Maximum accepted request timeout in milliseconds.
const MAX_TIMEOUT_MS: u64 = 600_000;
/// Maximum accepted response size limit in bytes.
const MAX_RESPONSE_BYTES_LIMIT: usize = 64 * 1024 * 1024;
/// Maximum model name length.
const MAX_MODEL_NAME_LENGTH: usize = 128;

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Top-level Mutant Lab configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MutantLabConfig {
    /// Slot store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Synthesis backend configuration.
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    /// Locale configuration.
    #[serde(default)]
    pub locale: LocaleConfig,
}

impl MutantLabConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// The path is `path` when given, else `MUTANT_LAB_CONFIG`, else
    /// `mutant-lab.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.store.validate()?;
        self.synthesis.validate()?;
        Ok(())
    }

    /// Returns the `SQLite` store config, or `None` for the memory store.
    #[must_use]
    pub fn sqlite_store_config(&self) -> Option<SqliteStoreConfig> {
        match self.store.store_type {
            StoreType::Memory => None,
            StoreType::Sqlite => self.store.path.as_ref().map(|path| SqliteStoreConfig {
                busy_timeout_ms: self.store.busy_timeout_ms,
                journal_mode: self.store.journal_mode,
                sync_mode: self.store.sync_mode,
                max_value_bytes: self.store.max_value_bytes,
                ..SqliteStoreConfig::new(path)
            }),
        }
    }

    /// Builds the Gemini config, reading the API key from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the API key variable is unset or empty.
    pub fn gemini_config(&self) -> Result<GeminiConfig, ConfigError> {
        self.gemini_config_with(|name| env::var(name).ok())
    }

    /// Builds the Gemini config, resolving the API key through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `lookup` yields no non-empty key.
    pub fn gemini_config_with<F>(&self, lookup: F) -> Result<GeminiConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let synthesis = &self.synthesis;
        let api_key = lookup(&synthesis.api_key_env)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "environment variable {} must hold the api key",
                    synthesis.api_key_env
                ))
            })?;
        Ok(GeminiConfig {
            endpoint: synthesis.endpoint.clone(),
            text_model: synthesis.text_model.clone(),
            image_model: synthesis.image_model.clone(),
            timeout_ms: synthesis.timeout_ms,
            max_response_bytes: synthesis.max_response_bytes,
            allow_http: synthesis.allow_http,
            temperature: synthesis.temperature,
            ..GeminiConfig::new(api_key)
        })
    }
}

// ============================================================================
// SECTION: Store Config
// ============================================================================

/// Slot store configuration.
///
/// # Invariants
/// - `memory` stores never set `path`; `sqlite` stores always do.
/// - `slot_key` is non-empty, bounded, and has no surrounding whitespace.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: StoreType,
    /// `SQLite` database path when using the sqlite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Slot holding the inventory document.
    #[serde(default = "default_slot_key")]
    pub slot_key: String,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_store_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Maximum slot payload size in bytes.
    #[serde(default = "default_max_value_bytes")]
    pub max_value_bytes: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::default(),
            path: None,
            slot_key: default_slot_key(),
            busy_timeout_ms: default_store_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            max_value_bytes: default_max_value_bytes(),
        }
    }
}

impl StoreConfig {
    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let key = self.slot_key.as_str();
        if key.trim().is_empty() {
            return Err(ConfigError::Invalid("store slot_key must be non-empty".to_string()));
        }
        if key.trim() != key {
            return Err(ConfigError::Invalid(
                "store slot_key must not have surrounding whitespace".to_string(),
            ));
        }
        if key.len() > MAX_SLOT_KEY_LENGTH {
            return Err(ConfigError::Invalid("store slot_key exceeds max length".to_string()));
        }
        if self.max_value_bytes == 0 || self.max_value_bytes > MAX_SLOT_BYTES {
            return Err(ConfigError::Invalid(format!(
                "store max_value_bytes must be between 1 and {MAX_SLOT_BYTES}"
            )));
        }
        match self.store_type {
            StoreType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid("memory store must not set path".to_string()));
                }
                Ok(())
            }
            StoreType::Sqlite => {
                let path = self.path.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("sqlite store requires path".to_string())
                })?;
                validate_store_path(path)
            }
        }
    }
}

/// Slot store backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Use the in-memory store.
    #[default]
    Memory,
    /// Use the `SQLite`-backed durable store.
    Sqlite,
}

// ============================================================================
// SECTION: Synthesis Config
// ============================================================================

/// Synthesis backend configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SynthesisConfig {
    /// API base URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model used for creature details.
    #[serde(default = "default_text_model")]
    pub text_model: String,
    /// Model used for creature artwork.
    #[serde(default = "default_image_model")]
    pub image_model: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum response size in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    /// Allow cleartext HTTP endpoints.
    #[serde(default)]
    pub allow_http: bool,
    /// Sampling temperature for the text model.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            text_model: default_text_model(),
            image_model: default_image_model(),
            api_key_env: default_api_key_env(),
            timeout_ms: default_timeout_ms(),
            max_response_bytes: default_max_response_bytes(),
            allow_http: false,
            temperature: default_temperature(),
        }
    }
}

impl SynthesisConfig {
    /// Validates synthesis configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.endpoint.as_str();
        if endpoint.trim() != endpoint {
            return Err(ConfigError::Invalid(
                "synthesis endpoint must not have surrounding whitespace".to_string(),
            ));
        }
        let scheme_ok = endpoint.starts_with("https://")
            || (self.allow_http && endpoint.starts_with("http://"));
        if !scheme_ok {
            return Err(ConfigError::Invalid(
                "synthesis endpoint must use https (or http with allow_http)".to_string(),
            ));
        }
        validate_model("synthesis text_model", &self.text_model)?;
        validate_model("synthesis image_model", &self.image_model)?;
        let env_ok = !self.api_key_env.is_empty()
            && self.api_key_env.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
        if !env_ok {
            return Err(ConfigError::Invalid(
                "synthesis api_key_env must be a non-empty environment variable name".to_string(),
            ));
        }
        if self.timeout_ms == 0 || self.timeout_ms > MAX_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "synthesis timeout_ms must be between 1 and {MAX_TIMEOUT_MS}"
            )));
        }
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_RESPONSE_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "synthesis max_response_bytes must be between 1 and {MAX_RESPONSE_BYTES_LIMIT}"
            )));
        }
        if !(0.0 ..= 2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(
                "synthesis temperature must be between 0 and 2".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Locale Config
// ============================================================================

/// Locale configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocaleConfig {
    /// Language used when a lab session opens.
    #[serde(default = "default_language")]
    pub default_language: Language,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            default_language: default_language(),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default persistence slot.
fn default_slot_key() -> String {
    DEFAULT_SLOT_KEY.to_string()
}

/// Default `SQLite` busy timeout in milliseconds.
const fn default_store_busy_timeout_ms() -> u64 {
    5_000
}

/// Default slot payload limit.
const fn default_max_value_bytes() -> usize {
    MAX_SLOT_BYTES
}

/// Default Gemini API endpoint.
fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

/// Default text model.
fn default_text_model() -> String {
    DEFAULT_TEXT_MODEL.to_string()
}

/// Default image model.
fn default_image_model() -> String {
    DEFAULT_IMAGE_MODEL.to_string()
}

/// Default environment variable holding the API key.
fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

/// Default request timeout in milliseconds.
const fn default_timeout_ms() -> u64 {
    60_000
}

/// Default response body limit.
const fn default_max_response_bytes() -> usize {
    16 * 1024 * 1024
}

/// Default sampling temperature.
const fn default_temperature() -> f32 {
    1.0
}

/// Default display language.
const fn default_language() -> Language {
    Language::Th
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the caller or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates the store database path.
fn validate_store_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid("store path must be non-empty".to_string()));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("store path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("store path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a model name used as a URL path segment.
fn validate_model(field: &str, model: &str) -> Result<(), ConfigError> {
    if model.is_empty() || model.len() > MAX_MODEL_NAME_LENGTH {
        return Err(ConfigError::Invalid(format!(
            "{field} must be 1 to {MAX_MODEL_NAME_LENGTH} characters"
        )));
    }
    if !model.chars().all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '.' | '_')) {
        return Err(ConfigError::Invalid(format!("{field} contains invalid characters")));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
