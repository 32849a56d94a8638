//! Application configuration model.
//!
//! Loaded from `config.toml` by the infrastructure layer. Every field has a
//! default so a partial (or empty) file is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{BabelError, Result};
use crate::language::Language;

pub const DEFAULT_SERVICE_URL: &str = "https://translate.pl-coding.com";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct BabelConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub languages: LanguageDefaults,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BabelConfig {
    /// Checks values that serde cannot validate on its own.
    pub fn validate(&self) -> Result<()> {
        let (from, to) = self.languages.resolve()?;
        if from == to {
            return Err(BabelError::config(format!(
                "default languages must differ (both are '{}')",
                from.code()
            )));
        }
        if self.service.base_url.trim().is_empty() {
            return Err(BabelError::config("service.base_url must not be empty"));
        }
        if self.service.timeout_secs == 0 {
            return Err(BabelError::config("service.timeout_secs must be positive"));
        }
        Ok(())
    }
}

/// Remote translation service settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_SERVICE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

/// Languages selected when the translator starts.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LanguageDefaults {
    #[serde(default = "default_from")]
    pub from: String,
    #[serde(default = "default_to")]
    pub to: String,
}

impl LanguageDefaults {
    /// Resolves both codes against the registry.
    pub fn resolve(&self) -> Result<(Language, Language)> {
        let from = Language::from_code(&self.from).ok_or_else(|| {
            BabelError::config(format!("unknown default source language '{}'", self.from))
        })?;
        let to = Language::from_code(&self.to).ok_or_else(|| {
            BabelError::config(format!("unknown default target language '{}'", self.to))
        })?;
        Ok((from, to))
    }
}

impl Default for LanguageDefaults {
    fn default() -> Self {
        Self {
            from: default_from(),
            to: default_to(),
        }
    }
}

fn default_from() -> String {
    Language::ENGLISH.code().to_string()
}

fn default_to() -> String {
    Language::GERMAN.code().to_string()
}

/// History store settings.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct HistoryConfig {
    /// Overrides the default `<data_dir>/babel/history.toml` location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins when set.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Also write a daily-rolling log file into the logs directory.
    #[serde(default = "default_true")]
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            file: default_true(),
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
