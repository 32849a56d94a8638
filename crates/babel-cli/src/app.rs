//! Composition root: wires configuration, storage and the remote client.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use babel_application::{TranslateHandle, TranslateOrchestrator, TranslateState};
use babel_core::Language;
use babel_core::config::BabelConfig;
use babel_core::history::HistoryObserver;
use babel_infrastructure::{BabelPaths, ConfigService, FileHistoryRepository};
use babel_interaction::HttpTranslateClient;

/// Locations resolved from the platform defaults and command-line overrides.
pub struct Settings {
    pub paths: BabelPaths,
    pub config: BabelConfig,
    pub history_file: PathBuf,
}

impl Settings {
    /// Loads `config.toml` (creating it on first run). `--history` beats
    /// `[history].path`, which beats the default data directory.
    pub fn load(config_override: Option<PathBuf>, history_override: Option<PathBuf>) -> Result<Self> {
        let paths = BabelPaths::new().context("Failed to resolve Babel directories")?;

        let config_file = config_override.unwrap_or_else(|| paths.config_file());
        let config = ConfigService::new(config_file.clone())
            .load_or_create()
            .with_context(|| format!("Failed to load configuration from {}", config_file.display()))?;

        let history_file = history_override
            .or_else(|| config.history.path.clone())
            .unwrap_or_else(|| paths.history_file());

        Ok(Self {
            paths,
            config,
            history_file,
        })
    }

    pub fn default_languages(&self) -> Result<(Language, Language)> {
        Ok(self.config.languages.resolve()?)
    }
}

/// Long-lived services shared by every command.
pub struct App {
    pub settings: Settings,
    pub repository: Arc<FileHistoryRepository>,
    pub observer: HistoryObserver,
    pub client: Arc<HttpTranslateClient>,
}

impl App {
    pub async fn open(settings: Settings) -> Result<Self> {
        let repository = Arc::new(
            FileHistoryRepository::open(settings.history_file.clone())
                .await
                .with_context(|| {
                    format!(
                        "Failed to open history at {}",
                        settings.history_file.display()
                    )
                })?,
        );
        let observer = HistoryObserver::new(repository.clone());
        let client = Arc::new(
            HttpTranslateClient::from_config(&settings.config.service)
                .context("Failed to create translation client")?,
        );

        tracing::info!(
            "[App] Using {} with history at {}",
            client.endpoint(),
            settings.history_file.display()
        );

        Ok(Self {
            settings,
            repository,
            observer,
            client,
        })
    }

    /// Starts a translator session with the given languages.
    pub fn translator(&self, from: Language, to: Language) -> TranslateHandle {
        TranslateOrchestrator::spawn(
            self.client.clone(),
            self.repository.clone(),
            &self.observer,
            TranslateState::new(from, to),
        )
    }
}

/// Resolves a user-typed language code.
pub fn parse_language(code: &str) -> Result<Language> {
    Language::from_code(code).with_context(|| {
        format!("Unknown language '{code}'. Run `babel languages` for the list.")
    })
}
