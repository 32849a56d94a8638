//! Configuration service implementation.
//!
//! Loads [`BabelConfig`] from `config.toml` (by default
//! `~/.config/babel/config.toml`), writing the defaults on first run.

use babel_core::config::BabelConfig;
use babel_core::error::Result;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::paths::BabelPaths;
use crate::storage::AtomicTomlFile;

/// Loads and caches the application configuration.
#[derive(Clone)]
pub struct ConfigService {
    file: Arc<AtomicTomlFile<BabelConfig>>,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<BabelConfig>>>,
}

impl ConfigService {
    /// Uses the config file at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicTomlFile::new(path)),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Uses the platform config file.
    pub fn from_default_location() -> Result<Self> {
        let paths = BabelPaths::new()?;
        Ok(Self::new(paths.config_file()))
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Returns the configuration, reading it from disk on first access.
    ///
    /// A missing or blank file is replaced by the defaults. The loaded
    /// configuration is validated before it is cached.
    pub fn load_or_create(&self) -> Result<BabelConfig> {
        if let Some(cached) = self
            .config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Ok(cached.clone());
        }

        let config = match self.file.load()? {
            Some(config) => {
                tracing::debug!("[ConfigService] Loaded {}", self.path().display());
                config
            }
            None => {
                let config = BabelConfig::default();
                self.file.save(&config)?;
                tracing::info!(
                    "[ConfigService] Wrote default configuration to {}",
                    self.path().display()
                );
                config
            }
        };
        config.validate()?;

        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Some(config.clone());
        Ok(config)
    }

    /// Validates and persists `config`, replacing the cached copy.
    pub fn save(&self, config: &BabelConfig) -> Result<()> {
        config.validate()?;
        self.file.save(config)?;
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Some(config.clone());
        Ok(())
    }

    /// Forces the next [`load_or_create`](Self::load_or_create) to re-read the file.
    pub fn invalidate_cache(&self) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
