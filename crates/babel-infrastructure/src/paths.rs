//! Unified path management for Babel files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/babel/             # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/babel/        # Data directory
//! ├── history.toml             # Translation history log
//! └── logs/                    # Application logs
//!     └── babel.log.YYYY-MM-DD
//! ```

use std::path::{Path, PathBuf};
use thiserror::Error;

use babel_core::BabelError;

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("Cannot find the user configuration directory")]
    ConfigDirNotFound,
    #[error("Cannot find the user data directory")]
    DataDirNotFound,
}

impl From<PathError> for BabelError {
    fn from(err: PathError) -> Self {
        BabelError::config(err.to_string())
    }
}

/// Resolved locations of every file Babel reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BabelPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl BabelPaths {
    const APP_DIR: &'static str = "babel";

    /// Resolves the platform directories (XDG on Linux, `Library` on macOS,
    /// `AppData` on Windows).
    pub fn new() -> Result<Self, PathError> {
        let config_dir = dirs::config_dir()
            .ok_or(PathError::ConfigDirNotFound)?
            .join(Self::APP_DIR);
        let data_dir = dirs::data_dir()
            .ok_or(PathError::DataDirNotFound)?
            .join(Self::APP_DIR);
        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    /// Places everything under a single base directory (tests, portable
    /// installs).
    pub fn with_base(base: &Path) -> Self {
        Self {
            config_dir: base.join("config"),
            data_dir: base.join("data"),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn history_file(&self) -> PathBuf {
        self.data_dir.join("history.toml")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}
