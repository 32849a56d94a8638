//! Atomic TOML file operations.
//!
//! Writes go to a temporary sibling file, are fsynced, and then renamed over
//! the target, so readers only ever see a complete document. Read-modify-write
//! cycles run under an exclusive `fs2` lock on a sidecar `.lock` file.

use babel_core::BabelError;
use fs2::FileExt;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during atomic TOML operations.
#[derive(Debug, Error)]
pub enum AtomicFileError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("TOML serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Failed to lock {}: {source}", .path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<AtomicFileError> for BabelError {
    fn from(err: AtomicFileError) -> Self {
        match err {
            AtomicFileError::Parse { .. } => BabelError::Serialization {
                format: "TOML".to_string(),
                message: err.to_string(),
            },
            AtomicFileError::Serialize(e) => e.into(),
            AtomicFileError::Io { .. } | AtomicFileError::Lock { .. } => {
                BabelError::storage(err.to_string())
            }
        }
    }
}

/// A handle to a TOML document that is replaced atomically on every save.
pub struct AtomicTomlFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicTomlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the document.
    ///
    /// Returns `Ok(None)` when the file is missing or blank.
    pub fn load(&self) -> Result<Option<T>, AtomicFileError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|source| self.io_error(source))?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let data = toml::from_str(&content).map_err(|source| AtomicFileError::Parse {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(data))
    }

    /// Serializes `data` and atomically replaces the file with it.
    pub fn save(&self, data: &T) -> Result<(), AtomicFileError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let toml_string = toml::to_string_pretty(data)?;

        let tmp_path = self.temp_path();
        let write_tmp = || -> std::io::Result<()> {
            let mut tmp_file = File::create(&tmp_path)?;
            tmp_file.write_all(toml_string.as_bytes())?;
            tmp_file.sync_all()
        };
        if let Err(source) = write_tmp() {
            let _ = fs::remove_file(&tmp_path);
            return Err(self.io_error(source));
        }

        fs::rename(&tmp_path, &self.path).map_err(|source| {
            let _ = fs::remove_file(&tmp_path);
            self.io_error(source)
        })
    }

    /// Read-modify-write under an exclusive lock.
    ///
    /// `f` receives the current document (or `T::default()` when the file does
    /// not exist yet). The document is written back only when `f` succeeds;
    /// its return value is passed through.
    pub fn update<R, E, F>(&self, f: F) -> Result<R, E>
    where
        T: Default,
        E: From<AtomicFileError>,
        F: FnOnce(&mut T) -> Result<R, E>,
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut data = self.load()?.unwrap_or_default();
        let result = f(&mut data)?;
        self.save(&data)?;

        Ok(result)
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        self.path.with_file_name(format!(".{}.tmp", file_name))
    }

    fn io_error(&self, source: std::io::Error) -> AtomicFileError {
        AtomicFileError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

/// Exclusive advisory lock held for the lifetime of the guard.
struct FileLock {
    file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, AtomicFileError> {
        let lock_path = path.with_extension("lock");
        let lock_error = |source: std::io::Error| AtomicFileError::Lock {
            path: lock_path.clone(),
            source,
        };

        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).map_err(lock_error)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(lock_error)?;
        file.lock_exclusive().map_err(lock_error)?;

        Ok(FileLock { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
