//! File-backed history repository.
//!
//! The whole log lives in one TOML document:
//!
//! ```toml
//! next_id = 3
//!
//! [[items]]
//! id = 1
//! from_language_code = "en"
//! from_text = "hello"
//! to_language_code = "fr"
//! to_text = "bonjour"
//! created_at = "2024-05-01T10:00:00Z"
//! ```
//!
//! Items are kept in insertion order on disk and reversed when listed.
//! `next_id` is persisted so ids are never reused, even across restarts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};

use babel_core::error::{BabelError, Result};
use babel_core::history::{HistoryChange, HistoryItem, HistoryRepository};

use crate::paths::BabelPaths;
use crate::storage::AtomicTomlFile;

const CHANGE_CAPACITY: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HistoryDocument {
    #[serde(default = "first_id")]
    next_id: i64,
    #[serde(default)]
    items: Vec<HistoryItem>,
}

impl Default for HistoryDocument {
    fn default() -> Self {
        Self {
            next_id: first_id(),
            items: Vec::new(),
        }
    }
}

impl HistoryDocument {
    /// Makes `next_id` greater than every stored id, whatever the file says.
    fn normalize(&mut self) {
        let max_id = self.items.iter().filter_map(|item| item.id).max();
        if let Some(max_id) = max_id {
            self.next_id = self.next_id.max(max_id + 1);
        }
    }
}

fn first_id() -> i64 {
    1
}

/// Durable, append-only history store backed by a TOML file.
///
/// Writes go through [`AtomicTomlFile::update`] on a blocking thread. The
/// in-memory copy is replaced only after the write succeeded, and a
/// [`HistoryChange`] is published only after that.
pub struct FileHistoryRepository {
    file: Arc<AtomicTomlFile<HistoryDocument>>,
    /// Last successfully persisted document. Also serializes writers.
    document: Mutex<HistoryDocument>,
    changes: broadcast::Sender<HistoryChange>,
}

impl FileHistoryRepository {
    /// Opens (or lazily creates) the history log at `path`.
    ///
    /// A file that exists but cannot be parsed is an error; nothing is
    /// overwritten.
    pub async fn open(path: PathBuf) -> Result<Self> {
        let file = Arc::new(AtomicTomlFile::<HistoryDocument>::new(path));

        let loader = file.clone();
        let mut document = tokio::task::spawn_blocking(move || loader.load())
            .await
            .map_err(|e| BabelError::internal(format!("Failed to join task: {}", e)))??
            .unwrap_or_default();
        document.normalize();

        tracing::info!(
            "[FileHistoryRepository] Opened {} ({} records)",
            file.path().display(),
            document.items.len()
        );

        Ok(Self {
            file,
            document: Mutex::new(document),
            changes: broadcast::channel(CHANGE_CAPACITY).0,
        })
    }

    /// Opens the history log at its default platform location.
    pub async fn open_default() -> Result<Self> {
        let paths = BabelPaths::new()?;
        Self::open(paths.history_file()).await
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.document.lock().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl HistoryRepository for FileHistoryRepository {
    async fn insert(&self, mut item: HistoryItem) -> Result<HistoryItem> {
        item.validate()?;

        let mut document = self.document.lock().await;

        let file = self.file.clone();
        let (stored, persisted) = tokio::task::spawn_blocking(move || {
            file.update(|doc: &mut HistoryDocument| -> Result<(HistoryItem, HistoryDocument)> {
                doc.normalize();
                item.id = Some(doc.next_id);
                doc.next_id += 1;
                doc.items.push(item.clone());
                Ok((item, doc.clone()))
            })
        })
        .await
        .map_err(|e| BabelError::internal(format!("Failed to join task: {}", e)))?
        .map_err(|e| {
            tracing::error!("[FileHistoryRepository] Failed to persist history record: {}", e);
            match e {
                BabelError::Io { message } => BabelError::storage(message),
                other => other,
            }
        })?;

        *document = persisted;
        drop(document);

        let id = stored.id.unwrap_or_default();
        tracing::info!(
            "[FileHistoryRepository] Stored history record {} ({} -> {})",
            id,
            stored.from_language_code,
            stored.to_language_code
        );

        // No receivers is fine: nobody is observing yet.
        let _ = self.changes.send(HistoryChange::Inserted { id });

        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<HistoryItem>> {
        let document = self.document.lock().await;
        Ok(document.items.iter().rev().cloned().collect())
    }

    fn changes(&self) -> broadcast::Receiver<HistoryChange> {
        self.changes.subscribe()
    }
}
