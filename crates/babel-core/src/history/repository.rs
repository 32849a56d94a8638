//! History repository trait.

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::model::{HistoryChange, HistoryItem};
use crate::error::Result;

/// Durable, append-only store of translation records.
///
/// Implementations must publish a [`HistoryChange`] only after the record has
/// been written durably, and must publish nothing when an insert fails.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Validates and persists `item`, assigning the next id.
    ///
    /// Any id already present on `item` is ignored. Returns the stored record.
    async fn insert(&self, item: HistoryItem) -> Result<HistoryItem>;

    /// Returns every stored record, newest first.
    async fn list(&self) -> Result<Vec<HistoryItem>>;

    /// Subscribes to change notifications.
    fn changes(&self) -> broadcast::Receiver<HistoryChange>;
}
