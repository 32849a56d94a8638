//! History domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BabelError, Result};
use crate::language::Language;

/// A single completed translation.
///
/// `id` is `None` until the record has been inserted into a
/// [`HistoryRepository`](super::HistoryRepository); the store assigns it and
/// it never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub from_language_code: String,
    pub from_text: String,
    pub to_language_code: String,
    pub to_text: String,
    pub created_at: DateTime<Utc>,
}

impl HistoryItem {
    /// Creates an unpersisted record stamped with the current time.
    pub fn new(
        from_language: Language,
        from_text: impl Into<String>,
        to_language: Language,
        to_text: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            from_language_code: from_language.code().to_string(),
            from_text: from_text.into(),
            to_language_code: to_language.code().to_string(),
            to_text: to_text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Checks the invariants every stored record must satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.from_text.trim().is_empty() {
            return Err(BabelError::validation("history item has blank source text"));
        }
        if self.to_text.trim().is_empty() {
            return Err(BabelError::validation(
                "history item has blank translated text",
            ));
        }
        if self.from_language_code.trim().is_empty() || self.to_language_code.trim().is_empty() {
            return Err(BabelError::validation("history item is missing a language code"));
        }
        Ok(())
    }
}

/// Change notification emitted by a history store after a durable write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryChange {
    Inserted { id: i64 },
}

/// Presentation projection of a persisted [`HistoryItem`] with its language
/// codes resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiHistoryItem {
    pub id: i64,
    pub from_language: Language,
    pub from_text: String,
    pub to_language: Language,
    pub to_text: String,
}

impl UiHistoryItem {
    /// Projects a stored record.
    ///
    /// Returns `None` for records that were never persisted or that reference
    /// a language code missing from the registry.
    pub fn from_item(item: &HistoryItem) -> Option<Self> {
        Some(Self {
            id: item.id?,
            from_language: Language::from_code(&item.from_language_code)?,
            from_text: item.from_text.clone(),
            to_language: Language::from_code(&item.to_language_code)?,
            to_text: item.to_text.clone(),
        })
    }

    /// Projects a whole collection, preserving order and dropping records
    /// that cannot be resolved.
    pub fn project(items: &[HistoryItem]) -> Vec<Self> {
        items
            .iter()
            .filter_map(|item| {
                let projected = Self::from_item(item);
                if projected.is_none() {
                    tracing::warn!(
                        "[History] Skipping unresolvable record id={:?} ({} -> {})",
                        item.id,
                        item.from_language_code,
                        item.to_language_code
                    );
                }
                projected
            })
            .collect()
    }
}
