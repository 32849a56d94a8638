//! Presentation state of the translate screen.

use babel_core::Language;
use babel_core::history::UiHistoryItem;
use babel_core::language::LanguageSide;
use babel_core::translate::TranslateError;
use serde::Serialize;

/// Where the screen is in its edit / translate / read cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslatePhase {
    /// Nothing typed yet.
    #[default]
    Idle,
    /// Source text present, no result shown.
    Editing,
    /// A request is in flight.
    Translating,
    /// A result (fresh or picked from history) is shown.
    ShowingResult,
}

/// Everything the UI renders.
///
/// Owned by the orchestrator; consumers only ever see clones. The language
/// picker is a single optional side, so both pickers can never be open at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateState {
    pub from_language: Language,
    pub to_language: Language,
    pub from_text: String,
    /// Empty while no result is shown.
    pub to_text: String,
    pub phase: TranslatePhase,
    pub choosing: Option<LanguageSide>,
    pub error: Option<TranslateError>,
    /// Newest first.
    pub history: Vec<UiHistoryItem>,
}

impl TranslateState {
    pub fn new(from_language: Language, to_language: Language) -> Self {
        Self {
            from_language,
            to_language,
            from_text: String::new(),
            to_text: String::new(),
            phase: TranslatePhase::Idle,
            choosing: None,
            error: None,
            history: Vec::new(),
        }
    }

    pub fn is_translating(&self) -> bool {
        self.phase == TranslatePhase::Translating
    }

    pub fn is_showing_result(&self) -> bool {
        self.phase == TranslatePhase::ShowingResult
    }

    pub fn is_choosing_from_language(&self) -> bool {
        self.choosing == Some(LanguageSide::From)
    }

    pub fn is_choosing_to_language(&self) -> bool {
        self.choosing == Some(LanguageSide::To)
    }

    /// Source text may be edited until a result is on screen.
    pub fn is_editable(&self) -> bool {
        self.phase != TranslatePhase::ShowingResult && self.to_text.is_empty()
    }

    pub fn language(&self, side: LanguageSide) -> Language {
        match side {
            LanguageSide::From => self.from_language,
            LanguageSide::To => self.to_language,
        }
    }
}

impl Default for TranslateState {
    fn default() -> Self {
        Self::new(Language::ENGLISH, Language::GERMAN)
    }
}
