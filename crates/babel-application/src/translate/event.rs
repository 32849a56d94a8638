use babel_core::Language;
use babel_core::history::UiHistoryItem;
use serde::Deserialize;

/// User intents accepted by the translate screen.
///
/// Deserializes from `{"type": "ChangeText", "value": "hello"}`; variants
/// without data omit `value`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum TranslateEvent {
    ChangeText(String),
    OpenFromLanguageDropDown,
    OpenToLanguageDropDown,
    StopChoosingLanguage,
    ChooseFromLanguage(Language),
    ChooseToLanguage(Language),
    SwapLanguages,
    Translate,
    EditTranslation,
    CloseTranslation,
    SelectHistoryItem(UiHistoryItem),
    OnErrorSeen,
}

impl TranslateEvent {
    /// Variant name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            TranslateEvent::ChangeText(_) => "ChangeText",
            TranslateEvent::OpenFromLanguageDropDown => "OpenFromLanguageDropDown",
            TranslateEvent::OpenToLanguageDropDown => "OpenToLanguageDropDown",
            TranslateEvent::StopChoosingLanguage => "StopChoosingLanguage",
            TranslateEvent::ChooseFromLanguage(_) => "ChooseFromLanguage",
            TranslateEvent::ChooseToLanguage(_) => "ChooseToLanguage",
            TranslateEvent::SwapLanguages => "SwapLanguages",
            TranslateEvent::Translate => "Translate",
            TranslateEvent::EditTranslation => "EditTranslation",
            TranslateEvent::CloseTranslation => "CloseTranslation",
            TranslateEvent::SelectHistoryItem(_) => "SelectHistoryItem",
            TranslateEvent::OnErrorSeen => "OnErrorSeen",
        }
    }
}
