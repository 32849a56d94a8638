//! Transition rules of the translate screen.
//!
//! The machine never performs I/O. Each input returns at most one [`Effect`]
//! for the caller to execute; results of those effects are fed back through
//! [`TranslateMachine::complete`].
//!
//! Every translation request carries a generation. Anything that abandons the
//! current request (typing, editing, closing, swapping, picking a language or a
//! history entry) moves on to a new generation, and a response tagged with an
//! old one is dropped.

use babel_core::Language;
use babel_core::history::{HistoryItem, UiHistoryItem};
use babel_core::language::LanguageSide;
use babel_core::translate::TranslateError;

use super::event::TranslateEvent;
use super::state::{TranslatePhase, TranslateState};

/// A remote translation the caller must start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub generation: u64,
    pub from: Language,
    pub text: String,
    pub to: Language,
}

/// Side effects requested by the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Call the translation client and report back with `complete`.
    Translate(TranslationRequest),
    /// Append a finished translation to the history store.
    RecordHistory(HistoryItem),
}

#[derive(Debug)]
pub struct TranslateMachine {
    state: TranslateState,
    generation: u64,
    in_flight: Option<TranslationRequest>,
}

impl TranslateMachine {
    pub fn new(state: TranslateState) -> Self {
        Self {
            state,
            generation: 0,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &TranslateState {
        &self.state
    }

    /// Generation of the request currently in flight, if any.
    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight.as_ref().map(|request| request.generation)
    }

    pub fn apply(&mut self, event: TranslateEvent) -> Option<Effect> {
        match event {
            TranslateEvent::ChangeText(text) => {
                if !self.state.is_editable() {
                    tracing::debug!(
                        "[TranslateMachine] Ignoring text change in {:?}",
                        self.state.phase
                    );
                    return None;
                }
                self.abandon_in_flight();
                self.state.phase = if text.is_empty() {
                    TranslatePhase::Idle
                } else {
                    TranslatePhase::Editing
                };
                self.state.from_text = text;
                None
            }
            TranslateEvent::OpenFromLanguageDropDown => {
                self.state.choosing = Some(LanguageSide::From);
                None
            }
            TranslateEvent::OpenToLanguageDropDown => {
                self.state.choosing = Some(LanguageSide::To);
                None
            }
            TranslateEvent::StopChoosingLanguage => {
                self.state.choosing = None;
                None
            }
            TranslateEvent::ChooseFromLanguage(language) => {
                self.choose(LanguageSide::From, language);
                None
            }
            TranslateEvent::ChooseToLanguage(language) => {
                self.choose(LanguageSide::To, language);
                None
            }
            TranslateEvent::SwapLanguages => {
                self.abandon_in_flight();
                let state = &mut self.state;
                std::mem::swap(&mut state.from_language, &mut state.to_language);
                if state.is_showing_result() {
                    std::mem::swap(&mut state.from_text, &mut state.to_text);
                }
                None
            }
            TranslateEvent::Translate => self.start_translation(),
            TranslateEvent::EditTranslation => {
                if !matches!(
                    self.state.phase,
                    TranslatePhase::ShowingResult | TranslatePhase::Translating
                ) {
                    return None;
                }
                self.abandon_in_flight();
                self.state.to_text.clear();
                self.state.phase = self.resting_phase();
                None
            }
            TranslateEvent::CloseTranslation => {
                self.abandon_in_flight();
                self.state.from_text.clear();
                self.state.to_text.clear();
                self.state.error = None;
                self.state.phase = TranslatePhase::Idle;
                None
            }
            TranslateEvent::SelectHistoryItem(item) => {
                self.select_history_item(item);
                None
            }
            TranslateEvent::OnErrorSeen => {
                self.state.error = None;
                None
            }
        }
    }

    /// Folds the outcome of the request tagged `generation` into the state.
    ///
    /// Outcomes of superseded requests are dropped without touching the state.
    pub fn complete(
        &mut self,
        generation: u64,
        outcome: Result<String, TranslateError>,
    ) -> Option<Effect> {
        let request = match self.in_flight.take() {
            Some(request) if request.generation == generation => request,
            other => {
                self.in_flight = other;
                tracing::warn!(
                    "[TranslateMachine] Discarding stale translation response (generation {}, current {:?})",
                    generation,
                    self.in_flight()
                );
                return None;
            }
        };

        match outcome {
            Ok(translated) if translated.trim().is_empty() => {
                tracing::warn!(
                    "[TranslateMachine] Service returned a blank translation (generation {})",
                    generation
                );
                self.state.error = Some(TranslateError::UnknownError);
                self.state.phase = self.resting_phase();
                None
            }
            Ok(translated) => {
                self.state.to_text = translated.clone();
                self.state.phase = TranslatePhase::ShowingResult;
                Some(Effect::RecordHistory(HistoryItem::new(
                    request.from,
                    request.text,
                    request.to,
                    translated,
                )))
            }
            Err(kind) => {
                self.state.error = Some(kind);
                self.state.phase = self.resting_phase();
                None
            }
        }
    }

    /// Replaces the history projection with a fresh store snapshot.
    pub fn set_history(&mut self, history: Vec<UiHistoryItem>) {
        self.state.history = history;
    }

    fn start_translation(&mut self) -> Option<Effect> {
        if self.state.is_translating() {
            tracing::debug!("[TranslateMachine] Translation already in flight, ignoring");
            return None;
        }
        if self.state.from_text.trim().is_empty() {
            tracing::debug!("[TranslateMachine] Nothing to translate");
            return None;
        }

        self.generation += 1;
        let request = TranslationRequest {
            generation: self.generation,
            from: self.state.from_language,
            text: self.state.from_text.clone(),
            to: self.state.to_language,
        };
        self.in_flight = Some(request.clone());
        self.state.phase = TranslatePhase::Translating;
        self.state.choosing = None;

        Some(Effect::Translate(request))
    }

    fn choose(&mut self, side: LanguageSide, language: Language) {
        if self.state.language(side.other()) == language {
            tracing::debug!(
                "[TranslateMachine] {} is already the {:?} language, ignoring",
                language.code(),
                side.other()
            );
            return;
        }

        self.abandon_in_flight();
        match side {
            LanguageSide::From => self.state.from_language = language,
            LanguageSide::To => self.state.to_language = language,
        }
        self.state.choosing = None;
    }

    fn select_history_item(&mut self, item: UiHistoryItem) {
        self.abandon_in_flight();
        let state = &mut self.state;
        state.from_language = item.from_language;
        state.to_language = item.to_language;
        state.from_text = item.from_text;
        state.to_text = item.to_text;
        state.choosing = None;
        state.phase = TranslatePhase::ShowingResult;
    }

    /// Supersedes the in-flight request, if any, and leaves `Translating`.
    fn abandon_in_flight(&mut self) {
        if let Some(request) = self.in_flight.take() {
            tracing::debug!(
                "[TranslateMachine] Abandoning translation generation {}",
                request.generation
            );
            self.generation += 1;
            self.state.phase = self.resting_phase();
        }
    }

    /// The phase to fall back to when no request is in flight.
    fn resting_phase(&self) -> TranslatePhase {
        if !self.state.to_text.is_empty() {
            TranslatePhase::ShowingResult
        } else if self.state.from_text.is_empty() {
            TranslatePhase::Idle
        } else {
            TranslatePhase::Editing
        }
    }
}
