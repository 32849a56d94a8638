//! Application layer for Babel.
//!
//! Coordinates the translation client and the history store behind a single
//! state owner, the translate orchestrator.

pub mod translate;

pub use translate::{TranslateEvent, TranslateHandle, TranslateOrchestrator, TranslateState};
