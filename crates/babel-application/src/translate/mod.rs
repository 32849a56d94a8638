//! The translate screen: UI events in, one coherent state out.
//!
//! [`TranslateMachine`] holds the transition rules and is free of I/O.
//! [`TranslateOrchestrator`] runs it as an actor, executes its effects and
//! publishes every new [`TranslateState`].

mod event;
mod machine;
mod orchestrator;
mod state;

pub use event::TranslateEvent;
pub use machine::{Effect, TranslateMachine, TranslationRequest};
pub use orchestrator::{TranslateHandle, TranslateOrchestrator};
pub use state::{TranslatePhase, TranslateState};
