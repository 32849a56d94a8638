//! Domain layer for Babel.
//!
//! Holds the value types shared by every other crate (languages, history
//! records, translation errors), the repository and client traits that the
//! infrastructure and interaction crates implement, and the observation bridge
//! that turns store notifications into a replay-latest stream.

pub mod config;
pub mod error;
pub mod history;
pub mod language;
pub mod translate;

pub use error::BabelError;
pub use language::Language;
