//! Language registry.
//!
//! A static table of the languages the translation service supports, keyed by
//! ISO 639-1 code. Languages are plain `Copy` values; nothing here is mutable.

mod model;
mod registry;

pub use model::{Language, LanguageSide};
