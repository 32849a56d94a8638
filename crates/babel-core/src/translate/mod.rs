//! Remote translation contract.
//!
//! The orchestrator depends only on [`TranslateClient`]; the HTTP
//! implementation lives in `babel-interaction`.

mod client;
mod error;

pub use client::TranslateClient;
pub use error::TranslateError;
