//! Translation client trait.

use async_trait::async_trait;

use super::TranslateError;
use crate::language::Language;

/// Sends a single translation request to a remote service.
///
/// Implementations make exactly one attempt per call and keep no state
/// between calls. Retrying is up to the caller.
#[async_trait]
pub trait TranslateClient: Send + Sync {
    /// Translates `text` from `from` into `to`, returning the translated text.
    async fn translate(
        &self,
        from: Language,
        text: &str,
        to: Language,
    ) -> Result<String, TranslateError>;
}
