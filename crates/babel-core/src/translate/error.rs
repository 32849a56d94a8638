//! Classified remote translation failures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a remote translation failed.
///
/// These are the only failures the presentation layer ever sees; they are
/// stored in the UI state and shown once until acknowledged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TranslateError {
    /// The remote host could not be reached (connect failure, timeout).
    #[error("translation service unavailable")]
    ServiceUnavailable,
    /// The remote rejected the request as malformed (HTTP 4xx).
    #[error("translation request rejected by the service")]
    ClientError,
    /// The remote failed internally (HTTP 5xx).
    #[error("translation service failed internally")]
    ServerError,
    /// Any other failure, including undecodable responses.
    #[error("unknown translation error")]
    UnknownError,
}

impl TranslateError {
    /// Classifies an HTTP status code that is not a success.
    pub fn from_status(status: u16) -> Self {
        match status {
            400..=499 => TranslateError::ClientError,
            500..=599 => TranslateError::ServerError,
            _ => TranslateError::UnknownError,
        }
    }

    /// Short notification text for the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            TranslateError::ServiceUnavailable => {
                "The translation service is unavailable. Check your connection."
            }
            TranslateError::ClientError => "The text could not be translated.",
            TranslateError::ServerError => {
                "The translation service ran into a problem. Try again later."
            }
            TranslateError::UnknownError => "Something went wrong while translating.",
        }
    }
}
