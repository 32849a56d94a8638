//! HttpTranslateClient - REST implementation of the translation client.
//!
//! Talks to a LibreTranslate-style endpoint:
//!
//! ```text
//! POST {base_url}/translate
//! {"q": "hello", "source": "en", "target": "fr"}
//!
//! 200 OK
//! {"translatedText": "bonjour"}
//! ```

use async_trait::async_trait;
use babel_core::BabelError;
use babel_core::Language;
use babel_core::config::ServiceConfig;
use babel_core::translate::{TranslateClient, TranslateError};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Translation client backed by `reqwest`.
///
/// Every call is a single attempt; the configured timeout covers connecting
/// and reading the response.
#[derive(Clone)]
pub struct HttpTranslateClient {
    client: Client,
    endpoint: String,
}

impl HttpTranslateClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BabelError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| BabelError::config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/translate", base_url.trim().trim_end_matches('/')),
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, BabelError> {
        Self::new(&config.base_url, config.timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send_request(&self, body: &TranslateRequest<'_>) -> Result<String, TranslateError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .map_err(|err| map_transport_error(&err))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &body_text));
        }

        let parsed: TranslateResponse = response.json().await.map_err(|err| {
            tracing::debug!("[HttpTranslateClient] Failed to decode response: {err}");
            map_transport_error(&err)
        })?;

        extract_translation(parsed)
    }
}

#[async_trait]
impl TranslateClient for HttpTranslateClient {
    async fn translate(
        &self,
        from: Language,
        text: &str,
        to: Language,
    ) -> Result<String, TranslateError> {
        tracing::debug!(
            "[HttpTranslateClient] POST {} ({} -> {}, {} chars)",
            self.endpoint,
            from.code(),
            to.code(),
            text.chars().count()
        );

        let request = TranslateRequest {
            q: text,
            source: from.code(),
            target: to.code(),
        };

        let result = self.send_request(&request).await;
        if let Err(kind) = &result {
            tracing::warn!(
                "[HttpTranslateClient] Translation {} -> {} failed: {:?}",
                from.code(),
                to.code(),
                kind
            );
        }
        result
    }
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

fn extract_translation(response: TranslateResponse) -> Result<String, TranslateError> {
    match response.translated_text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(TranslateError::UnknownError),
    }
}

/// Classifies a failure that happened before a status code was available
/// (or while reading the body).
fn map_transport_error(err: &reqwest::Error) -> TranslateError {
    if err.is_connect() || err.is_timeout() {
        TranslateError::ServiceUnavailable
    } else {
        TranslateError::UnknownError
    }
}

fn map_http_error(status: StatusCode, body: &str) -> TranslateError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| wrapper.error)
        .unwrap_or_else(|_| body.to_string());
    tracing::debug!(
        "[HttpTranslateClient] Service answered {}: {}",
        status.as_u16(),
        message
    );

    TranslateError::from_status(status.as_u16())
}
