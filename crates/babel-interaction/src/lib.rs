//! Remote translation service adapters.

pub mod http_translate_client;

pub use http_translate_client::HttpTranslateClient;
