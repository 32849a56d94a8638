//! End-to-end flows through the orchestrator with a real file-backed store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use babel_application::translate::TranslatePhase;
use babel_application::{TranslateEvent, TranslateHandle, TranslateOrchestrator, TranslateState};
use babel_core::Language;
use babel_core::history::{HistoryObserver, HistoryRepository, UiHistoryItem};
use babel_core::translate::{TranslateClient, TranslateError};
use babel_infrastructure::FileHistoryRepository;
use tempfile::TempDir;

/// Answers from a fixed phrase book; unknown phrases fail with `fallback`.
struct PhraseBookClient {
    phrases: HashMap<&'static str, &'static str>,
    fallback: TranslateError,
    calls: Mutex<usize>,
}

impl PhraseBookClient {
    fn new(phrases: &[(&'static str, &'static str)]) -> Self {
        Self {
            phrases: phrases.iter().copied().collect(),
            fallback: TranslateError::ServiceUnavailable,
            calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl TranslateClient for PhraseBookClient {
    async fn translate(
        &self,
        _from: Language,
        text: &str,
        _to: Language,
    ) -> Result<String, TranslateError> {
        *self.calls.lock().unwrap() += 1;
        self.phrases
            .get(text)
            .map(|translated| translated.to_string())
            .ok_or(self.fallback)
    }
}

struct App {
    _temp_dir: TempDir,
    repository: Arc<FileHistoryRepository>,
    _observer: HistoryObserver,
    client: Arc<PhraseBookClient>,
    handle: TranslateHandle,
}

async fn app(phrases: &[(&'static str, &'static str)]) -> App {
    let temp_dir = TempDir::new().unwrap();
    let repository = Arc::new(
        FileHistoryRepository::open(temp_dir.path().join("history.toml"))
            .await
            .unwrap(),
    );
    let observer = HistoryObserver::new(repository.clone());
    let client = Arc::new(PhraseBookClient::new(phrases));
    let handle = TranslateOrchestrator::spawn(
        client.clone(),
        repository.clone(),
        &observer,
        TranslateState::new(Language::ENGLISH, Language::FRENCH),
    );
    App {
        _temp_dir: temp_dir,
        repository,
        _observer: observer,
        client,
        handle,
    }
}

async fn wait<F>(handle: &TranslateHandle, predicate: F) -> TranslateState
where
    F: FnMut(&TranslateState) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), handle.wait_for(predicate))
        .await
        .expect("timed out waiting for state")
        .unwrap()
}

async fn translate(handle: &TranslateHandle, text: &str) -> TranslateState {
    handle
        .send(TranslateEvent::ChangeText(text.to_string()))
        .unwrap();
    handle.send(TranslateEvent::Translate).unwrap();
    wait(handle, |s| {
        s.from_text == text && !s.is_translating() && (s.is_showing_result() || s.error.is_some())
    })
    .await
}

#[tokio::test]
async fn test_hello_becomes_bonjour_and_is_recorded() {
    let app = app(&[("hello", "bonjour")]).await;

    let state = translate(&app.handle, "hello").await;
    assert_eq!(state.to_text, "bonjour");
    assert!(!state.is_translating());

    let state = wait(&app.handle, |s| s.history.len() == 1).await;
    assert_eq!(state.history[0].from_text, "hello");
    assert_eq!(state.history[0].to_text, "bonjour");
    assert_eq!(state.history[0].from_language, Language::ENGLISH);
    assert_eq!(state.history[0].to_language, Language::FRENCH);

    let stored = app.repository.list().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, Some(1));
}

#[tokio::test]
async fn test_empty_text_never_reaches_the_client() {
    let app = app(&[]).await;
    app.handle.send(TranslateEvent::Translate).unwrap();
    app.handle.send(TranslateEvent::SwapLanguages).unwrap();

    let state = wait(&app.handle, |s| s.from_language == Language::FRENCH).await;
    assert!(!state.is_translating());
    assert_eq!(*app.client.calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_unavailable_service_leaves_history_alone() {
    let app = app(&[("hello", "bonjour")]).await;
    translate(&app.handle, "hello").await;
    wait(&app.handle, |s| s.history.len() == 1).await;

    app.handle.send(TranslateEvent::CloseTranslation).unwrap();
    let state = translate(&app.handle, "unknown phrase").await;
    assert_eq!(state.error, Some(TranslateError::ServiceUnavailable));
    assert!(!state.is_translating());

    // Let any stray write land before checking.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(app.repository.len().await, 1);
    assert_eq!(app.handle.state().history.len(), 1);
}

#[tokio::test]
async fn test_history_grows_with_each_success() {
    let phrases = [("one", "un"), ("two", "deux"), ("three", "trois")];
    let app = app(&phrases).await;

    for (count, (text, _)) in phrases.iter().enumerate() {
        translate(&app.handle, text).await;
        wait(&app.handle, |s| s.history.len() == count + 1).await;
        app.handle.send(TranslateEvent::CloseTranslation).unwrap();
    }

    let state = wait(&app.handle, |s| s.phase == TranslatePhase::Idle).await;
    let ids: Vec<i64> = state.history.iter().rev().map(|item| item.id).collect();
    assert_eq!(ids.len(), 3);
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(state.history[0].from_text, "three");
}

#[tokio::test]
async fn test_picking_history_restores_a_result() {
    let app = app(&[("hello", "bonjour")]).await;
    app.handle
        .send(TranslateEvent::ChangeText("draft".to_string()))
        .unwrap();
    app.handle
        .send(TranslateEvent::SelectHistoryItem(UiHistoryItem {
            id: 12,
            from_language: Language::ENGLISH,
            from_text: "hi".to_string(),
            to_language: Language::FRENCH,
            to_text: "salut".to_string(),
        }))
        .unwrap();

    let state = wait(&app.handle, |s| s.is_showing_result()).await;
    assert_eq!(state.from_text, "hi");
    assert_eq!(state.to_text, "salut");
    assert_eq!(state.from_language, Language::ENGLISH);
    assert_eq!(state.to_language, Language::FRENCH);
}

#[tokio::test]
async fn test_blank_reply_is_an_error_and_not_recorded() {
    let app = app(&[("hello", "bonjour"), ("silence", " ")]).await;
    translate(&app.handle, "hello").await;
    wait(&app.handle, |s| s.history.len() == 1).await;

    app.handle.send(TranslateEvent::CloseTranslation).unwrap();
    let state = translate(&app.handle, "silence").await;
    assert_eq!(state.error, Some(TranslateError::UnknownError));
    assert!(!state.is_showing_result());
    assert!(state.to_text.is_empty());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(app.repository.len().await, 1);
    assert_eq!(app.handle.state().history.len(), 1);
}
