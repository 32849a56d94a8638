//! Actor that owns the translate screen state.
//!
//! All mutation happens on one task, one message at a time. Three sources feed
//! it: UI events from [`TranslateHandle`]s, outcomes of spawned translation
//! calls, and history snapshots from the observation bridge. Each new state is
//! published on a `watch` channel, so readers always see the latest state and
//! never a backlog.

use std::sync::Arc;

use babel_core::error::{BabelError, Result};
use babel_core::history::{
    HistoryItem, HistoryObserver, HistoryRepository, HistorySnapshot, HistoryStream, UiHistoryItem,
};
use babel_core::translate::{TranslateClient, TranslateError};
use tokio::sync::{mpsc, watch};

use super::event::TranslateEvent;
use super::machine::{Effect, TranslateMachine, TranslationRequest};
use super::state::TranslateState;

/// Result of a spawned translation call, tagged with its generation.
#[derive(Debug)]
struct Completion {
    generation: u64,
    outcome: std::result::Result<String, TranslateError>,
}

/// The UI's side of the orchestrator.
///
/// Cloneable. The orchestrator task stops once every handle is dropped.
#[derive(Clone)]
pub struct TranslateHandle {
    events: mpsc::UnboundedSender<TranslateEvent>,
    state: watch::Receiver<TranslateState>,
}

impl TranslateHandle {
    /// Queues `event` for processing.
    pub fn send(&self, event: TranslateEvent) -> Result<()> {
        self.events
            .send(event)
            .map_err(|e| {
                BabelError::internal(format!("Translate orchestrator stopped ({})", e.0.name()))
            })
    }

    /// The latest published state.
    pub fn state(&self) -> TranslateState {
        self.state.borrow().clone()
    }

    /// A receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<TranslateState> {
        self.state.clone()
    }

    /// Waits until the published state satisfies `predicate` and returns it.
    pub async fn wait_for<F>(&self, mut predicate: F) -> Result<TranslateState>
    where
        F: FnMut(&TranslateState) -> bool,
    {
        let mut receiver = self.state.clone();
        let state = receiver
            .wait_for(|state| predicate(state))
            .await
            .map_err(|_| BabelError::internal("Translate orchestrator stopped"))?;
        Ok(state.clone())
    }
}

/// Runs a [`TranslateMachine`] against a translation client and a history store.
pub struct TranslateOrchestrator {
    machine: TranslateMachine,
    client: Arc<dyn TranslateClient>,
    repository: Arc<dyn HistoryRepository>,
    state_tx: watch::Sender<TranslateState>,
    completions_tx: mpsc::UnboundedSender<Completion>,
}

impl TranslateOrchestrator {
    /// Starts the orchestrator task and returns the first handle to it.
    ///
    /// The history projection is fed from `observer`, which must observe the
    /// same store as `repository`. Must be called within a Tokio runtime.
    pub fn spawn(
        client: Arc<dyn TranslateClient>,
        repository: Arc<dyn HistoryRepository>,
        observer: &HistoryObserver,
        initial: TranslateState,
    ) -> TranslateHandle {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(initial.clone());

        let orchestrator = Self {
            machine: TranslateMachine::new(initial),
            client,
            repository,
            state_tx,
            completions_tx,
        };
        tokio::spawn(orchestrator.run(events_rx, completions_rx, observer.observe()));

        TranslateHandle {
            events: events_tx,
            state: state_rx,
        }
    }

    async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<TranslateEvent>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
        history: HistoryStream,
    ) {
        tracing::debug!("[TranslateOrchestrator] Started");
        let mut history = Some(history);

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    tracing::debug!("[TranslateOrchestrator] Event {}", event.name());
                    let effect = self.machine.apply(event);
                    self.publish();
                    if let Some(effect) = effect {
                        self.execute(effect);
                    }
                }
                Some(completion) = completions.recv() => {
                    let effect = self.machine.complete(completion.generation, completion.outcome);
                    self.publish();
                    if let Some(effect) = effect {
                        self.execute(effect);
                    }
                }
                snapshot = next_snapshot(&mut history) => {
                    match snapshot {
                        Some(items) => {
                            self.machine.set_history(UiHistoryItem::project(&items));
                            self.publish();
                        }
                        None => {
                            tracing::debug!("[TranslateOrchestrator] History feed ended");
                            history = None;
                        }
                    }
                }
            }
        }

        tracing::debug!("[TranslateOrchestrator] All handles dropped, stopping");
    }

    fn publish(&self) {
        let state = self.machine.state();
        self.state_tx.send_if_modified(|current| {
            if current == state {
                return false;
            }
            current.clone_from(state);
            true
        });
    }

    fn execute(&self, effect: Effect) {
        match effect {
            Effect::Translate(request) => self.spawn_translation(request),
            Effect::RecordHistory(item) => self.spawn_history_insert(item),
        }
    }

    fn spawn_translation(&self, request: TranslationRequest) {
        let client = self.client.clone();
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let outcome = client
                .translate(request.from, &request.text, request.to)
                .await;
            // The orchestrator may already be gone.
            let _ = completions.send(Completion {
                generation: request.generation,
                outcome,
            });
        });
    }

    fn spawn_history_insert(&self, item: HistoryItem) {
        let repository = self.repository.clone();
        tokio::spawn(async move {
            if let Err(e) = repository.insert(item).await {
                tracing::error!("[TranslateOrchestrator] Failed to record translation: {}", e);
            }
        });
    }
}

async fn next_snapshot(history: &mut Option<HistoryStream>) -> Option<HistorySnapshot> {
    match history {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use babel_core::Language;
    use babel_core::history::HistoryChange;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::{Semaphore, broadcast};

    use crate::translate::TranslatePhase;

    // Mock TranslateClient for testing. Calls block until a permit is released
    // through `gate`.
    struct MockTranslateClient {
        responses: Mutex<VecDeque<std::result::Result<String, TranslateError>>>,
        calls: Mutex<Vec<(Language, String, Language)>>,
        gate: Semaphore,
    }

    impl MockTranslateClient {
        fn new(responses: Vec<std::result::Result<String, TranslateError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
                gate: Semaphore::new(0),
            }
        }

        fn release(&self, count: usize) {
            self.gate.add_permits(count);
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TranslateClient for MockTranslateClient {
        async fn translate(
            &self,
            from: Language,
            text: &str,
            to: Language,
        ) -> std::result::Result<String, TranslateError> {
            self.calls
                .lock()
                .unwrap()
                .push((from, text.to_string(), to));
            self.gate.acquire().await.unwrap().forget();
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(TranslateError::UnknownError))
        }
    }

    // Mock HistoryRepository for testing
    struct MockHistoryRepository {
        items: Mutex<Vec<HistoryItem>>,
        changes: broadcast::Sender<HistoryChange>,
        inserts: AtomicUsize,
    }

    impl MockHistoryRepository {
        fn new() -> Self {
            Self {
                items: Mutex::new(Vec::new()),
                changes: broadcast::channel(16).0,
                inserts: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl HistoryRepository for MockHistoryRepository {
        async fn insert(&self, mut item: HistoryItem) -> Result<HistoryItem> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            let id = {
                let mut items = self.items.lock().unwrap();
                let id = items.len() as i64 + 1;
                item.id = Some(id);
                items.push(item.clone());
                id
            };
            let _ = self.changes.send(HistoryChange::Inserted { id });
            Ok(item)
        }

        async fn list(&self) -> Result<Vec<HistoryItem>> {
            Ok(self.items.lock().unwrap().iter().rev().cloned().collect())
        }

        fn changes(&self) -> broadcast::Receiver<HistoryChange> {
            self.changes.subscribe()
        }
    }

    struct Fixture {
        client: Arc<MockTranslateClient>,
        repository: Arc<MockHistoryRepository>,
        _observer: HistoryObserver,
        handle: TranslateHandle,
    }

    fn fixture(responses: Vec<std::result::Result<String, TranslateError>>) -> Fixture {
        let client = Arc::new(MockTranslateClient::new(responses));
        let repository = Arc::new(MockHistoryRepository::new());
        let observer = HistoryObserver::new(repository.clone());
        let handle = TranslateOrchestrator::spawn(
            client.clone(),
            repository.clone(),
            &observer,
            TranslateState::new(Language::ENGLISH, Language::FRENCH),
        );
        Fixture {
            client,
            repository,
            _observer: observer,
            handle,
        }
    }

    async fn wait<F>(handle: &TranslateHandle, predicate: F) -> TranslateState
    where
        F: FnMut(&TranslateState) -> bool,
    {
        tokio::time::timeout(Duration::from_secs(2), handle.wait_for(predicate))
            .await
            .expect("timed out waiting for state")
            .unwrap()
    }

    #[tokio::test]
    async fn test_translation_updates_state_and_history() {
        let f = fixture(vec![Ok("bonjour".to_string())]);
        f.handle
            .send(TranslateEvent::ChangeText("hello".to_string()))
            .unwrap();
        f.handle.send(TranslateEvent::Translate).unwrap();
        wait(&f.handle, |s| s.is_translating()).await;

        f.client.release(1);
        let state = wait(&f.handle, |s| s.is_showing_result()).await;
        assert_eq!(state.to_text, "bonjour");
        assert!(state.error.is_none());

        let state = wait(&f.handle, |s| s.history.len() == 1).await;
        assert_eq!(state.history[0].from_text, "hello");
        assert_eq!(state.history[0].to_text, "bonjour");
    }

    #[tokio::test]
    async fn test_second_translate_while_in_flight_is_ignored() {
        let f = fixture(vec![Ok("bonjour".to_string())]);
        f.handle
            .send(TranslateEvent::ChangeText("hello".to_string()))
            .unwrap();
        f.handle.send(TranslateEvent::Translate).unwrap();
        f.handle.send(TranslateEvent::Translate).unwrap();
        wait(&f.handle, |s| s.is_translating()).await;

        f.client.release(2);
        wait(&f.handle, |s| s.history.len() == 1).await;
        assert_eq!(f.client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_sets_error_without_history() {
        let f = fixture(vec![Err(TranslateError::ServiceUnavailable)]);
        f.handle
            .send(TranslateEvent::ChangeText("hello".to_string()))
            .unwrap();
        f.handle.send(TranslateEvent::Translate).unwrap();
        f.client.release(1);

        let state = wait(&f.handle, |s| s.error.is_some()).await;
        assert_eq!(state.error, Some(TranslateError::ServiceUnavailable));
        assert_eq!(state.phase, TranslatePhase::Editing);
        assert_eq!(f.repository.inserts.load(Ordering::SeqCst), 0);

        f.handle.send(TranslateEvent::OnErrorSeen).unwrap();
        wait(&f.handle, |s| s.error.is_none()).await;
    }

    #[tokio::test]
    async fn test_response_after_close_is_discarded() {
        let f = fixture(vec![Ok("bonjour".to_string())]);
        f.handle
            .send(TranslateEvent::ChangeText("hello".to_string()))
            .unwrap();
        f.handle.send(TranslateEvent::Translate).unwrap();
        wait(&f.handle, |s| s.is_translating()).await;

        f.handle.send(TranslateEvent::CloseTranslation).unwrap();
        wait(&f.handle, |s| s.phase == TranslatePhase::Idle).await;

        f.client.release(1);
        // Give the stale completion time to arrive and be dropped.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let state = f.handle.state();
        assert!(state.to_text.is_empty());
        assert_eq!(state.phase, TranslatePhase::Idle);
        assert_eq!(f.repository.inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_text_makes_no_call() {
        let f = fixture(vec![]);
        f.handle.send(TranslateEvent::Translate).unwrap();
        f.handle.send(TranslateEvent::OpenToLanguageDropDown).unwrap();

        let state = wait(&f.handle, |s| s.is_choosing_to_language()).await;
        assert!(!state.is_translating());
        assert_eq!(f.client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_stops_when_handles_dropped() {
        let Fixture {
            client: _client,
            repository: _repository,
            _observer: observer,
            handle,
        } = fixture(vec![]);
        let second = handle.clone();
        wait(&handle, |_| true).await;
        assert_eq!(observer.subscriber_count(), 1);

        drop(handle);
        second.send(TranslateEvent::OnErrorSeen).unwrap();
        drop(second);

        tokio::time::timeout(Duration::from_secs(2), async {
            while observer.subscriber_count() > 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("orchestrator should detach from history");
    }
}
