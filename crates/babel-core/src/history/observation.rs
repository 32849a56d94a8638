//! Observation bridge between a history store and its consumers.
//!
//! A store only announces *that* something changed ([`HistoryChange`]).
//! [`HistoryObserver`] turns those announcements into a stream of full,
//! newest-first collections:
//!
//! - one shared pump task per observer, started by the first consumer, no
//!   matter how many consumers attach afterwards
//! - every new consumer immediately receives the latest known collection
//!   (replay-latest, not replay-all)
//! - dropping a [`HistoryStream`] detaches it; the pump lives as long as the
//!   observer that owns it

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::model::{HistoryChange, HistoryItem};
use super::repository::HistoryRepository;

/// An immutable, newest-first view of the whole history.
pub type HistorySnapshot = Arc<Vec<HistoryItem>>;

type SnapshotReceiver = watch::Receiver<Option<HistorySnapshot>>;
type SnapshotSender = watch::Sender<Option<HistorySnapshot>>;

#[derive(Default)]
struct PumpState {
    handle: Option<JoinHandle<()>>,
    /// Template receiver cloned for each new consumer.
    receiver: Option<SnapshotReceiver>,
    closed: bool,
}

struct Shared {
    pump: Mutex<PumpState>,
    subscribers: AtomicUsize,
}

impl Shared {
    fn lock_pump(&self) -> MutexGuard<'_, PumpState> {
        self.pump.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shares one store subscription between any number of consumers.
pub struct HistoryObserver {
    repository: Arc<dyn HistoryRepository>,
    shared: Arc<Shared>,
}

impl HistoryObserver {
    pub fn new(repository: Arc<dyn HistoryRepository>) -> Self {
        Self {
            repository,
            shared: Arc::new(Shared {
                pump: Mutex::new(PumpState::default()),
                subscribers: AtomicUsize::new(0),
            }),
        }
    }

    /// Attaches a new consumer.
    ///
    /// Starts the shared pump on first use, so this must be called from within
    /// a Tokio runtime. After [`shutdown`](Self::shutdown) the returned stream
    /// is already finished.
    pub fn observe(&self) -> HistoryStream {
        let receiver = {
            let mut pump = self.shared.lock_pump();
            if pump.closed {
                None
            } else {
                let running = pump
                    .handle
                    .as_ref()
                    .is_some_and(|handle| !handle.is_finished());
                if !running {
                    let (sender, receiver) = watch::channel(None);
                    pump.handle = Some(tokio::spawn(run_pump(self.repository.clone(), sender)));
                    pump.receiver = Some(receiver);
                    tracing::debug!("[HistoryObserver] Started shared history subscription");
                }
                pump.receiver.clone()
            }
        };

        let mut receiver = receiver.unwrap_or_else(|| watch::channel(None).1);
        receiver.mark_changed();

        let count = self.shared.subscribers.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("[HistoryObserver] Consumer attached ({} active)", count);

        HistoryStream {
            receiver,
            shared: self.shared.clone(),
        }
    }

    /// The most recent collection read from the store, if any.
    pub fn latest(&self) -> Option<HistorySnapshot> {
        let pump = self.shared.lock_pump();
        pump.receiver
            .as_ref()
            .and_then(|receiver| receiver.borrow().clone())
    }

    /// Number of attached consumers.
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.load(Ordering::SeqCst)
    }

    /// Whether the shared pump task is currently running.
    pub fn is_subscribed(&self) -> bool {
        let pump = self.shared.lock_pump();
        pump.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stops the shared subscription. Attached streams finish; later calls to
    /// [`observe`](Self::observe) return finished streams.
    pub fn shutdown(&self) {
        let mut pump = self.shared.lock_pump();
        if pump.closed {
            return;
        }
        pump.closed = true;
        pump.receiver = None;
        if let Some(handle) = pump.handle.take() {
            handle.abort();
            tracing::debug!("[HistoryObserver] Shared history subscription stopped");
        }
    }
}

impl Drop for HistoryObserver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// A consumer's view of the history. Dropping it detaches the consumer.
pub struct HistoryStream {
    receiver: SnapshotReceiver,
    shared: Arc<Shared>,
}

impl HistoryStream {
    /// Waits for the next collection.
    ///
    /// The first call returns the latest known collection right away (or
    /// waits for the initial read). Returns `None` once the observer has shut
    /// down.
    pub async fn next(&mut self) -> Option<HistorySnapshot> {
        loop {
            if self.receiver.changed().await.is_err() {
                return None;
            }
            if let Some(snapshot) = self.receiver.borrow_and_update().clone() {
                return Some(snapshot);
            }
        }
    }

    /// The latest collection without waiting.
    pub fn current(&self) -> Option<HistorySnapshot> {
        self.receiver.borrow().clone()
    }
}

impl Drop for HistoryStream {
    fn drop(&mut self) {
        let remaining = self.shared.subscribers.fetch_sub(1, Ordering::SeqCst) - 1;
        tracing::debug!("[HistoryObserver] Consumer detached ({} active)", remaining);
    }
}

async fn run_pump(repository: Arc<dyn HistoryRepository>, sender: SnapshotSender) {
    // Subscribe before the first read so an insert in between is not missed.
    let mut changes = repository.changes();
    publish(repository.as_ref(), &sender).await;

    loop {
        match changes.recv().await {
            Ok(HistoryChange::Inserted { id }) => {
                tracing::debug!("[HistoryObserver] History record {} inserted", id);
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(
                    "[HistoryObserver] Missed {} change notifications, re-reading history",
                    skipped
                );
            }
            Err(RecvError::Closed) => {
                tracing::debug!("[HistoryObserver] History store closed its change feed");
                break;
            }
        }
        publish(repository.as_ref(), &sender).await;
    }
}

async fn publish(repository: &dyn HistoryRepository, sender: &SnapshotSender) {
    match repository.list().await {
        Ok(items) => {
            sender.send_replace(Some(Arc::new(items)));
        }
        Err(e) => {
            tracing::error!("[HistoryObserver] Failed to read history: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::language::Language;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::broadcast;

    // Mock HistoryRepository for testing
    struct MockHistoryRepository {
        items: Mutex<Vec<HistoryItem>>,
        changes: broadcast::Sender<HistoryChange>,
        subscriptions: AtomicUsize,
    }

    impl MockHistoryRepository {
        fn new() -> Self {
            Self {
                items: Mutex::new(Vec::new()),
                changes: broadcast::channel(16).0,
                subscriptions: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl HistoryRepository for MockHistoryRepository {
        async fn insert(&self, mut item: HistoryItem) -> Result<HistoryItem> {
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
            let items = self.items.lock().unwrap();
            Ok(items.iter().rev().cloned().collect())
        }

        fn changes(&self) -> broadcast::Receiver<HistoryChange> {
            self.subscriptions.fetch_add(1, Ordering::SeqCst);
            self.changes.subscribe()
        }
    }

    fn item(text: &str) -> HistoryItem {
        HistoryItem::new(Language::ENGLISH, text, Language::GERMAN, text.to_uppercase())
    }

    async fn next_with_len(stream: &mut HistoryStream, len: usize) -> HistorySnapshot {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let snapshot = stream.next().await.expect("stream ended");
                if snapshot.len() == len {
                    return snapshot;
                }
            }
        })
        .await
        .expect("timed out waiting for history")
    }

    #[tokio::test]
    async fn test_first_value_is_current_collection() {
        let repo = Arc::new(MockHistoryRepository::new());
        repo.insert(item("one")).await.unwrap();
        let observer = HistoryObserver::new(repo.clone());

        let mut stream = observer.observe();
        let snapshot = next_with_len(&mut stream, 1).await;
        assert_eq!(snapshot[0].from_text, "one");
    }

    #[tokio::test]
    async fn test_pushes_after_each_insert_newest_first() {
        let repo = Arc::new(MockHistoryRepository::new());
        let observer = HistoryObserver::new(repo.clone());
        let mut stream = observer.observe();
        next_with_len(&mut stream, 0).await;

        repo.insert(item("one")).await.unwrap();
        next_with_len(&mut stream, 1).await;

        repo.insert(item("two")).await.unwrap();
        let snapshot = next_with_len(&mut stream, 2).await;
        assert_eq!(snapshot[0].from_text, "two");
        assert_eq!(snapshot[1].from_text, "one");
    }

    #[tokio::test]
    async fn test_single_underlying_subscription() {
        let repo = Arc::new(MockHistoryRepository::new());
        let observer = HistoryObserver::new(repo.clone());

        let mut first = observer.observe();
        let mut second = observer.observe();
        let _third = observer.observe();
        next_with_len(&mut first, 0).await;
        next_with_len(&mut second, 0).await;

        assert_eq!(repo.subscriptions.load(Ordering::SeqCst), 1);
        assert_eq!(observer.subscriber_count(), 3);
        assert!(observer.is_subscribed());
    }

    #[tokio::test]
    async fn test_late_consumer_gets_latest_immediately() {
        let repo = Arc::new(MockHistoryRepository::new());
        let observer = HistoryObserver::new(repo.clone());
        let mut early = observer.observe();

        repo.insert(item("one")).await.unwrap();
        repo.insert(item("two")).await.unwrap();
        next_with_len(&mut early, 2).await;

        let mut late = observer.observe();
        let snapshot = tokio::time::timeout(Duration::from_millis(100), late.next())
            .await
            .expect("late consumer should not wait")
            .unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(observer.latest().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_dropping_consumers_detaches_them() {
        let repo = Arc::new(MockHistoryRepository::new());
        let observer = HistoryObserver::new(repo.clone());

        let mut first = observer.observe();
        let second = observer.observe();
        next_with_len(&mut first, 0).await;
        assert_eq!(observer.subscriber_count(), 2);

        drop(first);
        assert_eq!(observer.subscriber_count(), 1);
        drop(second);
        assert_eq!(observer.subscriber_count(), 0);

        // The shared subscription outlives its consumers.
        let _again = observer.observe();
        assert_eq!(repo.subscriptions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shutdown_finishes_streams() {
        let repo = Arc::new(MockHistoryRepository::new());
        let observer = HistoryObserver::new(repo.clone());
        let mut stream = observer.observe();
        next_with_len(&mut stream, 0).await;

        observer.shutdown();
        let ended = tokio::time::timeout(Duration::from_secs(2), stream.next())
            .await
            .expect("stream should finish after shutdown");
        assert!(ended.is_none());

        let mut after = observer.observe();
        assert!(after.next().await.is_none());
    }
}
