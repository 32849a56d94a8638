//! Translation history domain models, the store contract and the
//! observation bridge.

mod model;
mod observation;
mod repository;

pub use model::{HistoryChange, HistoryItem, UiHistoryItem};
pub use observation::{HistoryObserver, HistorySnapshot, HistoryStream};
pub use repository::HistoryRepository;
