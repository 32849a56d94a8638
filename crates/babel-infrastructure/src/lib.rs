//! Infrastructure layer for Babel: durable history storage, configuration
//! loading and platform paths.

pub mod config_service;
pub mod file_history_repository;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::file_history_repository::FileHistoryRepository;
pub use crate::paths::BabelPaths;
