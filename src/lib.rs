//! HealthLog: per-user personal health tracking
//!
//! HealthLog keeps vitals, medicines, water intake, activities and doctor
//! appointments for each user in a string key-value store, with a small
//! REST layer on top.

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod records;
pub mod storage;
pub mod tracker;

use std::sync::Arc;
use tracing::info;

pub use config::{Config, StorageBackend, StorageConfig};
pub use error::{ConfigError, Result, StoreError, TrackerError};
pub use storage::{EntityStore, FileStore, KeyValueStore, MemoryStore};
pub use tracker::Tracker;

/// Open the backend selected by `storage.backend`.
pub fn open_backend(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>, StoreError> {
    match config.backend {
        StorageBackend::Memory => {
            info!("using in-memory storage");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::File => {
            info!(path = %config.path, "using file storage");
            Ok(Arc::new(FileStore::new(&config.path)?))
        }
    }
}

/// Build a tracker on the system clock from a loaded configuration.
pub fn build_tracker(config: &Config) -> Result<Tracker> {
    let backend = open_backend(&config.storage)?;
    let tracker = Tracker::with_system_clock(backend, config.tracking.clone());
    if config.tracking.seed_demo_user {
        tracker.profiles().seed_demo_user()?;
    }
    Ok(tracker)
}
