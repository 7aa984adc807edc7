//! Storage backends for monitors and check history
//!
//! ## Design
//!
//! - **Trait-based**: [`MonitorRegistry`] and [`ResultStore`] are the only
//!   storage interfaces the scheduler and aggregator depend on
//! - **Async**: All operations are async for compatibility with Tokio tasks
//! - **Count-based retention**: each insert trims the monitor's history to a cap
//!
//! ## Backends
//!
//! - **SQLite** (default): Embedded database file
//! - **In-Memory**: No persistence, for testing or throwaway runs
//!
//! ## Usage
//!
//! ```no_run
//! use uptime_monitor::storage::{Storage, sqlite::SqliteBackend};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let storage = Storage::new(SqliteBackend::new("./uptime.db").await?);
//!     let monitors = storage.registry.get_all().await?;
//!     println!("{} monitors registered", monitors.len());
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod error;
pub mod memory;
#[cfg(feature = "storage-sqlite")]
pub mod schema;
#[cfg(feature = "storage-sqlite")]
pub mod sqlite;

use tracing::info;

pub use backend::{HealthStatus, MonitorRegistry, ResultStore, Storage, StorageBackend};
pub use error::{StorageError, StorageResult};

use crate::config::StorageConfig;

/// Open the backend described by the configuration
pub async fn open(config: &StorageConfig, max_results_per_monitor: usize) -> StorageResult<Storage> {
    match config {
        StorageConfig::None => {
            info!("using in-memory storage (no persistence)");
            Ok(Storage::new(memory::MemoryBackend::with_retention(
                max_results_per_monitor,
            )))
        }
        #[cfg(feature = "storage-sqlite")]
        StorageConfig::Sqlite { path } => {
            let backend = sqlite::SqliteBackend::new(path)
                .await?
                .with_retention(max_results_per_monitor);
            Ok(Storage::new(backend))
        }
        #[cfg(not(feature = "storage-sqlite"))]
        StorageConfig::Sqlite { .. } => Err(StorageError::InvalidConfig(
            "sqlite backend requested but the storage-sqlite feature is disabled".to_string(),
        )),
    }
}
