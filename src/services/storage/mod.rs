//! Append-only trip log backends.

mod csv_file;
mod memory;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    config::{AppConfig, StorageBackend},
    db::init_pool,
    error::AppError,
    models::trip::TripRecord,
};

pub use csv_file::CsvTripStore;
pub use memory::MemoryTripStore;
pub use sqlite::SqliteTripStore;

/// The tabular store behind the trip log. Records come back in append order.
#[async_trait]
pub trait TripStore: Send + Sync {
    async fn append_record(&self, record: &TripRecord) -> anyhow::Result<()>;

    async fn read_all_records(&self) -> anyhow::Result<Vec<TripRecord>>;

    fn describe(&self) -> String;
}

pub type SharedTripStore = Arc<dyn TripStore>;

pub async fn connect(config: &AppConfig) -> Result<SharedTripStore, AppError> {
    let store: SharedTripStore = match config.storage {
        StorageBackend::Csv => Arc::new(CsvTripStore::new(config.trip_log_path.clone())),
        StorageBackend::Sqlite => {
            let pool = init_pool(&config.database_url).await?;
            let store = SqliteTripStore::new(pool);
            store.migrate().await?;
            Arc::new(store)
        }
        StorageBackend::Memory => Arc::new(MemoryTripStore::new()),
    };
    Ok(store)
}
