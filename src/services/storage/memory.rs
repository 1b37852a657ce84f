use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::TripStore;
use crate::models::trip::TripRecord;

/// Process-local log, gone on restart.
#[derive(Clone, Default)]
pub struct MemoryTripStore {
    records: Arc<RwLock<Vec<TripRecord>>>,
}

impl MemoryTripStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<TripRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }
}

#[async_trait]
impl TripStore for MemoryTripStore {
    async fn append_record(&self, record: &TripRecord) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("failed to acquire write lock: {e}"))?;
        records.push(record.clone());
        Ok(())
    }

    async fn read_all_records(&self) -> Result<Vec<TripRecord>> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("failed to acquire read lock: {e}"))?;
        Ok(records.clone())
    }

    fn describe(&self) -> String {
        "in-memory log".to_string()
    }
}
