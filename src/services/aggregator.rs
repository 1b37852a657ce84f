use tracing::{debug, error};

use crate::{
    error::AppError,
    models::{filter::TripFilter, trip::TripRecord},
    services::{export, storage::TripStore},
};

/// Filtered slice of the log with its totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripSummary {
    pub records: Vec<TripRecord>,
    pub total_miles: f64,
    pub total_reimbursement: f64,
}

impl TripSummary {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn to_csv(&self) -> Result<String, AppError> {
        export::to_csv(&self.records).map_err(AppError::Other)
    }
}

pub async fn load_history(store: &dyn TripStore) -> Result<Vec<TripRecord>, AppError> {
    match store.read_all_records().await {
        Ok(records) => {
            debug!("loaded {} trips from {}", records.len(), store.describe());
            Ok(records)
        }
        Err(err) => {
            error!("loading trips from {} failed: {err:#}", store.describe());
            Err(AppError::Load(err))
        }
    }
}

/// Keeps the records passing every active predicate, in log order, and totals them.
pub fn summarize(records: &[TripRecord], filter: &TripFilter) -> TripSummary {
    let records: Vec<TripRecord> = records
        .iter()
        .filter(|record| filter.matches(record))
        .cloned()
        .collect();
    let total_miles = records.iter().fold(0.0, |acc, r| acc + r.miles);
    let total_reimbursement = records.iter().fold(0.0, |acc, r| acc + r.reimbursement);
    TripSummary {
        records,
        total_miles,
        total_reimbursement,
    }
}

/// Distinct driver names in order of first appearance.
pub fn drivers(records: &[TripRecord]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for record in records {
        if !seen.iter().any(|name| name == &record.driver) {
            seen.push(record.driver.clone());
        }
    }
    seen
}
