use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use tracing::{error, info, warn};

use crate::{
    config::AppConfig,
    error::AppError,
    models::trip::{round2, TripInput, TripRecord},
    services::storage::TripStore,
};

/// Turns raw form input into a `TripRecord`, deriving miles and reimbursement.
#[derive(Debug, Clone, Copy)]
pub struct TripBuilder {
    rate: f64,
    timezone: Tz,
    record_timestamps: bool,
}

impl TripBuilder {
    pub fn new(rate: f64, timezone: Tz, record_timestamps: bool) -> Self {
        Self {
            rate,
            timezone,
            record_timestamps,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.reimbursement_rate,
            config.timezone,
            config.record_timestamps,
        )
    }

    /// Validates in order: required text fields, then odometer range.
    pub fn build(&self, input: TripInput, now: DateTime<Utc>) -> Result<TripRecord, AppError> {
        let driver = input.driver.trim();
        if driver.is_empty() {
            return Err(AppError::MissingField("driver name"));
        }
        let job = input.job.trim();
        if job.is_empty() {
            return Err(AppError::MissingField("job or client"));
        }

        let (start, end) = (input.odometer_start, input.odometer_end);
        if !start.is_finite() || !end.is_finite() || start < 0.0 || end <= start {
            return Err(AppError::InvalidRange { start, end });
        }

        let miles = round2(end - start);
        let reimbursement = round2(miles * self.rate);
        let logged_at = if self.record_timestamps {
            now.with_timezone(&self.timezone)
                .naive_local()
                .with_nanosecond(0)
        } else {
            None
        };

        Ok(TripRecord {
            date: input.date,
            driver: driver.to_string(),
            job: job.to_string(),
            odometer_start: start,
            odometer_end: end,
            miles,
            reimbursement,
            notes: input.notes,
            logged_at,
        })
    }

    /// Builds the record and appends it. Nothing is written when validation fails.
    pub async fn submit(
        &self,
        store: &dyn TripStore,
        input: TripInput,
    ) -> Result<TripRecord, AppError> {
        let record = match self.build(input, Utc::now()) {
            Ok(record) => record,
            Err(err) => {
                warn!("trip rejected: {err}");
                return Err(err);
            }
        };

        if let Err(err) = store.append_record(&record).await {
            error!("appending trip to {} failed: {err:#}", store.describe());
            return Err(AppError::Persistence(err));
        }

        info!(
            driver = %record.driver,
            miles = record.miles,
            reimbursement = record.reimbursement,
            "trip logged"
        );
        Ok(record)
    }
}
