use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::Row;

use super::TripStore;
use crate::{db::DbPool, error::AppError, models::trip::TripRecord};

/// The `trips` table, one row per trip, ordered by its autoincrement id.
#[derive(Clone)]
pub struct SqliteTripStore {
    db: DbPool,
}

impl SqliteTripStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .map_err(|err| AppError::Other(err.into()))
    }
}

#[async_trait]
impl TripStore for SqliteTripStore {
    async fn append_record(&self, record: &TripRecord) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO trips (date, driver, job, odo_start, odo_end, miles, reimbursement, notes, logged_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
        )
        .bind(record.date)
        .bind(&record.driver)
        .bind(&record.job)
        .bind(record.odometer_start)
        .bind(record.odometer_end)
        .bind(record.miles)
        .bind(record.reimbursement)
        .bind(&record.notes)
        .bind(record.logged_at)
        .execute(&self.db)
        .await
        .context("inserting trip row")?;
        Ok(())
    }

    async fn read_all_records(&self) -> Result<Vec<TripRecord>> {
        let rows = sqlx::query(
            r#"SELECT date, driver, job, odo_start, odo_end, miles, reimbursement, notes, logged_at
               FROM trips ORDER BY id"#,
        )
        .fetch_all(&self.db)
        .await
        .context("selecting trip rows")?;

        rows.into_iter()
            .map(|row| -> Result<TripRecord> {
                Ok(TripRecord {
                    date: row.try_get::<NaiveDate, _>("date")?,
                    driver: row.try_get("driver")?,
                    job: row.try_get("job")?,
                    odometer_start: row.try_get("odo_start")?,
                    odometer_end: row.try_get("odo_end")?,
                    miles: row.try_get("miles")?,
                    reimbursement: row.try_get("reimbursement")?,
                    notes: row.try_get("notes")?,
                    logged_at: row.try_get::<Option<NaiveDateTime>, _>("logged_at")?,
                })
            })
            .collect()
    }

    fn describe(&self) -> String {
        "sqlite table trips".to_string()
    }
}
