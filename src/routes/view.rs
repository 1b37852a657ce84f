use num_format::{Locale, ToFormattedString};

use crate::models::trip::TripRecord;

/// Table row with every cell already formatted for display.
#[derive(Clone)]
pub struct TripRow {
    pub date: String,
    pub driver: String,
    pub job: String,
    pub odometer_start: String,
    pub odometer_end: String,
    pub miles: String,
    pub reimbursement: String,
    pub notes: String,
    pub logged_at: String,
}

impl From<&TripRecord> for TripRow {
    fn from(record: &TripRecord) -> Self {
        Self {
            date: record.date.format("%Y-%m-%d").to_string(),
            driver: record.driver.clone(),
            job: record.job.clone(),
            odometer_start: record.odometer_start.to_string(),
            odometer_end: record.odometer_end.to_string(),
            miles: format!("{:.2}", record.miles),
            reimbursement: format!("{:.2}", record.reimbursement),
            notes: record.notes.clone(),
            logged_at: record.logged_at_text(),
        }
    }
}

pub fn rows(records: &[TripRecord]) -> Vec<TripRow> {
    records.iter().map(TripRow::from).collect()
}

/// `1234.5` becomes `1,234.50`.
pub fn format_amount(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    let whole = (cents / 100).to_formatted_string(&Locale::en);
    format!("{sign}{whole}.{:02}", cents % 100)
}
