use anyhow::{Context, Result};

use crate::models::trip::{TripRecord, COLUMNS};

pub const EXPORT_FILE_NAME: &str = "filtered_trip_log.csv";

/// Serializes records in the fixed column order. The header is written
/// explicitly so an empty selection still yields a header row.
pub fn write_rows(records: &[TripRecord], with_header: bool) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    if with_header {
        writer.write_record(COLUMNS)?;
    }
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("serializing trip of {} on {}", record.driver, record.date))?;
    }
    writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("flushing csv writer: {}", err.error()))
}

pub fn to_csv(records: &[TripRecord]) -> Result<String> {
    let bytes = write_rows(records, true)?;
    String::from_utf8(bytes).context("csv export is not valid utf-8")
}
