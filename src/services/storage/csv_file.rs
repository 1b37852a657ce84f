use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};
use tracing::info;

use super::TripStore;
use crate::{
    models::trip::{TripRecord, COLUMNS},
    services::export::write_rows,
};

/// Flat CSV file with a header row, one trip per line.
#[derive(Clone)]
pub struct CsvTripStore {
    path: Arc<PathBuf>,
    write_lock: Arc<Mutex<()>>,
}

impl CsvTripStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path: Arc::new(path),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_raw(&self) -> Result<Option<Vec<u8>>> {
        if !fs::try_exists(self.path()).await? {
            return Ok(None);
        }
        let raw = fs::read(self.path())
            .await
            .with_context(|| format!("reading {}", self.path().display()))?;
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(raw))
    }

    async fn rewrite(&self, records: &[TripRecord]) -> Result<()> {
        let data = write_rows(records, true)?;
        if let Some(parent) = self.path().parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(self.path(), data)
            .await
            .with_context(|| format!("writing {}", self.path().display()))?;
        Ok(())
    }
}

fn parse_records(raw: &[u8]) -> Result<Vec<TripRecord>> {
    csv::Reader::from_reader(raw)
        .deserialize::<TripRecord>()
        .enumerate()
        .map(|(i, row)| row.with_context(|| format!("invalid trip log row {}", i + 1)))
        .collect()
}

fn has_current_header(raw: &[u8]) -> Result<bool> {
    let mut reader = csv::Reader::from_reader(raw);
    let headers = reader.headers().context("reading trip log header")?;
    Ok(headers.iter().eq(COLUMNS.iter().copied()))
}

#[async_trait]
impl TripStore for CsvTripStore {
    async fn append_record(&self, record: &TripRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let Some(raw) = self.read_raw().await? else {
            return self.rewrite(std::slice::from_ref(record)).await;
        };

        if !has_current_header(&raw)? {
            let mut records = parse_records(&raw)?;
            info!(path = %self.path().display(), "upgrading trip log header");
            records.push(record.clone());
            return self.rewrite(&records).await;
        }

        let mut line = write_rows(std::slice::from_ref(record), false)?;
        if !raw.ends_with(b"\n") {
            line.insert(0, b'\n');
        }
        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(self.path())
            .await
            .with_context(|| format!("opening {}", self.path().display()))?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }

    async fn read_all_records(&self) -> Result<Vec<TripRecord>> {
        match self.read_raw().await? {
            Some(raw) => parse_records(&raw),
            None => Ok(Vec::new()),
        }
    }

    fn describe(&self) -> String {
        format!("csv file {}", self.path().display())
    }
}
