use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};

use super::trip::TripRecord;

/// Inclusive calendar range. Either bound may be left open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(Some(start), Some(end))
    }

    pub fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }

    /// Same as `[start 00:00, end + 1 day 00:00)`: the end day is covered up to midnight.
    pub fn contains_instant(&self, instant: NaiveDateTime) -> bool {
        self.contains(instant.date())
    }
}

/// Optional predicates combined with logical AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripFilter {
    pub drivers: BTreeSet<String>,
    pub date_range: DateRange,
    pub logged_at_range: DateRange,
    pub job_contains: Option<String>,
}

impl TripFilter {
    pub fn with_drivers<I, S>(mut self, drivers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.drivers = drivers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = range;
        self
    }

    pub fn with_logged_at_range(mut self, range: DateRange) -> Self {
        self.logged_at_range = range;
        self
    }

    pub fn with_job_contains(mut self, needle: impl Into<String>) -> Self {
        let needle = needle.into();
        self.job_contains = if needle.trim().is_empty() {
            None
        } else {
            Some(needle)
        };
        self
    }

    pub fn matches(&self, record: &TripRecord) -> bool {
        if !self.drivers.is_empty() && !self.drivers.contains(&record.driver) {
            return false;
        }
        if !self.date_range.contains(record.date) {
            return false;
        }
        if !self.logged_at_range.is_open() {
            // Records without a timestamp cannot satisfy a timestamp range.
            match record.logged_at {
                Some(ts) if self.logged_at_range.contains_instant(ts) => {}
                _ => return false,
            }
        }
        if let Some(needle) = &self.job_contains {
            if !record.job.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        true
    }
}
