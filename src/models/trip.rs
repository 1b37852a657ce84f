use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Column order shared by every store and by the CSV export.
pub const COLUMNS: [&str; 9] = [
    "Date",
    "Driver",
    "Job",
    "OdoStart",
    "OdoEnd",
    "Miles",
    "Reimbursement",
    "Notes",
    "Timestamp",
];

pub const LOGGED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One logged trip. Field names on the wire are the column names above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Driver")]
    pub driver: String,
    #[serde(rename = "Job")]
    pub job: String,
    #[serde(rename = "OdoStart", alias = "Odo Start", serialize_with = "plain_number")]
    pub odometer_start: f64,
    #[serde(rename = "OdoEnd", alias = "Odo End", serialize_with = "plain_number")]
    pub odometer_end: f64,
    #[serde(rename = "Miles", serialize_with = "two_decimals")]
    pub miles: f64,
    #[serde(rename = "Reimbursement", serialize_with = "two_decimals")]
    pub reimbursement: f64,
    #[serde(rename = "Notes", default)]
    pub notes: String,
    #[serde(rename = "Timestamp", default, with = "logged_at")]
    pub logged_at: Option<NaiveDateTime>,
}

impl TripRecord {
    pub fn logged_at_text(&self) -> String {
        self.logged_at
            .map(|ts| ts.format(LOGGED_AT_FORMAT).to_string())
            .unwrap_or_default()
    }
}

/// Raw form input before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct TripInput {
    pub date: NaiveDate,
    pub driver: String,
    pub job: String,
    pub odometer_start: f64,
    pub odometer_end: f64,
    #[serde(default)]
    pub notes: String,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn plain_number<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&value.to_string())
}

fn two_decimals<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&format!("{value:.2}"))
}

/// Parses a `Timestamp` cell written by any version of the log: seconds or
/// minute precision, space or `T` separated, optionally with an offset.
pub fn parse_logged_at(text: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];
    let text = text.trim();
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|ts| ts.naive_local())
        })
}

mod logged_at {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};
    use tracing::warn;

    use super::{parse_logged_at, LOGGED_AT_FORMAT};

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.format(LOGGED_AT_FORMAT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => {
                let parsed = parse_logged_at(text);
                if parsed.is_none() {
                    warn!(value = text, "unreadable trip timestamp, treating it as empty");
                }
                Ok(parsed)
            }
        }
    }
}
