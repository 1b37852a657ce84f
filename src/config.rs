use std::{env, fmt, net::SocketAddr, path::PathBuf, str::FromStr};

use chrono_tz::Tz;

use crate::error::AppError;

pub const DEFAULT_RATE: f64 = 0.67;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Csv,
    Sqlite,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Csv => "csv",
            StorageBackend::Sqlite => "sqlite",
            StorageBackend::Memory => "memory",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "csv" | "file" => Ok(StorageBackend::Csv),
            "sqlite" | "sheet" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(AppError::Config(format!(
                "invalid TRIP_STORE: {other} (expected csv, sqlite or memory)"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub storage: StorageBackend,
    pub trip_log_path: PathBuf,
    pub database_url: String,
    pub reimbursement_rate: f64,
    pub timezone: Tz,
    pub record_timestamps: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            storage: StorageBackend::Csv,
            trip_log_path: PathBuf::from("trip_log.csv"),
            database_url: "sqlite://mileage.db".to_string(),
            reimbursement_rate: DEFAULT_RATE,
            timezone: chrono_tz::America::Chicago,
            record_timestamps: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let listen_addr = match lookup("APP_LISTEN_ADDR") {
            Some(raw) => raw
                .parse()
                .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?,
            None => defaults.listen_addr,
        };

        let storage = match lookup("TRIP_STORE") {
            Some(raw) => raw.parse()?,
            None => defaults.storage,
        };

        let trip_log_path = lookup("TRIP_LOG_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.trip_log_path);

        let database_url = lookup("DATABASE_URL").unwrap_or(defaults.database_url);

        let reimbursement_rate = match lookup("REIMBURSEMENT_RATE") {
            Some(raw) => {
                let rate: f64 = raw.trim().parse().map_err(|err| {
                    AppError::Config(format!("invalid REIMBURSEMENT_RATE: {err}"))
                })?;
                if !rate.is_finite() || rate <= 0.0 {
                    return Err(AppError::Config(format!(
                        "invalid REIMBURSEMENT_RATE: {rate} must be a positive number"
                    )));
                }
                rate
            }
            None => defaults.reimbursement_rate,
        };

        let timezone = match lookup("TRIP_TIMEZONE") {
            Some(raw) => raw
                .trim()
                .parse::<Tz>()
                .map_err(|err| AppError::Config(format!("invalid TRIP_TIMEZONE: {err}")))?,
            None => defaults.timezone,
        };

        let record_timestamps = match lookup("RECORD_TIMESTAMPS") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                AppError::Config(format!("invalid RECORD_TIMESTAMPS: {raw}"))
            })?,
            None => defaults.record_timestamps,
        };

        Ok(Self {
            listen_addr,
            storage,
            trip_log_path,
            database_url,
            reimbursement_rate,
            timezone,
            record_timestamps,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
