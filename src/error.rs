use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error("Please enter the {0}.")]
    MissingField(&'static str),
    #[error("Odometer End ({end}) must be greater than Start ({start}), and neither may be negative.")]
    InvalidRange { start: f64, end: f64 },
    #[error("failed to log trip: {0:#}")]
    Persistence(#[source] anyhow::Error),
    #[error("could not load trip history: {0:#}")]
    Load(#[source] anyhow::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
    #[error("not found")]
    NotFound,
}

impl AppError {
    /// Validation failures are detected before anything is written.
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::MissingField(_) | AppError::InvalidRange { .. })
    }

    /// Text shown to the person at the form.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Persistence(_) => {
                "Failed to log trip. Please try again or contact admin.".to_string()
            }
            AppError::Load(_) => {
                "Could not load trip history. Please try again or contact admin.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Raw cause for storage failures, for diagnostics.
    pub fn detail(&self) -> Option<String> {
        match self {
            AppError::Persistence(err) | AppError::Load(err) => Some(format!("{err:#}")),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MissingField(_) | AppError::InvalidRange { .. } => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Persistence(_)
            | AppError::Load(_)
            | AppError::Io(_)
            | AppError::Database(_)
            | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound => StatusCode::NOT_FOUND,
        };

        let body = match self.detail() {
            Some(detail) => format!("{}\n\n{detail}", self.user_message()),
            None => self.user_message(),
        };
        (status, body).into_response()
    }
}
