use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::{RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use axum_extra::extract::Query;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_with::{serde_as, NoneAsEmptyString};
use tracing::info;

use super::view::{self, format_amount, TripRow};
use crate::{
    error::AppError,
    models::filter::{DateRange, TripFilter},
    services::{aggregator, export::EXPORT_FILE_NAME},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard))
        .route("/export.csv", get(export_csv))
}

#[serde_as]
#[derive(Debug, Deserialize)]
struct FilterParams {
    #[serde(default)]
    driver: Vec<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    start: Option<NaiveDate>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    end: Option<NaiveDate>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    logged_from: Option<NaiveDate>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    logged_to: Option<NaiveDate>,
    #[serde(default)]
    job: String,
}

impl FilterParams {
    fn to_filter(&self) -> TripFilter {
        TripFilter::default()
            .with_drivers(self.driver.iter().map(|d| d.trim()).filter(|d| !d.is_empty()))
            .with_date_range(DateRange::new(self.start, self.end))
            .with_logged_at_range(DateRange::new(self.logged_from, self.logged_to))
            .with_job_contains(self.job.trim())
    }
}

#[derive(Clone)]
struct DriverOption {
    name: String,
    selected: bool,
}

#[derive(Template)]
#[template(path = "admin.html")]
struct AdminTemplate {
    drivers: Vec<DriverOption>,
    start: String,
    end: String,
    logged_from: String,
    logged_to: String,
    job: String,
    load_failed: bool,
    load_message: String,
    load_detail: String,
    has_data: bool,
    trip_count: usize,
    total_miles: String,
    total_reimbursement: String,
    trips: Vec<TripRow>,
    export_url: String,
}

async fn dashboard(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
    RawQuery(raw_query): RawQuery,
) -> Response {
    let filter = params.to_filter();
    let mut template = AdminTemplate {
        drivers: Vec::new(),
        start: date_text(params.start),
        end: date_text(params.end),
        logged_from: date_text(params.logged_from),
        logged_to: date_text(params.logged_to),
        job: params.job.clone(),
        load_failed: false,
        load_message: String::new(),
        load_detail: String::new(),
        has_data: false,
        trip_count: 0,
        total_miles: String::new(),
        total_reimbursement: String::new(),
        trips: Vec::new(),
        export_url: match raw_query {
            Some(query) if !query.is_empty() => format!("/admin/export.csv?{query}"),
            _ => "/admin/export.csv".to_string(),
        },
    };

    match aggregator::load_history(state.store.as_ref()).await {
        Ok(records) => {
            template.drivers = aggregator::drivers(&records)
                .into_iter()
                .map(|name| DriverOption {
                    selected: filter.drivers.contains(&name),
                    name,
                })
                .collect();
            let summary = aggregator::summarize(&records, &filter);
            template.has_data = !summary.is_empty();
            template.trip_count = summary.len();
            template.total_miles = format_amount(summary.total_miles);
            template.total_reimbursement = format_amount(summary.total_reimbursement);
            template.trips = view::rows(&summary.records);
            AskamaTemplateResponse::into_response(template)
        }
        Err(err) => {
            template.load_failed = true;
            template.load_message = err.user_message();
            template.load_detail = err.detail().unwrap_or_default();
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                AskamaTemplateResponse::into_response(template),
            )
                .into_response()
        }
    }
}

async fn export_csv(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Response, AppError> {
    let records = aggregator::load_history(state.store.as_ref()).await?;
    let summary = aggregator::summarize(&records, &params.to_filter());
    let body = summary.to_csv()?;
    info!("exporting {} trips as csv", summary.len());
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        body,
    )
        .into_response())
}

fn date_text(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
