use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_with::{serde_as, NoneAsEmptyString};

use super::view::{self, TripRow};
use crate::{
    error::AppError,
    models::trip::TripInput,
    services::aggregator,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/trips", post(submit_trip))
}

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    form: FormValues,
    rate: String,
    show_success: bool,
    success_message: String,
    show_error: bool,
    error_message: String,
    error_detail: String,
    history_loaded: bool,
    history_message: String,
    history_error: String,
    trips: Vec<TripRow>,
}

#[derive(Clone, Default)]
struct FormValues {
    date: String,
    driver: String,
    job: String,
    odometer_start: String,
    odometer_end: String,
    notes: String,
}

impl FormValues {
    fn blank(today: NaiveDate) -> Self {
        Self {
            date: today.format("%Y-%m-%d").to_string(),
            odometer_start: "0".into(),
            odometer_end: "0".into(),
            ..Self::default()
        }
    }
}

#[serde_as]
#[derive(Deserialize)]
struct TripForm {
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(default)]
    driver: String,
    #[serde(default)]
    job: String,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    odometer_start: Option<f64>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    odometer_end: Option<f64>,
    #[serde(default)]
    notes: String,
}

enum Banner {
    None,
    Success(String),
    Failure(AppError),
}

async fn home(State(state): State<AppState>) -> Response {
    let form = FormValues::blank(today(&state));
    render_home(&state, StatusCode::OK, form, Banner::None).await
}

async fn submit_trip(State(state): State<AppState>, Form(form): Form<TripForm>) -> Response {
    let input = TripInput {
        date: form.date.unwrap_or_else(|| today(&state)),
        driver: form.driver,
        job: form.job,
        odometer_start: form.odometer_start.unwrap_or(0.0),
        odometer_end: form.odometer_end.unwrap_or(0.0),
        notes: form.notes,
    };
    let echo = FormValues {
        date: input.date.format("%Y-%m-%d").to_string(),
        driver: input.driver.clone(),
        job: input.job.clone(),
        odometer_start: input.odometer_start.to_string(),
        odometer_end: input.odometer_end.to_string(),
        notes: input.notes.clone(),
    };

    match state.builder.submit(state.store.as_ref(), input).await {
        Ok(record) => {
            let message = format!(
                "Trip logged for {}: {} miles – ${:.2}",
                record.driver, record.miles, record.reimbursement
            );
            let form = FormValues::blank(today(&state));
            render_home(&state, StatusCode::OK, form, Banner::Success(message)).await
        }
        Err(err) => {
            let status = if err.is_validation() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            render_home(&state, status, echo, Banner::Failure(err)).await
        }
    }
}

async fn render_home(state: &AppState, status: StatusCode, form: FormValues, banner: Banner) -> Response {
    let (history_loaded, history_message, history_error, trips) =
        match aggregator::load_history(state.store.as_ref()).await {
            Ok(records) => (true, String::new(), String::new(), view::rows(&records)),
            Err(err) => (
                false,
                err.user_message(),
                err.detail().unwrap_or_default(),
                Vec::new(),
            ),
        };

    let (show_success, success_message) = match &banner {
        Banner::Success(message) => (true, message.clone()),
        _ => (false, String::new()),
    };
    let (show_error, error_message, error_detail) = match &banner {
        Banner::Failure(err) => (true, err.user_message(), err.detail().unwrap_or_default()),
        _ => (false, String::new(), String::new()),
    };

    let template = HomeTemplate {
        form,
        rate: format!("{:.2}", state.config.reimbursement_rate),
        show_success,
        success_message,
        show_error,
        error_message,
        error_detail,
        history_loaded,
        history_message,
        history_error,
        trips,
    };
    (status, AskamaTemplateResponse::into_response(template)).into_response()
}

fn today(state: &AppState) -> NaiveDate {
    Utc::now().with_timezone(&state.config.timezone).date_naive()
}
