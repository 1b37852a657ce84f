use std::{fmt, sync::Arc};

use chrono::NaiveDate;
use cucumber::{given, then, when, World as _};
use mileage::{
    config::{AppConfig, StorageBackend},
    error::AppError,
    models::{
        filter::{DateRange, TripFilter},
        trip::{TripInput, TripRecord},
    },
    services::{
        aggregator::{self, TripSummary},
        export,
        storage::{CsvTripStore, SharedTripStore},
    },
    state::AppState,
};
use tempfile::TempDir;

#[derive(Debug, cucumber::World, Default)]
struct TripWorld {
    state: Option<TestState>,
    last_record: Option<TripRecord>,
    last_error: Option<String>,
    last_error_was_validation: bool,
    filter: TripFilter,
    summary: Option<TripSummary>,
    exports: Vec<String>,
}

impl TripWorld {
    fn app_state(&self) -> &AppState {
        self.state
            .as_ref()
            .expect("state must be initialised first")
            .app()
    }

    async fn records(&self) -> Vec<TripRecord> {
        aggregator::load_history(self.app_state().store.as_ref())
            .await
            .expect("load trips")
    }
}

struct TestState {
    app: AppState,
    _root: TempDir,
}

impl fmt::Debug for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestState").finish()
    }
}

impl TestState {
    fn new() -> Self {
        let root = TempDir::new().expect("create temp dir for bdd world");
        let config = AppConfig {
            storage: StorageBackend::Csv,
            trip_log_path: root.path().join("trip_log.csv"),
            ..AppConfig::default()
        };
        let store: SharedTripStore = Arc::new(CsvTripStore::new(config.trip_log_path.clone()));
        let app = AppState::new(config, store);
        Self { app, _root: root }
    }

    fn app(&self) -> &AppState {
        &self.app
    }
}

fn parse_date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("date in YYYY-MM-DD form")
}

fn trip_input(date: &str, driver: String, job: String, start: f64, end: f64) -> TripInput {
    TripInput {
        date: parse_date(date),
        driver,
        job,
        odometer_start: start,
        odometer_end: end,
        notes: String::new(),
    }
}

async fn submit(world: &mut TripWorld, input: TripInput) {
    let result = {
        let state = world.app_state();
        state.builder.submit(state.store.as_ref(), input).await
    };
    match result {
        Ok(record) => {
            world.last_record = Some(record);
            world.last_error = None;
        }
        Err(err) => {
            world.last_error_was_validation = err.is_validation();
            world.last_error = Some(match err {
                AppError::MissingField(_) => "MissingField".to_string(),
                AppError::InvalidRange { .. } => "InvalidRange".to_string(),
                other => other.to_string(),
            });
            world.last_record = None;
        }
    }
}

#[given("an empty trip log")]
async fn given_empty_log(world: &mut TripWorld) {
    world.state = Some(TestState::new());
    world.filter = TripFilter::default();
    world.summary = None;
    world.exports.clear();
}

#[given(
    regex = r#"^a logged trip on (\S+) by \"([^\"]+)\" for \"([^\"]+)\" from ([\d.]+) to ([\d.]+)$"#
)]
async fn given_logged_trip(
    world: &mut TripWorld,
    date: String,
    driver: String,
    job: String,
    start: f64,
    end: f64,
) {
    submit(world, trip_input(&date, driver, job, start, end)).await;
    assert!(world.last_error.is_none(), "seed trip was rejected");
}

#[when(
    regex = r#"^I submit a trip on (\S+) by \"([^\"]*)\" for \"([^\"]*)\" from ([\d.]+) to ([\d.]+)$"#
)]
async fn when_submit(
    world: &mut TripWorld,
    date: String,
    driver: String,
    job: String,
    start: f64,
    end: f64,
) {
    submit(world, trip_input(&date, driver, job, start, end)).await;
}

#[then(regex = r"^the trip is recorded with ([\d.]+) miles and a reimbursement of ([\d.]+)$")]
async fn then_recorded(world: &mut TripWorld, miles: f64, reimbursement: f64) {
    let record = world.last_record.as_ref().expect("a trip should be recorded");
    assert_eq!(record.miles, miles);
    assert_eq!(record.reimbursement, reimbursement);
    let stored = world.records().await;
    assert_eq!(stored.last(), Some(record));
}

#[then(regex = r"^the submission is rejected with (\w+)$")]
async fn then_rejected(world: &mut TripWorld, kind: String) {
    assert_eq!(world.last_error.as_deref(), Some(kind.as_str()));
    assert!(world.last_error_was_validation);
}

#[then(regex = r"^the log holds (\d+) trips?$")]
async fn then_log_holds(world: &mut TripWorld, expected: usize) {
    assert_eq!(world.records().await.len(), expected);
}

#[when(regex = r#"^I filter by driver \"([^\"]+)\"$"#)]
async fn when_filter_driver(world: &mut TripWorld, driver: String) {
    world.filter = world.filter.clone().with_drivers([driver]);
}

#[when(regex = r"^I filter by dates from (\S+) to (\S+)$")]
async fn when_filter_dates(world: &mut TripWorld, start: String, end: String) {
    world.filter = world
        .filter
        .clone()
        .with_date_range(DateRange::between(parse_date(&start), parse_date(&end)));
}

#[when(regex = r#"^I filter by job containing \"([^\"]+)\"$"#)]
async fn when_filter_job(world: &mut TripWorld, needle: String) {
    world.filter = world.filter.clone().with_job_contains(needle);
}

#[when("I summarize the log")]
async fn when_summarize(world: &mut TripWorld) {
    let records = world.records().await;
    world.summary = Some(aggregator::summarize(&records, &world.filter));
}

#[then(regex = r"^the summary lists (\d+) trips? totalling ([\d.]+) miles and ([\d.]+) in reimbursement$")]
async fn then_summary(world: &mut TripWorld, count: usize, miles: f64, reimbursement: f64) {
    let summary = world.summary.as_ref().expect("summary must be computed");
    assert_eq!(summary.len(), count);
    assert!((summary.total_miles - miles).abs() < 1e-9);
    assert!((summary.total_reimbursement - reimbursement).abs() < 1e-9);
}

#[when("I export the summary twice")]
async fn when_export_twice(world: &mut TripWorld) {
    let summary = world.summary.as_ref().expect("summary must be computed");
    world.exports = (0..2)
        .map(|_| export::to_csv(&summary.records).expect("export csv"))
        .collect();
}

#[then(regex = r"^both exports are identical and have (\d+) lines$")]
async fn then_exports_identical(world: &mut TripWorld, lines: usize) {
    assert_eq!(world.exports.len(), 2);
    assert_eq!(world.exports[0], world.exports[1]);
    assert_eq!(world.exports[0].lines().count(), lines);
}

#[tokio::main]
async fn main() {
    TripWorld::cucumber()
        .fail_on_skipped()
        .with_default_cli()
        .run("tests/features")
        .await;
}
