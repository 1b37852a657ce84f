use crate::{
    config::AppConfig,
    services::{builder::TripBuilder, storage::SharedTripStore},
};

/// Handles acquired once at start-up and shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: SharedTripStore,
    pub builder: TripBuilder,
}

impl AppState {
    pub fn new(config: AppConfig, store: SharedTripStore) -> Self {
        let builder = TripBuilder::from_config(&config);
        Self {
            config,
            store,
            builder,
        }
    }
}
