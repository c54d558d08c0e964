//! One poll cycle: pick a city, fetch it, remap, store, advance.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use crate::{
    error::{FetchError, StoreError},
    model::WeatherRecord,
    provider::{CityQuery, WeatherProvider},
    rotator::CityRotator,
    store::RecordStore,
};

/// Result of a single poll cycle. Failures are reported here and logged,
/// never propagated to the scheduler.
#[derive(Debug)]
pub enum CycleOutcome {
    /// `city` is the polled name; the record holds the name upstream resolved it to.
    Stored { city: String, record: WeatherRecord },
    FetchFailed { city: String, error: FetchError },
    StoreFailed { city: String, error: StoreError },
}

impl CycleOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, CycleOutcome::Stored { .. })
    }

    /// City this cycle polled.
    pub fn city(&self) -> &str {
        match self {
            CycleOutcome::Stored { city, .. }
            | CycleOutcome::FetchFailed { city, .. }
            | CycleOutcome::StoreFailed { city, .. } => city,
        }
    }

    pub fn record(&self) -> Option<&WeatherRecord> {
        match self {
            CycleOutcome::Stored { record, .. } => Some(record),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Pipeline {
    provider: Box<dyn WeatherProvider>,
    store: Arc<dyn RecordStore>,
    rotator: CityRotator,
    country: Option<String>,
}

impl Pipeline {
    pub fn new(
        provider: Box<dyn WeatherProvider>,
        store: Arc<dyn RecordStore>,
        rotator: CityRotator,
        country: Option<String>,
    ) -> Self {
        Self { provider, store, rotator, country }
    }

    pub fn rotator(&self) -> &CityRotator {
        &self.rotator
    }

    /// Run one cycle for the current city. The rotator advances whatever the
    /// outcome.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let city = self.rotator.current().to_string();
        info!(city = %city, "querying weather");

        let outcome = self.fetch_and_store(&city).await;
        log_outcome(&outcome);

        self.rotator.advance();
        outcome
    }

    async fn fetch_and_store(&self, city: &str) -> CycleOutcome {
        let conditions = match CityQuery::new(city, self.country.as_deref()) {
            Ok(query) => self.provider.fetch_current(&query).await,
            Err(error) => Err(error),
        };

        let conditions = match conditions {
            Ok(conditions) => conditions,
            Err(error) => return CycleOutcome::FetchFailed { city: city.to_string(), error },
        };

        let record = WeatherRecord::from_conditions(conditions, Utc::now());

        match self.store.insert(&record).await {
            Ok(()) => CycleOutcome::Stored { city: city.to_string(), record },
            Err(error) => CycleOutcome::StoreFailed { city: city.to_string(), error },
        }
    }
}

fn log_outcome(outcome: &CycleOutcome) {
    match outcome {
        CycleOutcome::Stored { city, record } => info!(
            city = %city,
            location = %record.location.city,
            temp_c = record.weather.temperature_c,
            humidity = record.weather.humidity_pct,
            condition = %record.weather.condition,
            "stored weather record"
        ),
        CycleOutcome::FetchFailed { city, error } => {
            error!(city = %city, error = %error, "failed to fetch weather")
        }
        CycleOutcome::StoreFailed { city, error } => {
            error!(city = %city, error = %error, "failed to store weather record")
        }
    }
}
