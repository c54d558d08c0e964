use std::{collections::HashSet, sync::Arc, time::Duration};

use async_trait::async_trait;
use clima_core::{
    CityQuery, CityRotator, CurrentConditions, FetchError, MemoryStore, Pipeline, Scheduler,
    SchedulerState, WeatherProvider, scheduler::JOB_NAME,
};

/// Answers every query with conditions named after the requested city,
/// except for the cities listed in `failing`.
#[derive(Debug, Default)]
struct EchoProvider {
    failing: HashSet<String>,
}

impl EchoProvider {
    fn failing(cities: &[&str]) -> Self {
        Self { failing: cities.iter().map(|c| c.to_string()).collect() }
    }
}

#[async_trait]
impl WeatherProvider for EchoProvider {
    async fn fetch_current(&self, query: &CityQuery) -> Result<CurrentConditions, FetchError> {
        if self.failing.contains(query.city()) {
            let err = serde_json::from_str::<CurrentConditions>("{}").unwrap_err();
            return Err(FetchError::Parse(err));
        }

        let conditions = serde_json::from_value(serde_json::json!({
            "location": {
                "name": query.city(), "region": "", "country": "Colombia",
                "lat": 0.0, "lon": 0.0, "localtime": "2025-03-01 09:15"
            },
            "current": {
                "last_updated": "2025-03-01 09:00", "temp_c": 20.0, "feelslike_c": 20.0,
                "humidity": 60, "pressure_mb": 1012.0, "wind_kph": 3.0, "wind_dir": "W",
                "precip_mm": 0.0, "cloud": 10, "uv": 2.0,
                "condition": { "text": "Clear", "icon": "//cdn.example/113.png" }
            }
        }))?;
        Ok(conditions)
    }
}

fn scheduler(provider: EchoProvider, store: Arc<MemoryStore>, cities: &[&str]) -> Scheduler {
    let rotator = CityRotator::new(cities.iter().map(|c| c.to_string()).collect()).unwrap();
    let pipeline = Pipeline::new(Box::new(provider), store, rotator, None);

    Scheduler::new(pipeline, Duration::from_secs(10))
}

#[tokio::test(start_paused = true)]
async fn job_is_not_due_before_first_period() {
    let store = Arc::new(MemoryStore::new());
    let mut scheduler = scheduler(EchoProvider::default(), store.clone(), &["Bogota"]);

    assert_eq!(scheduler.job().name(), JOB_NAME);
    assert!(scheduler.run_pending().await.is_none());

    tokio::time::advance(Duration::from_millis(9_800)).await;
    assert!(scheduler.run_pending().await.is_none());
    assert!(store.is_empty().await);

    tokio::time::advance(Duration::from_millis(200)).await;
    assert!(scheduler.run_pending().await.is_some());
    assert_eq!(scheduler.state(), SchedulerState::Idle);
}

#[tokio::test(start_paused = true)]
async fn ticks_poll_cities_cyclically_from_the_first() {
    let cities = ["Bogota", "Medellin", "Cali"];
    let store = Arc::new(MemoryStore::new());
    let mut scheduler = scheduler(EchoProvider::default(), store.clone(), &cities);

    let ticks = 8;
    let mut polled = Vec::new();
    for _ in 0..ticks {
        tokio::time::advance(Duration::from_secs(10)).await;
        let outcome = scheduler.run_pending().await.expect("job should be due");
        polled.push(outcome.city().to_string());
    }

    let expected: Vec<String> = cities.iter().cycle().take(ticks).map(|c| c.to_string()).collect();
    assert_eq!(polled, expected);

    let stored: Vec<String> =
        store.records().await.into_iter().map(|r| r.location.city).collect();
    assert_eq!(stored, expected);
}

#[tokio::test(start_paused = true)]
async fn run_loop_keeps_going_after_failures() {
    let store = Arc::new(MemoryStore::new());
    let scheduler = scheduler(
        EchoProvider::failing(&["Medellin"]),
        store.clone(),
        &["Bogota", "Medellin", "Cali"],
    );

    let handle = tokio::spawn(scheduler.run());

    // Runs land at 10s, 20s and 30s; the 20s run fails.
    tokio::time::sleep(Duration::from_millis(30_100)).await;
    handle.abort();

    let stored: Vec<String> =
        store.records().await.into_iter().map(|r| r.location.city).collect();
    assert_eq!(stored, ["Bogota", "Cali"]);
}

#[tokio::test(start_paused = true)]
async fn store_rejection_does_not_stop_later_ticks() {
    let store = Arc::new(MemoryStore::new());
    let mut scheduler = scheduler(EchoProvider::default(), store.clone(), &["Cartagena"]);

    store.set_reject_writes(true);
    tokio::time::advance(Duration::from_secs(10)).await;
    let outcome = scheduler.run_pending().await.expect("job should be due");
    assert!(!outcome.is_stored());

    store.set_reject_writes(false);
    tokio::time::advance(Duration::from_secs(10)).await;
    let outcome = scheduler.run_pending().await.expect("job should be due");
    assert!(outcome.is_stored());
    assert_eq!(store.len().await, 1);
}
