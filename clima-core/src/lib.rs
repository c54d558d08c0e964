//! Core library for the `clima-pipeline` service.
//!
//! This crate defines:
//! - Configuration (presets, TOML file, environment credentials)
//! - The WeatherAPI.com client and the record it is remapped into
//! - Record stores (MongoDB, in-memory)
//! - The rotating poll cycle and the fixed-period scheduler driving it
//! - The liveness router
//!
//! The binary in `clima-pipeline` only wires these together.

pub mod config;
pub mod error;
pub mod liveness;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod rotator;
pub mod scheduler;
pub mod store;

pub use config::{Config, FileConfig, Overrides, Secrets, Variant};
pub use error::{ConfigError, FetchError, StoreError};
pub use model::{CurrentConditions, WeatherRecord};
pub use pipeline::{CycleOutcome, Pipeline};
pub use provider::{CityQuery, WeatherProvider, weatherapi::WeatherApiProvider};
pub use rotator::CityRotator;
pub use scheduler::{Scheduler, SchedulerState};
pub use store::{MemoryStore, MongoStore, RecordStore};
