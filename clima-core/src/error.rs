use reqwest::StatusCode;
use thiserror::Error;

/// Anything that goes wrong between sending the upstream request and holding
/// a parsed [`crate::CurrentConditions`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("city query must not be empty")]
    EmptyCity,

    #[error("failed to reach WeatherAPI.com: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("WeatherAPI current request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to parse WeatherAPI current JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure to append a record to the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to connect to MongoDB: {0}")]
    Connect(#[source] mongodb::error::Error),

    #[error("failed to encode record as BSON: {0}")]
    Encode(#[from] bson::ser::Error),

    #[error("insert into collection '{collection}' failed: {source}")]
    Insert {
        collection: String,
        #[source]
        source: mongodb::error::Error,
    },

    #[error("write rejected: {0}")]
    Rejected(String),
}

/// Invalid settings detected while resolving the configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("city list must contain at least one city")]
    NoCities,

    #[error("city at position {0} is blank")]
    BlankCity(usize),

    #[error("poll interval must be greater than zero seconds")]
    ZeroInterval,

    #[error("unknown variant '{0}'. Supported variants: colombia, single.")]
    UnknownVariant(String),
}
