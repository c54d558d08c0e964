use crate::{error::StoreError, model::WeatherRecord};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

pub const DEFAULT_DATABASE: &str = "Clima";
pub const DEFAULT_COLLECTION: &str = "ciudad";

/// Append-only sink for weather records.
#[async_trait]
pub trait RecordStore: Send + Sync + Debug {
    async fn insert(&self, record: &WeatherRecord) -> Result<(), StoreError>;
}
