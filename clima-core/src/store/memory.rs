use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{error::StoreError, model::WeatherRecord};

use super::RecordStore;

/// In-process store for dry runs and tests.
///
/// With a capacity limit the oldest records are dropped once the limit is
/// exceeded. `reject_writes` makes every insert fail, standing in for a
/// database that refuses writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<WeatherRecord>>,
    capacity: Option<usize>,
    reject_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self { capacity: Some(capacity.max(1)), ..Self::default() }
    }

    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::Relaxed);
    }

    pub async fn records(&self) -> Vec<WeatherRecord> {
        self.records.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, record: &WeatherRecord) -> Result<(), StoreError> {
        if self.reject_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Rejected("memory store is rejecting writes".into()));
        }

        let mut records = self.records.lock().await;
        records.push(record.clone());
        if let Some(cap) = self.capacity {
            if records.len() > cap {
                let overflow = records.len() - cap;
                records.drain(0..overflow);
            }
        }
        Ok(())
    }
}
