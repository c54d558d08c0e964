use async_trait::async_trait;
use bson::{Bson, Document, doc};
use mongodb::{Client, Collection};
use tracing::debug;

use crate::{error::StoreError, model::WeatherRecord};

use super::RecordStore;

/// Appends records to a MongoDB collection through one shared client.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    database: String,
    collection: Collection<Document>,
}

impl MongoStore {
    /// Build the client. The driver connects lazily, so an unreachable server
    /// only surfaces on the first [`MongoStore::ping`] or insert.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await.map_err(StoreError::Connect)?;
        let collection = client.database(database).collection::<Document>(collection);

        Ok(Self { client, database: database.to_string(), collection })
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(StoreError::Connect)?;
        Ok(())
    }

    pub fn namespace(&self) -> String {
        format!("{}.{}", self.database, self.collection.name())
    }
}

/// Serialize a record, storing the insertion time as a native BSON date
/// instead of the RFC 3339 string serde would produce.
pub fn to_document(record: &WeatherRecord) -> Result<Document, StoreError> {
    let mut document = bson::to_document(record)?;
    document.insert(
        "fecha_insercion",
        Bson::DateTime(bson::DateTime::from_chrono(record.inserted_at)),
    );
    Ok(document)
}

#[async_trait]
impl RecordStore for MongoStore {
    async fn insert(&self, record: &WeatherRecord) -> Result<(), StoreError> {
        let document = to_document(record)?;

        let result = self.collection.insert_one(document).await.map_err(|source| {
            StoreError::Insert { collection: self.namespace(), source }
        })?;

        debug!(id = %result.inserted_id, "inserted weather record");
        Ok(())
    }
}
