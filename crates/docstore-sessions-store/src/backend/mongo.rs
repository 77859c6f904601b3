//! MongoDB document collection backend (feature-gated).
//!
//! Wraps a caller-supplied `mongodb::Client`; dialing, pooling, timeouts and
//! retries are the driver's business. Payloads are stored as BSON generic
//! binary so arbitrary bytes survive the round trip.

use std::sync::Arc;

use async_trait::async_trait;
use docstore_sessions_core::{
    DocumentCollection, DocumentConnection, RecordFilter, SessionRecord, StoreError,
};
use mongodb::{
    Client, Collection, IndexModel,
    bson::{Binary, Document, doc, spec::BinarySubtype},
    options::IndexOptions,
};

/// MongoDB connection.
pub struct MongoConnection {
    client: Client,
}

impl MongoConnection {
    /// Wrap an already-connected client.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentConnection for MongoConnection {
    async fn collection(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<Arc<dyn DocumentCollection>, StoreError> {
        let inner = self
            .client
            .database(database)
            .collection::<Document>(collection);

        // One record per session id is enforced server-side; concurrent
        // first writes on the same id cannot leave duplicates behind.
        let index = IndexModel::builder()
            .keys(doc! { "session_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        inner
            .create_index(index)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(Arc::new(MongoCollection { inner }))
    }
}

/// MongoDB collection implementation.
pub struct MongoCollection {
    inner: Collection<Document>,
}

fn filter_doc(filter: &RecordFilter) -> Document {
    match filter {
        RecordFilter::SessionId(id) => doc! { "session_id": id.as_str() },
        RecordFilter::CreatedBefore(cutoff) => doc! { "created_at": { "$lt": *cutoff } },
        RecordFilter::UpdatedBefore(cutoff) => doc! { "updated_at": { "$lt": *cutoff } },
    }
}

fn payload(data: &[u8]) -> Binary {
    Binary {
        subtype: BinarySubtype::Generic,
        bytes: data.to_vec(),
    }
}

fn parse_record(doc: &Document) -> Result<SessionRecord, StoreError> {
    let session_id = doc
        .get_str("session_id")
        .map_err(|e| StoreError::Storage(e.to_string()))?
        .to_string();
    let data = doc
        .get_binary_generic("data")
        .map_err(|e| StoreError::Storage(e.to_string()))?
        .clone();
    let created_at = doc
        .get_i64("created_at")
        .map_err(|e| StoreError::Storage(e.to_string()))?;
    let updated_at = doc
        .get_i64("updated_at")
        .map_err(|e| StoreError::Storage(e.to_string()))?;

    Ok(SessionRecord {
        session_id,
        data,
        created_at,
        updated_at,
    })
}

#[async_trait]
impl DocumentCollection for MongoCollection {
    async fn find_one(&self, filter: &RecordFilter) -> Result<Option<SessionRecord>, StoreError> {
        self.inner
            .find_one(filter_doc(filter))
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?
            .map(|doc| parse_record(&doc))
            .transpose()
    }

    async fn update(
        &self,
        filter: &RecordFilter,
        data: &[u8],
        now: i64,
    ) -> Result<u64, StoreError> {
        let result = self
            .inner
            .update_many(
                filter_doc(filter),
                doc! { "$set": { "data": payload(data), "updated_at": now } },
            )
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(result.matched_count)
    }

    async fn upsert(&self, session_id: &str, data: &[u8], now: i64) -> Result<u64, StoreError> {
        // The upsert copies the equality filter into the inserted document,
        // so `session_id` needs no $setOnInsert of its own.
        let result = self
            .inner
            .update_one(
                doc! { "session_id": session_id },
                doc! {
                    "$set": { "data": payload(data), "updated_at": now },
                    "$setOnInsert": { "created_at": now },
                },
            )
            .upsert(true)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(if result.upserted_id.is_some() {
            1
        } else {
            result.matched_count
        })
    }

    async fn insert(&self, record: SessionRecord) -> Result<(), StoreError> {
        let doc = doc! {
            "session_id": record.session_id.as_str(),
            "data": payload(&record.data),
            "created_at": record.created_at,
            "updated_at": record.updated_at,
        };

        self.inner
            .insert_one(doc)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn remove(&self, filter: &RecordFilter) -> Result<u64, StoreError> {
        let result = self
            .inner
            .delete_many(filter_doc(filter))
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(result.deleted_count)
    }
}
