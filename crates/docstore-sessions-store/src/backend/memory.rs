//! In-memory document collection backend.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use docstore_sessions_core::{
    DocumentCollection, DocumentConnection, RecordFilter, SessionRecord, StoreError,
};

/// In-memory connection.
///
/// Useful for development and tests. Handles resolved for the same
/// (database, collection) pair share one record map; data is lost on drop.
pub struct MemoryConnection {
    collections: RwLock<HashMap<(String, String), Arc<MemoryCollection>>>,
}

impl MemoryConnection {
    /// Create a new in-memory connection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve the concrete collection for a (database, collection) pair,
    /// creating it on first use.
    ///
    /// # Errors
    /// Returns `StoreError::Storage` if the namespace map lock is poisoned.
    pub fn namespace(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<Arc<MemoryCollection>, StoreError> {
        let key = (database.to_string(), collection.to_string());
        let mut collections = self
            .collections
            .write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        let handle = collections
            .entry(key)
            .or_insert_with(|| Arc::new(MemoryCollection::new()));

        Ok(Arc::clone(handle))
    }
}

impl Default for MemoryConnection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentConnection for MemoryConnection {
    async fn collection(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<Arc<dyn DocumentCollection>, StoreError> {
        let handle: Arc<dyn DocumentCollection> = self.namespace(database, collection)?;
        Ok(handle)
    }
}

/// In-memory collection implementation.
///
/// The record map is keyed by session id, so at most one record per id can
/// exist; each mutation runs under a single write lock, which gives the
/// upsert its atomicity.
pub struct MemoryCollection {
    records: RwLock<HashMap<String, SessionRecord>>,
}

impl MemoryCollection {
    /// Create a new empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored records.
    ///
    /// # Errors
    /// Returns `StoreError::Storage` if the record map lock is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self
            .records
            .read()
            .map_err(|e| StoreError::Storage(e.to_string()))?
            .len())
    }

    /// Whether the collection holds no records.
    ///
    /// # Errors
    /// Returns `StoreError::Storage` if the record map lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl Default for MemoryCollection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentCollection for MemoryCollection {
    async fn find_one(&self, filter: &RecordFilter) -> Result<Option<SessionRecord>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(match filter {
            RecordFilter::SessionId(id) => records.get(id).cloned(),
            _ => records.values().find(|r| filter.matches(r)).cloned(),
        })
    }

    async fn update(
        &self,
        filter: &RecordFilter,
        data: &[u8],
        now: i64,
    ) -> Result<u64, StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        let mut matched = 0;
        for record in records.values_mut().filter(|r| filter.matches(r)) {
            record.data = data.to_vec();
            record.updated_at = now;
            matched += 1;
        }

        Ok(matched)
    }

    async fn upsert(&self, session_id: &str, data: &[u8], now: i64) -> Result<u64, StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        records
            .entry(session_id.to_string())
            .and_modify(|record| {
                record.data = data.to_vec();
                record.updated_at = now;
            })
            .or_insert_with(|| SessionRecord::new(session_id, data.to_vec(), now));

        Ok(1)
    }

    async fn insert(&self, record: SessionRecord) -> Result<(), StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        if records.contains_key(&record.session_id) {
            return Err(StoreError::Storage(format!(
                "duplicate session id: {}",
                record.session_id
            )));
        }

        records.insert(record.session_id.clone(), record);
        Ok(())
    }

    async fn remove(&self, filter: &RecordFilter) -> Result<u64, StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        let before = records.len();
        records.retain(|_, record| !filter.matches(record));

        Ok((before - records.len()) as u64)
    }
}
