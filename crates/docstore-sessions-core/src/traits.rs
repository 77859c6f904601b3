//! Capability traits for storage and session handling.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::record::{RecordFilter, SessionRecord};

/// Store error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Constructor-time misconfiguration. Fatal, never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Fault from the underlying collection (network, auth, timeout).
    /// Propagated unchanged; this layer performs no retries.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Trait for a namespaced collection of session documents.
///
/// A missing record is never an error here: `find_one` returns `None` and
/// the mutation methods report how many records they touched. Only transport
/// or backend faults surface as `Err`.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    /// Find the first record matching `filter`.
    async fn find_one(&self, filter: &RecordFilter) -> Result<Option<SessionRecord>, StoreError>;

    /// Replace the data payload of every record matching `filter`, bumping
    /// `updated_at` to `now`. Returns the number of records matched.
    async fn update(
        &self,
        filter: &RecordFilter,
        data: &[u8],
        now: i64,
    ) -> Result<u64, StoreError>;

    /// Atomic find-or-create-and-set: replace the payload for `session_id`,
    /// inserting a fresh record stamped `now` when none exists. Returns the
    /// number of records touched; an insert counts as one.
    async fn upsert(&self, session_id: &str, data: &[u8], now: i64) -> Result<u64, StoreError>;

    /// Insert a record. Fails if one already exists for the same session id
    /// and the backend enforces uniqueness.
    async fn insert(&self, record: SessionRecord) -> Result<(), StoreError>;

    /// Remove every record matching `filter`. Returns the number removed.
    async fn remove(&self, filter: &RecordFilter) -> Result<u64, StoreError>;
}

/// Trait for an injected connection to a document store.
///
/// Connection setup and teardown live with the caller; this layer only
/// resolves namespaced collection handles. Backends may ensure indexes here
/// (the Mongo backend installs a unique index on `session_id`, which is what
/// resolves concurrent first-write races on the same id).
#[async_trait]
pub trait DocumentConnection: Send + Sync {
    /// Resolve a handle to `collection` within `database`.
    ///
    /// # Errors
    /// Returns `StoreError::Storage` if the handle cannot be resolved.
    async fn collection(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<Arc<dyn DocumentCollection>, StoreError>;
}

/// Trait for session persistence handlers.
///
/// This is the exact surface a session-lifecycle manager drives: it calls
/// `open` when a request's session starts, `read` to hydrate state, `write`
/// after each mutation, `destroy` on logout, and `cleanup` from a periodic
/// scheduler. A read-miss means "fresh session", never a fault.
#[async_trait]
pub trait SessionHandler: Send + Sync {
    /// Open the handler. No-op for document-store backends.
    async fn open(&self) -> Result<(), StoreError>;

    /// Close the handler. No-op for document-store backends.
    async fn close(&self) -> Result<(), StoreError>;

    /// Read the payload stored for `id`, or an empty payload if no record
    /// exists. A miss creates nothing.
    async fn read(&self, id: &str) -> Result<Vec<u8>, StoreError>;

    /// Persist `data` under `id`, creating the record on first write.
    /// Returns `true` iff the storage layer reports a record was touched.
    async fn write(&self, id: &str, data: &[u8]) -> Result<bool, StoreError>;

    /// Delete the record for `id`. Returns `true` iff one was removed;
    /// `false` for an unknown id (idempotent, not an error).
    async fn destroy(&self, id: &str) -> Result<bool, StoreError>;

    /// Remove every record older than `max_lifetime_secs`. Returns `true`
    /// iff at least one record was swept.
    async fn cleanup(&self, max_lifetime_secs: i64) -> Result<bool, StoreError>;
}
