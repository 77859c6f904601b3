//! Session persistence adapter over a document collection.

use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use async_trait::async_trait;
use docstore_sessions_core::{
    DocumentCollection, DocumentConnection, RecordFilter, SessionHandler, StoreError,
};

/// Which timestamp field `cleanup` compares against its cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryBasis {
    /// Absolute lifetime cap: a session is swept once its creation time is
    /// older than the cutoff, no matter how recently it was written.
    #[default]
    CreatedAt,
    /// Idle timeout: a session survives as long as it keeps being written.
    UpdatedAt,
}

/// Constructor-time configuration for [`SessionStore`].
#[derive(Debug, Clone)]
pub struct SessionStoreConfig {
    /// Database name.
    pub database: String,
    /// Collection name.
    pub collection: String,
    /// Expiry policy for `cleanup`.
    pub expiry_basis: ExpiryBasis,
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        Self {
            database: "test".to_string(),
            collection: "sessions".to_string(),
            expiry_basis: ExpiryBasis::default(),
        }
    }
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Session persistence adapter.
///
/// Owns nothing beyond the resolved collection handle and the expiry policy;
/// connection lifecycle belongs to the caller, scheduling of `cleanup` to an
/// external trigger, and session-id generation to the lifecycle manager.
pub struct SessionStore {
    collection: Arc<dyn DocumentCollection>,
    expiry_basis: ExpiryBasis,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("expiry_basis", &self.expiry_basis)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Resolve the configured collection and build the store.
    ///
    /// Validates eagerly: an empty database or collection name fails here
    /// rather than on first use.
    ///
    /// # Errors
    /// Returns `StoreError::Configuration` on empty names, or
    /// `StoreError::Storage` if the collection handle cannot be resolved.
    pub async fn connect(
        config: SessionStoreConfig,
        connection: &dyn DocumentConnection,
    ) -> Result<Self, StoreError> {
        if config.database.is_empty() {
            return Err(StoreError::Configuration(
                "database name must not be empty".to_string(),
            ));
        }
        if config.collection.is_empty() {
            return Err(StoreError::Configuration(
                "collection name must not be empty".to_string(),
            ));
        }

        let collection = connection
            .collection(&config.database, &config.collection)
            .await?;

        Ok(Self {
            collection,
            expiry_basis: config.expiry_basis,
        })
    }
}

#[async_trait]
impl SessionHandler for SessionStore {
    async fn open(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn read(&self, id: &str) -> Result<Vec<u8>, StoreError> {
        let found = self
            .collection
            .find_one(&RecordFilter::SessionId(id.to_string()))
            .await?;

        // A miss is a fresh session, not a fault, and creates no record.
        Ok(found.map(|record| record.data).unwrap_or_default())
    }

    async fn write(&self, id: &str, data: &[u8]) -> Result<bool, StoreError> {
        let touched = self.collection.upsert(id, data, now()).await?;
        if touched == 0 {
            tracing::warn!(session_id = id, "write touched no record");
        }

        Ok(touched > 0)
    }

    async fn destroy(&self, id: &str) -> Result<bool, StoreError> {
        let removed = self
            .collection
            .remove(&RecordFilter::SessionId(id.to_string()))
            .await?;

        Ok(removed > 0)
    }

    async fn cleanup(&self, max_lifetime_secs: i64) -> Result<bool, StoreError> {
        let cutoff = now() - max_lifetime_secs;
        let filter = match self.expiry_basis {
            ExpiryBasis::CreatedAt => RecordFilter::CreatedBefore(cutoff),
            ExpiryBasis::UpdatedAt => RecordFilter::UpdatedBefore(cutoff),
        };

        let removed = self.collection.remove(&filter).await?;
        if removed > 0 {
            tracing::debug!(removed, cutoff, "swept expired sessions");
        }

        Ok(removed > 0)
    }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use docstore_sessions_core::SessionRecord;

    use super::*;
    use crate::backend::MemoryConnection;

    async fn store_with(conn: &MemoryConnection) -> SessionStore {
        SessionStore::connect(SessionStoreConfig::default(), conn)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_open_close_are_noops() {
        let conn = MemoryConnection::new();
        let store = store_with(&conn).await;

        store.open().await.unwrap();
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_read_miss_returns_empty_and_creates_nothing() {
        let conn = MemoryConnection::new();
        let store = store_with(&conn).await;

        assert_eq!(store.read("unknown").await.unwrap(), Vec::<u8>::new());

        let records = conn.namespace("test", "sessions").unwrap();
        assert!(records.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_write_read_destroy_scenario() {
        let conn = MemoryConnection::new();
        let store = store_with(&conn).await;

        assert!(store.write("abc123", b"foo=bar").await.unwrap());
        assert_eq!(store.read("abc123").await.unwrap(), b"foo=bar");
        assert!(store.destroy("abc123").await.unwrap());
        assert_eq!(store.read("abc123").await.unwrap(), Vec::<u8>::new());
    }

    #[tokio::test]
    async fn test_rewrite_is_idempotent() {
        let conn = MemoryConnection::new();
        let store = store_with(&conn).await;
        let records = conn.namespace("test", "sessions").unwrap();

        assert!(store.write("abc123", b"foo=bar").await.unwrap());
        let created_at = records
            .find_one(&RecordFilter::SessionId("abc123".into()))
            .await
            .unwrap()
            .unwrap()
            .created_at;

        assert!(store.write("abc123", b"foo=bar").await.unwrap());

        let record = records
            .find_one(&RecordFilter::SessionId("abc123".into()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.data, b"foo=bar");
        assert_eq!(record.created_at, created_at);
        assert_eq!(records.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_destroy_unknown_returns_false() {
        let conn = MemoryConnection::new();
        let store = store_with(&conn).await;

        assert!(!store.destroy("never-written").await.unwrap());
    }

    #[tokio::test]
    async fn test_rewrite_bumps_updated_at_only() {
        let conn = MemoryConnection::new();
        let store = store_with(&conn).await;
        let records = conn.namespace("test", "sessions").unwrap();

        records
            .insert(SessionRecord::new("abc123", b"old".to_vec(), 100))
            .await
            .unwrap();

        assert!(store.write("abc123", b"new").await.unwrap());

        let record = records
            .find_one(&RecordFilter::SessionId("abc123".into()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.data, b"new");
        assert_eq!(record.created_at, 100);
        assert!(record.updated_at > 100);
    }

    #[tokio::test]
    async fn test_cleanup_sweeps_only_expired() {
        let conn = MemoryConnection::new();
        let store = store_with(&conn).await;
        let records = conn.namespace("test", "sessions").unwrap();

        let t = now();
        records
            .insert(SessionRecord::new("stale", Vec::new(), t - 100))
            .await
            .unwrap();
        records
            .insert(SessionRecord::new("fresh", Vec::new(), t - 10))
            .await
            .unwrap();

        assert!(store.cleanup(50).await.unwrap());
        assert!(
            records
                .find_one(&RecordFilter::SessionId("stale".into()))
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            records
                .find_one(&RecordFilter::SessionId("fresh".into()))
                .await
                .unwrap()
                .is_some()
        );

        // Nothing left to sweep.
        assert!(!store.cleanup(50).await.unwrap());
    }

    #[tokio::test]
    async fn test_cleanup_idle_basis_spares_active_sessions() {
        let conn = MemoryConnection::new();
        let store = SessionStore::connect(
            SessionStoreConfig {
                expiry_basis: ExpiryBasis::UpdatedAt,
                ..SessionStoreConfig::default()
            },
            &conn,
        )
        .await
        .unwrap();
        let records = conn.namespace("test", "sessions").unwrap();

        let t = now();
        records
            .insert(SessionRecord::new("idle", Vec::new(), t - 100))
            .await
            .unwrap();
        records
            .insert(SessionRecord::new("active", Vec::new(), t - 100))
            .await
            .unwrap();

        // A write keeps "active" alive past the idle cutoff.
        assert!(store.write("active", b"still here").await.unwrap());

        assert!(store.cleanup(50).await.unwrap());
        assert!(
            records
                .find_one(&RecordFilter::SessionId("idle".into()))
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            records
                .find_one(&RecordFilter::SessionId("active".into()))
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_concurrent_first_writes_leave_one_record() {
        let conn = MemoryConnection::new();
        let store = Arc::new(store_with(&conn).await);

        let a = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.write("race1", b"first").await })
        };
        let b = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.write("race1", b"second").await })
        };
        assert!(a.await.unwrap().unwrap());
        assert!(b.await.unwrap().unwrap());

        let records = conn.namespace("test", "sessions").unwrap();
        assert_eq!(records.len().unwrap(), 1);

        let data = store.read("race1").await.unwrap();
        assert!(data == b"first" || data == b"second");
    }

    #[tokio::test]
    async fn test_empty_names_fail_construction() {
        let conn = MemoryConnection::new();

        let err = SessionStore::connect(
            SessionStoreConfig {
                database: String::new(),
                ..SessionStoreConfig::default()
            },
            &conn,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StoreError::Configuration(_)));

        let err = SessionStore::connect(
            SessionStoreConfig {
                collection: String::new(),
                ..SessionStoreConfig::default()
            },
            &conn,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StoreError::Configuration(_)));
    }
}
