//! Session record data model.

use serde::{Deserialize, Serialize};

/// Persisted session state, one document per active session.
///
/// The payload is opaque to this layer: whatever the lifecycle manager
/// serialized is stored byte-for-byte and handed back on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Unique session identifier. Immutable after creation.
    pub session_id: String,
    /// Opaque payload, fully replaced on every write.
    pub data: Vec<u8>,
    /// Creation timestamp (Unix epoch seconds). Set once, never updated.
    pub created_at: i64,
    /// Last write timestamp (Unix epoch seconds).
    pub updated_at: i64,
}

impl SessionRecord {
    /// Create a fresh record stamped at `now`.
    #[must_use]
    pub fn new(session_id: impl Into<String>, data: Vec<u8>, now: i64) -> Self {
        Self {
            session_id: session_id.into(),
            data,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Filter for collection queries.
///
/// These are the only selections the session adapter ever makes: a single
/// record by id, or the batch of records older than an expiry cutoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordFilter {
    /// Match the record with this session id.
    SessionId(String),
    /// Match every record whose `created_at` is strictly before the cutoff.
    CreatedBefore(i64),
    /// Match every record whose `updated_at` is strictly before the cutoff.
    UpdatedBefore(i64),
}

impl RecordFilter {
    /// Whether `record` is selected by this filter.
    #[must_use]
    pub fn matches(&self, record: &SessionRecord) -> bool {
        match self {
            Self::SessionId(id) => record.session_id == *id,
            Self::CreatedBefore(cutoff) => record.created_at < *cutoff,
            Self::UpdatedBefore(cutoff) => record.updated_at < *cutoff,
        }
    }
}
