//! Core abstractions for document-store session persistence.
//!
//! This crate provides the fundamental building blocks:
//! - `SessionRecord` - One document per active session
//! - `RecordFilter` - The filters the adapter issues against a collection
//! - `DocumentCollection` / `DocumentConnection` - Storage capability traits
//! - `SessionHandler` - The surface consumed by a session-lifecycle manager

pub mod record;
pub mod traits;

pub use record::{RecordFilter, SessionRecord};
pub use traits::{DocumentCollection, DocumentConnection, SessionHandler, StoreError};
