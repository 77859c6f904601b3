//! Document-store session persistence.
//!
//! Provides:
//! - `SessionStore` - The `SessionHandler` adapter over a document collection
//! - Backend implementations (memory, MongoDB)

pub mod backend;
pub mod store;

pub use store::{ExpiryBasis, SessionStore, SessionStoreConfig};
