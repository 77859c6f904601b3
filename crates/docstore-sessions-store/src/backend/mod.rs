//! Backend implementations.

#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "mongo")]
pub mod mongo;

#[cfg(feature = "memory")]
pub use memory::MemoryConnection;

#[cfg(feature = "mongo")]
pub use mongo::MongoConnection;
