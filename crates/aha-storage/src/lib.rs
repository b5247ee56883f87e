//! Tracked event state store for AHA.
//!
//! This crate defines the [`StateStore`] contract the poll loop persists
//! dedup state through, with two backends: an in-memory map for local runs
//! and tests, and a DynamoDB table whose TTL attribute expires old rows.

pub mod dynamodb;
pub mod error;
pub mod memory;
pub mod traits;

pub use dynamodb::DynamoStateStore;
pub use error::StorageError;
pub use memory::MemoryStateStore;
pub use traits::StateStore;

/// Type alias for a shareable StateStore instance.
pub type DynStateStore = std::sync::Arc<dyn StateStore>;
