//! The state store contract used by the poll loop.

use async_trait::async_trait;

use aha_core::TrackedEventRecord;

use crate::error::StorageError;

/// Key-value persistence for tracked events, one row per event ARN.
///
/// Implementations must be thread-safe (`Send + Sync`). Expiry is the
/// store's job: a record whose `expires_at` has passed may be dropped at any
/// time and is then reported as absent.
///
/// # Example
///
/// ```ignore
/// use aha_storage::{StateStore, StorageError};
///
/// async fn seen_before(store: &dyn StateStore, arn: &str) -> Result<bool, StorageError> {
///     Ok(store.get(arn).await?.is_some())
/// }
/// ```
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Reads the record for an event ARN.
    ///
    /// Returns `None` if the ARN has not been seen or its record expired.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues or undecodable rows,
    /// not for missing records.
    async fn get(&self, arn: &str) -> Result<Option<TrackedEventRecord>, StorageError>;

    /// Writes a record, replacing any existing one for the same ARN.
    async fn put(&self, record: &TrackedEventRecord) -> Result<(), StorageError>;
}
