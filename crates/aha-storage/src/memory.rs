use async_trait::async_trait;
use dashmap::DashMap;

use aha_core::{TrackedEventRecord, now_epoch};

use crate::error::StorageError;
use crate::traits::StateStore;

/// In-memory state store.
///
/// Expired records are treated as absent on read and purged lazily, which
/// mirrors a TTL-enforcing backend closely enough for local runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    records: DashMap<String, TrackedEventRecord>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held, expired or not.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Clone of the raw record for an ARN, ignoring expiry.
    pub fn snapshot(&self, arn: &str) -> Option<TrackedEventRecord> {
        self.records.get(arn).map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, arn: &str) -> Result<Option<TrackedEventRecord>, StorageError> {
        let now = now_epoch();
        let expired = match self.records.get(arn) {
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value().clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.records.remove_if(arn, |_, record| record.is_expired(now));
        }
        Ok(None)
    }

    async fn put(&self, record: &TrackedEventRecord) -> Result<(), StorageError> {
        self.records.insert(record.arn.clone(), record.clone());
        Ok(())
    }
}
