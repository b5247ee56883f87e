use serde::{Deserialize, Serialize};

use crate::event::EventStatus;

/// Seconds a record outlives the lookback window before the store expires it
pub const EXPIRY_GRACE_SECS: i64 = 24 * 3600;

/// Persisted dedup state, one per event ARN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedEventRecord {
    pub arn: String,

    /// Epoch seconds, as a string, of the event's last upstream update
    pub last_updated_time: String,

    pub status_code: EventStatus,
    pub latest_description: String,
    pub affected_account_ids: Vec<String>,

    /// Epoch seconds when the ARN was first seen
    pub added_at: i64,

    /// Epoch seconds after which the store may drop the record
    pub expires_at: i64,
}

impl TrackedEventRecord {
    /// Expiry for a record written at `now` with the given lookback window.
    pub fn expiry_for(now: i64, lookback_hours: u32) -> i64 {
        now + i64::from(lookback_hours) * 3600 + EXPIRY_GRACE_SECS
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}
