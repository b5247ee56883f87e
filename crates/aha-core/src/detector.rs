//! Change detection against the persisted per-ARN state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::event::{Event, EventStatus};
use crate::record::TrackedEventRecord;
use crate::time::epoch_seconds;

/// Outcome of comparing an event with its stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Change {
    New,
    Updated,
    Unchanged,
}

impl Change {
    /// Whether the caller should persist a record and notify.
    pub fn is_actionable(&self) -> bool {
        matches!(self, Self::New | Self::Updated)
    }
}

/// Notification flavor handed to formatters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Create,
    Resolve,
}

impl EventType {
    pub fn for_status(status: EventStatus) -> Self {
        match status {
            EventStatus::Closed => Self::Resolve,
            EventStatus::Open | EventStatus::Upcoming => Self::Create,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Resolve => "resolve",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides whether an event is new, updated or unchanged and builds the
/// replacement record.
#[derive(Debug, Clone, Copy)]
pub struct ChangeDetector {
    lookback_hours: u32,
}

impl ChangeDetector {
    pub fn new(lookback_hours: u32) -> Self {
        Self { lookback_hours }
    }

    /// Compares an event with its stored record.
    ///
    /// A moved `lastUpdatedTime` alone is not a change: status, description
    /// or affected accounts must differ as well.
    pub fn detect(&self, event: &Event, stored: Option<&TrackedEventRecord>) -> Result<Change> {
        let Some(stored) = stored else {
            return Ok(Change::New);
        };

        let last_updated = epoch_seconds(&event.last_updated_time)?.to_string();
        if stored.last_updated_time == last_updated {
            return Ok(Change::Unchanged);
        }

        let differs = stored.status_code != event.status_code
            || stored.latest_description != event.latest_description
            || stored.affected_account_ids != event.affected_account_ids;

        Ok(if differs {
            Change::Updated
        } else {
            Change::Unchanged
        })
    }

    /// Full replacement record for an event observed at `now`.
    ///
    /// The first-seen time is carried over from the previous record.
    pub fn record_for(
        &self,
        event: &Event,
        previous: Option<&TrackedEventRecord>,
        now: i64,
    ) -> Result<TrackedEventRecord> {
        Ok(TrackedEventRecord {
            arn: event.arn.clone(),
            last_updated_time: epoch_seconds(&event.last_updated_time)?.to_string(),
            status_code: event.status_code,
            latest_description: event.latest_description.clone(),
            affected_account_ids: event.affected_account_ids.clone(),
            added_at: previous.map_or(now, |record| record.added_at),
            expires_at: TrackedEventRecord::expiry_for(now, self.lookback_hours),
        })
    }
}
