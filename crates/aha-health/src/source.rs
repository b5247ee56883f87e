use async_trait::async_trait;
use time::{Duration, OffsetDateTime};

use aha_core::{AffectedEntity, EventSummary};

use crate::error::HealthError;

/// Categories polled when only issues are of interest
pub const ISSUE_CATEGORIES: [&str; 2] = ["issue", "investigation"];

/// Query window and allowlists for one poll pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    /// Events last updated at or after this instant
    pub updated_since: OffsetDateTime,

    /// Empty means every category
    pub categories: Vec<String>,

    /// Empty means every region
    pub regions: Vec<String>,
}

impl EventFilter {
    pub fn new(lookback_hours: u32, now: OffsetDateTime) -> Self {
        Self {
            updated_since: now - Duration::hours(i64::from(lookback_hours)),
            categories: Vec::new(),
            regions: Vec::new(),
        }
    }

    pub fn issues_only(mut self) -> Self {
        self.categories = ISSUE_CATEGORIES.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_regions(mut self, regions: Vec<String>) -> Self {
        self.regions = regions;
        self
    }
}

/// Upstream event feed.
///
/// Listing returns bare summaries; the poll loop resolves accounts first so
/// it can apply exclusions before paying for the entity and detail lookups.
#[async_trait]
pub trait HealthEventSource: Send + Sync {
    /// Events matching the filter, across all pages
    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<EventSummary>, HealthError>;

    /// Account ids affected by an event
    async fn affected_accounts(&self, event: &EventSummary) -> Result<Vec<String>, HealthError>;

    /// Affected entities, scoped to the given accounts where the view supports it
    async fn affected_entities(
        &self,
        event: &EventSummary,
        accounts: &[String],
    ) -> Result<Vec<AffectedEntity>, HealthError>;

    /// Latest update text for an event
    async fn latest_description(
        &self,
        event: &EventSummary,
        accounts: &[String],
    ) -> Result<String, HealthError>;
}
