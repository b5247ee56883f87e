//! One poll pass: fetch, resolve context, detect, persist, notify.
//!
//! Events are handled one at a time. A failure scoped to one event is logged
//! and counted; only failures that make the whole pass meaningless (listing
//! events, loading the exclusion list) end it early.

use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use aha_core::{Change, ChangeDetector, CoreError, EventSummary};
use aha_health::{
    AccountDirectory, EventFilter, ExclusionList, Filtered, HealthError, HealthEventSource,
    account_labels,
};
use aha_notifications::{DispatchReport, Dispatcher, NotificationContext};
use aha_storage::{DynStateStore, StorageError};

#[derive(Debug, Error)]
pub enum PollError {
    #[error(transparent)]
    Health(#[from] HealthError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl PollError {
    /// Whether the failure concerns only the event being processed rather
    /// than the service behind it
    pub fn is_event_scoped(&self) -> bool {
        match self {
            Self::Health(e) => e.is_event_scoped(),
            Self::Storage(e) => matches!(e, StorageError::InvalidRecord { .. }),
            Self::Core(_) => true,
        }
    }
}

/// Counters for one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub fetched: usize,
    pub skipped_excluded: usize,
    pub unchanged: usize,
    pub new: usize,
    pub updated: usize,
    /// Events dropped by a lookup, decode or persistence error
    pub failed: usize,
    /// Channel deliveries that did not go through
    pub delivery_failures: usize,
}

/// Where the organization-mode exclusion list comes from
pub enum ExclusionSource {
    None,
    Static(ExclusionList),
    S3 {
        client: aws_sdk_s3::Client,
        bucket: String,
        key: String,
    },
}

impl ExclusionSource {
    async fn load(&self) -> Result<ExclusionList, HealthError> {
        match self {
            Self::None => Ok(ExclusionList::default()),
            Self::Static(list) => Ok(list.clone()),
            Self::S3 {
                client,
                bucket,
                key,
            } => ExclusionList::load_from_s3(client, bucket, key).await,
        }
    }
}

/// Query shape for a pass
#[derive(Debug, Clone, Default)]
pub struct PollSettings {
    pub lookback_hours: u32,
    pub issues_only: bool,
    /// Empty means every region
    pub regions: Vec<String>,
    pub organization_mode: bool,
}

impl PollSettings {
    fn filter(&self, now: OffsetDateTime) -> EventFilter {
        let filter = EventFilter::new(self.lookback_hours, now).with_regions(self.regions.clone());
        if self.issues_only {
            filter.issues_only()
        } else {
            filter
        }
    }
}

/// What happened to a single event
enum Outcome {
    Excluded,
    Unchanged,
    Notified(Change, DispatchReport),
}

pub struct Poller {
    source: Arc<dyn HealthEventSource>,
    store: DynStateStore,
    dispatcher: Dispatcher,
    directory: Arc<dyn AccountDirectory>,
    exclusions: ExclusionSource,
    detector: ChangeDetector,
    settings: PollSettings,
}

impl Poller {
    pub fn new(
        source: Arc<dyn HealthEventSource>,
        store: DynStateStore,
        dispatcher: Dispatcher,
        directory: Arc<dyn AccountDirectory>,
        settings: PollSettings,
    ) -> Self {
        Self {
            source,
            store,
            dispatcher,
            directory,
            exclusions: ExclusionSource::None,
            detector: ChangeDetector::new(settings.lookback_hours),
            settings,
        }
    }

    /// Exclusions only apply in organization mode.
    pub fn with_exclusions(mut self, exclusions: ExclusionSource) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Runs one pass against the current time.
    pub async fn run_once(&self) -> Result<PollSummary, PollError> {
        self.run_at(OffsetDateTime::now_utc()).await
    }

    /// Runs one pass as if the clock read `now`.
    pub async fn run_at(&self, now: OffsetDateTime) -> Result<PollSummary, PollError> {
        let exclusions = if self.settings.organization_mode {
            self.exclusions.load().await?
        } else {
            ExclusionList::default()
        };

        let filter = self.settings.filter(now);
        let events = self.source.list_events(&filter).await?;

        let mut summary = PollSummary {
            fetched: events.len(),
            ..Default::default()
        };
        if events.is_empty() {
            info!(
                lookback_hours = self.settings.lookback_hours,
                "No events found in time frame"
            );
            return Ok(summary);
        }

        for event in events {
            let arn = event.arn.clone();
            match self.process(event, &exclusions, now.unix_timestamp()).await {
                Ok(Outcome::Excluded) => summary.skipped_excluded += 1,
                Ok(Outcome::Unchanged) => summary.unchanged += 1,
                Ok(Outcome::Notified(change, report)) => {
                    match change {
                        Change::New => summary.new += 1,
                        _ => summary.updated += 1,
                    }
                    summary.delivery_failures += report.failed.len();
                }
                Err(e) => {
                    let scope = if e.is_event_scoped() { "event" } else { "service" };
                    warn!(event_arn = %arn, scope, error = %e, "Skipping event");
                    summary.failed += 1;
                }
            }
        }

        info!(
            fetched = summary.fetched,
            skipped_excluded = summary.skipped_excluded,
            unchanged = summary.unchanged,
            new = summary.new,
            updated = summary.updated,
            failed = summary.failed,
            delivery_failures = summary.delivery_failures,
            "Poll pass complete"
        );
        Ok(summary)
    }

    async fn process(
        &self,
        summary: EventSummary,
        exclusions: &ExclusionList,
        now: i64,
    ) -> Result<Outcome, PollError> {
        let accounts = self.source.affected_accounts(&summary).await?;
        let accounts = match exclusions.filter(accounts) {
            Filtered::Keep(accounts) => accounts,
            Filtered::AllExcluded => {
                debug!(event_arn = %summary.arn, "All affected accounts excluded");
                return Ok(Outcome::Excluded);
            }
        };

        let entities = self.source.affected_entities(&summary, &accounts).await?;
        let description = self.source.latest_description(&summary, &accounts).await?;
        let event = summary.into_event(description, accounts, entities);

        let stored = self.store.get(&event.arn).await?;
        let change = self.detector.detect(&event, stored.as_ref())?;
        if !change.is_actionable() {
            debug!(event_arn = %event.arn, "Event unchanged");
            return Ok(Outcome::Unchanged);
        }

        // Persist before notifying; a failed write leaves the event to the next pass.
        let record = self.detector.record_for(&event, stored.as_ref(), now)?;
        self.store.put(&record).await?;
        info!(
            event_arn = %event.arn,
            change = ?change,
            status = %event.status_code,
            "Tracked event changed"
        );

        let labels = account_labels(self.directory.as_ref(), &event.affected_account_ids).await;
        let ctx = NotificationContext::for_event(event, labels);
        let report = self.dispatcher.dispatch(&ctx).await;
        if !report.all_delivered() {
            warn!(
                event_arn = %ctx.event.arn,
                delivered = report.delivered.len(),
                attempted = report.attempted(),
                "Notification not delivered to every channel"
            );
        }
        Ok(Outcome::Notified(change, report))
    }
}
