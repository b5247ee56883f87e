//! End-to-end poll passes against an in-memory store, a scripted event
//! source and recording channel adapters.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use aha_core::{AffectedEntity, EventStatus, EventSummary, TrackedEventRecord};
use aha_health::{EventFilter, ExclusionList, HealthError, HealthEventSource, IdOnlyDirectory};
use aha_notifications::{
    Channel, Dispatcher, NotificationAdapter, NotificationError, Payload, SendResult,
};
use aha_server::{ExclusionSource, PollSettings, PollSummary, Poller};
use aha_storage::{MemoryStateStore, StateStore, StorageError};

const ARN: &str = "arn:aws:health:us-east-1::event/EC2/X";
const ACCOUNT: &str = "123456789012";

#[derive(Default)]
struct ScriptedSource {
    events: Mutex<Vec<EventSummary>>,
    accounts: Mutex<HashMap<String, Vec<String>>>,
    entities: Mutex<Vec<AffectedEntity>>,
    description: Mutex<String>,
    broken_details: Mutex<Vec<String>>,
}

impl ScriptedSource {
    fn publish(&self, event: EventSummary) {
        self.events.lock().unwrap().push(event);
    }

    fn replace(&self, event: EventSummary) {
        *self.events.lock().unwrap() = vec![event];
    }
}

#[async_trait]
impl HealthEventSource for ScriptedSource {
    async fn list_events(&self, _filter: &EventFilter) -> Result<Vec<EventSummary>, HealthError> {
        Ok(self.events.lock().unwrap().clone())
    }

    async fn affected_accounts(&self, event: &EventSummary) -> Result<Vec<String>, HealthError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .get(&event.arn)
            .cloned()
            .unwrap_or_else(|| vec![ACCOUNT.to_string()]))
    }

    async fn affected_entities(
        &self,
        _event: &EventSummary,
        _accounts: &[String],
    ) -> Result<Vec<AffectedEntity>, HealthError> {
        Ok(self.entities.lock().unwrap().clone())
    }

    async fn latest_description(
        &self,
        event: &EventSummary,
        _accounts: &[String],
    ) -> Result<String, HealthError> {
        if self.broken_details.lock().unwrap().contains(&event.arn) {
            return Err(HealthError::EventDetails {
                account_id: ACCOUNT.to_string(),
                error_name: "InternalError".to_string(),
                message: "details unavailable".to_string(),
            });
        }
        Ok(self.description.lock().unwrap().clone())
    }
}

struct Recorder {
    channel: Channel,
    sent: Mutex<Vec<Payload>>,
}

impl Recorder {
    fn new(channel: Channel) -> Arc<Self> {
        Arc::new(Self {
            channel,
            sent: Mutex::new(Vec::new()),
        })
    }

    fn json(&self) -> Vec<Value> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|payload| match payload {
                Payload::Json(value) => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationAdapter for Recorder {
    async fn send(&self, payload: &Payload) -> Result<SendResult, NotificationError> {
        self.sent.lock().unwrap().push(payload.clone());
        Ok(SendResult::delivered(None))
    }

    fn supports(&self, channel: Channel) -> bool {
        channel == self.channel
    }
}

struct Unreachable;

#[async_trait]
impl NotificationAdapter for Unreachable {
    async fn send(&self, _payload: &Payload) -> Result<SendResult, NotificationError> {
        Err(NotificationError::send_failed("connection refused"))
    }

    fn supports(&self, _channel: Channel) -> bool {
        true
    }
}

struct ReadOnlyStore(MemoryStateStore);

#[async_trait]
impl StateStore for ReadOnlyStore {
    async fn get(&self, arn: &str) -> Result<Option<TrackedEventRecord>, StorageError> {
        self.0.get(arn).await
    }

    async fn put(&self, _record: &TrackedEventRecord) -> Result<(), StorageError> {
        Err(StorageError::unavailable("table unavailable"))
    }
}

fn summary(status: EventStatus, last_updated: &str) -> EventSummary {
    EventSummary {
        arn: ARN.to_string(),
        service: "EC2".to_string(),
        event_type_code: "AWS_EC2_OPERATIONAL_ISSUE".to_string(),
        event_type_category: "issue".to_string(),
        region: "us-east-1".to_string(),
        status_code: status,
        start_time: "2023-05-15 14:30:45+00:00".to_string(),
        end_time: (status == EventStatus::Closed).then(|| "2023-05-15 16:02:10+00:00".to_string()),
        last_updated_time: last_updated.to_string(),
        event_scope_code: Some("ACCOUNT_SPECIFIC".to_string()),
    }
}

fn settings(organization_mode: bool) -> PollSettings {
    PollSettings {
        lookback_hours: 1,
        organization_mode,
        ..Default::default()
    }
}

struct Harness {
    source: Arc<ScriptedSource>,
    store: Arc<MemoryStateStore>,
    slack: Arc<Recorder>,
    poller: Poller,
}

fn harness(organization_mode: bool) -> Harness {
    let source = Arc::new(ScriptedSource::default());
    *source.description.lock().unwrap() = "We are investigating increased error rates.".to_string();
    *source.entities.lock().unwrap() =
        vec![AffectedEntity::new("i-0abc123", Some(ACCOUNT.to_string()))];
    let store = Arc::new(MemoryStateStore::new());
    let slack = Recorder::new(Channel::SlackWebhook);

    let poller = Poller::new(
        source.clone(),
        store.clone(),
        Dispatcher::new().with_route(Channel::SlackWebhook, slack.clone()),
        Arc::new(IdOnlyDirectory),
        settings(organization_mode),
    );
    Harness {
        source,
        store,
        slack,
        poller,
    }
}

fn field<'a>(message: &'a Value, title: &str) -> Option<&'a Value> {
    message["attachments"][0]["fields"]
        .as_array()?
        .iter()
        .find(|f| f["title"] == title)
        .map(|f| &f["value"])
}

#[tokio::test]
async fn test_new_event_is_persisted_and_notified() {
    let h = harness(false);
    h.source.publish(summary(EventStatus::Open, "2023-05-15 15:45:00+00:00"));

    let result = h.poller.run_once().await.unwrap();
    assert_eq!(
        result,
        PollSummary {
            fetched: 1,
            new: 1,
            ..Default::default()
        }
    );

    let record = h.store.snapshot(ARN).unwrap();
    assert_eq!(record.status_code, EventStatus::Open);
    assert!(record.added_at <= record.expires_at);

    let messages = h.slack.json();
    assert_eq!(messages.len(), 1);
    let text = messages[0]["text"].as_str().unwrap();
    assert!(text.contains("[NEW]"));
    assert!(text.contains("EC2 service in the US-EAST-1 region"));
    assert_eq!(
        field(&messages[0], "Account(s)").unwrap(),
        "123456789012 (123456789012)"
    );
    assert!(field(&messages[0], "End Time (UTC)").is_none());
}

#[tokio::test]
async fn test_repeat_poll_is_unchanged() {
    let h = harness(false);
    h.source.publish(summary(EventStatus::Open, "2023-05-15 15:45:00+00:00"));

    h.poller.run_once().await.unwrap();
    let second = h.poller.run_once().await.unwrap();

    assert_eq!(second.unchanged, 1);
    assert_eq!(second.new + second.updated, 0);
    assert_eq!(h.slack.count(), 1);
}

#[tokio::test]
async fn test_resolution_notifies_with_end_time() {
    let h = harness(false);
    h.source.publish(summary(EventStatus::Open, "2023-05-15 15:45:00+00:00"));
    h.poller.run_once().await.unwrap();
    let first = h.store.snapshot(ARN).unwrap();

    h.source.replace(summary(EventStatus::Closed, "2023-05-15 16:05:00+00:00"));
    let result = h.poller.run_once().await.unwrap();
    assert_eq!(result.updated, 1);

    let record = h.store.snapshot(ARN).unwrap();
    assert_eq!(record.status_code, EventStatus::Closed);
    assert_eq!(record.added_at, first.added_at);

    let messages = h.slack.json();
    assert_eq!(messages.len(), 2);
    assert!(messages[1]["text"].as_str().unwrap().contains("[RESOLVED]"));
    assert!(field(&messages[1], "End Time (UTC)").is_some());
}

#[tokio::test]
async fn test_timestamp_only_change_is_ignored() {
    let h = harness(false);
    h.source.publish(summary(EventStatus::Open, "2023-05-15 15:45:00+00:00"));
    h.poller.run_once().await.unwrap();
    let first = h.store.snapshot(ARN).unwrap();

    h.source.replace(summary(EventStatus::Open, "2023-05-15 15:50:00+00:00"));
    let result = h.poller.run_once().await.unwrap();

    assert_eq!(result.unchanged, 1);
    assert_eq!(h.slack.count(), 1);
    assert_eq!(h.store.snapshot(ARN).unwrap(), first);
}

#[tokio::test]
async fn test_unknown_entity_renders_placeholder() {
    let h = harness(false);
    *h.source.entities.lock().unwrap() = vec![AffectedEntity::new("UNKNOWN", None)];
    h.source.publish(summary(EventStatus::Open, "2023-05-15 15:45:00+00:00"));

    h.poller.run_once().await.unwrap();

    let messages = h.slack.json();
    let resources = field(&messages[0], "Resource(s)").unwrap().as_str().unwrap();
    assert_eq!(resources, "All resources\nin region");
}

#[tokio::test]
async fn test_fully_excluded_event_is_skipped() {
    let h = harness(true);
    let poller = h
        .poller
        .with_exclusions(ExclusionSource::Static(ExclusionList::parse("123456789012\n")));
    h.source.publish(summary(EventStatus::Open, "2023-05-15 15:45:00+00:00"));

    let result = poller.run_once().await.unwrap();

    assert_eq!(result.skipped_excluded, 1);
    assert!(h.store.is_empty());
    assert_eq!(h.slack.count(), 0);
}

#[tokio::test]
async fn test_exclusions_ignored_outside_organization_mode() {
    let h = harness(false);
    let poller = h
        .poller
        .with_exclusions(ExclusionSource::Static(ExclusionList::parse("123456789012\n")));
    h.source.publish(summary(EventStatus::Open, "2023-05-15 15:45:00+00:00"));

    let result = poller.run_once().await.unwrap();

    assert_eq!(result.new, 1);
    assert_eq!(h.slack.count(), 1);
}

#[tokio::test]
async fn test_partially_excluded_event_keeps_remaining_accounts() {
    let h = harness(true);
    let poller = h
        .poller
        .with_exclusions(ExclusionSource::Static(ExclusionList::parse("123456789012\n")));
    h.source.accounts.lock().unwrap().insert(
        ARN.to_string(),
        vec![ACCOUNT.to_string(), "210987654321".to_string()],
    );
    h.source.publish(summary(EventStatus::Open, "2023-05-15 15:45:00+00:00"));

    poller.run_once().await.unwrap();

    let record = h.store.snapshot(ARN).unwrap();
    assert_eq!(record.affected_account_ids, vec!["210987654321"]);
}

#[tokio::test]
async fn test_failed_details_skip_only_that_event() {
    let h = harness(false);
    let mut other = summary(EventStatus::Open, "2023-05-15 15:45:00+00:00");
    other.arn = "arn:aws:health:us-east-1::event/RDS/Y".to_string();
    other.service = "RDS".to_string();
    h.source.publish(summary(EventStatus::Open, "2023-05-15 15:45:00+00:00"));
    h.source.publish(other);
    h.source.broken_details.lock().unwrap().push(ARN.to_string());

    let result = h.poller.run_once().await.unwrap();

    assert_eq!(result.fetched, 2);
    assert_eq!(result.failed, 1);
    assert_eq!(result.new, 1);
    assert!(h.store.snapshot(ARN).is_none());
    assert!(h.store.snapshot("arn:aws:health:us-east-1::event/RDS/Y").is_some());
}

#[tokio::test]
async fn test_failing_channel_does_not_block_others() {
    let source = Arc::new(ScriptedSource::default());
    source.publish(summary(EventStatus::Open, "2023-05-15 15:45:00+00:00"));
    let store = Arc::new(MemoryStateStore::new());
    let chime = Recorder::new(Channel::Chime);
    let dispatcher = Dispatcher::new()
        .with_route(Channel::Teams, Arc::new(Unreachable))
        .with_route(Channel::Chime, chime.clone());
    let poller = Poller::new(
        source,
        store.clone(),
        dispatcher,
        Arc::new(IdOnlyDirectory),
        settings(false),
    );

    let result = poller.run_once().await.unwrap();

    assert_eq!(result.new, 1);
    assert_eq!(result.delivery_failures, 1);
    assert_eq!(chime.count(), 1);
    assert!(store.snapshot(ARN).is_some());
}

#[tokio::test]
async fn test_persistence_failure_suppresses_notification() {
    let source = Arc::new(ScriptedSource::default());
    source.publish(summary(EventStatus::Open, "2023-05-15 15:45:00+00:00"));
    let slack = Recorder::new(Channel::SlackWebhook);
    let poller = Poller::new(
        source,
        Arc::new(ReadOnlyStore(MemoryStateStore::new())),
        Dispatcher::new().with_route(Channel::SlackWebhook, slack.clone()),
        Arc::new(IdOnlyDirectory),
        settings(false),
    );

    let result = poller.run_once().await.unwrap();

    assert_eq!(result.failed, 1);
    assert_eq!(slack.count(), 0);
}

#[tokio::test]
async fn test_empty_fetch_is_not_an_error() {
    let h = harness(false);
    let result = h.poller.run_once().await.unwrap();
    assert_eq!(result, PollSummary::default());
}
