//! AWS Health API event source.
//!
//! The account view reads events visible to the calling account. The
//! organization view reads events for every member account and needs the
//! organizational view enabled on the management (or delegated admin)
//! account.

use async_trait::async_trait;
use aws_sdk_health::Client;
use aws_sdk_health::primitives::DateTime;
use aws_sdk_health::types::{
    DateTimeRange, EntityFilter, EventAccountFilter, EventFilter as ApiEventFilter,
    EventTypeCategory, OrganizationEventFilter,
};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use aha_core::{AffectedEntity, EventStatus, EventSummary, upstream_timestamp};

use crate::error::HealthError;
use crate::source::{EventFilter, HealthEventSource};

/// Most account filters one affected-entities call accepts
pub const ENTITY_FILTER_BATCH: usize = 10;

/// Which Health API view to query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthView {
    Account,
    Organization,
}

pub struct AwsHealthSource {
    client: Client,
    view: HealthView,
}

impl AwsHealthSource {
    pub fn new(client: Client, view: HealthView) -> Self {
        Self { client, view }
    }

    async fn list_account_events(
        &self,
        filter: &EventFilter,
    ) -> Result<Vec<EventSummary>, HealthError> {
        let api_filter = ApiEventFilter::builder()
            .last_updated_times(time_range(filter.updated_since))
            .set_event_type_categories(categories(filter))
            .set_regions(regions(filter))
            .build();

        let mut summaries = Vec::new();
        let mut pages = self
            .client
            .describe_events()
            .filter(api_filter)
            .into_paginator()
            .send();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| HealthError::api("DescribeEvents", &e))?;
            for event in page.events() {
                summaries.push(summarize(RawEvent {
                    arn: event.arn(),
                    service: event.service(),
                    event_type_code: event.event_type_code(),
                    event_type_category: event.event_type_category().map(|c| c.as_str()),
                    region: event.region(),
                    status_code: event.status_code().map(|s| s.as_str()),
                    start_time: event.start_time(),
                    end_time: event.end_time(),
                    last_updated_time: event.last_updated_time(),
                    event_scope_code: event.event_scope_code().map(|s| s.as_str()),
                })?);
            }
        }
        Ok(summaries)
    }

    async fn list_organization_events(
        &self,
        filter: &EventFilter,
    ) -> Result<Vec<EventSummary>, HealthError> {
        let api_filter = OrganizationEventFilter::builder()
            .last_updated_time(time_range(filter.updated_since))
            .set_event_type_categories(categories(filter))
            .set_regions(regions(filter))
            .build();

        let mut summaries = Vec::new();
        let mut pages = self
            .client
            .describe_events_for_organization()
            .filter(api_filter)
            .into_paginator()
            .send();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| HealthError::api("DescribeEventsForOrganization", &e))?;
            for event in page.events() {
                summaries.push(summarize(RawEvent {
                    arn: event.arn(),
                    service: event.service(),
                    event_type_code: event.event_type_code(),
                    event_type_category: event.event_type_category().map(|c| c.as_str()),
                    region: event.region(),
                    status_code: event.status_code().map(|s| s.as_str()),
                    start_time: event.start_time(),
                    end_time: event.end_time(),
                    last_updated_time: event.last_updated_time(),
                    event_scope_code: event.event_scope_code().map(|s| s.as_str()),
                })?);
            }
        }
        Ok(summaries)
    }

    async fn account_entities(&self, arn: &str) -> Result<Vec<AffectedEntity>, HealthError> {
        let entity_filter = EntityFilter::builder()
            .event_arns(arn)
            .build()
            .map_err(|e| HealthError::Request(e.to_string()))?;

        let mut entities = Vec::new();
        let mut pages = self
            .client
            .describe_affected_entities()
            .filter(entity_filter)
            .into_paginator()
            .send();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| HealthError::api("DescribeAffectedEntities", &e))?;
            entities.extend(page.entities().iter().filter_map(|entity| {
                entity.entity_value().map(|value| {
                    AffectedEntity::new(value, entity.aws_account_id().map(str::to_string))
                })
            }));
        }
        Ok(entities)
    }

    async fn organization_entities(
        &self,
        arn: &str,
        accounts: &[String],
    ) -> Result<Vec<AffectedEntity>, HealthError> {
        let mut entities = Vec::new();

        for batch in accounts.chunks(ENTITY_FILTER_BATCH) {
            let filters = batch
                .iter()
                .map(|account_id| account_filter(arn, account_id))
                .collect::<Result<Vec<_>, _>>()?;

            #[allow(deprecated)]
            let mut pages = self
                .client
                .describe_affected_entities_for_organization()
                .set_organization_entity_filters(Some(filters))
                .into_paginator()
                .send();
            while let Some(page) = pages.next().await {
                let page = page
                    .map_err(|e| HealthError::api("DescribeAffectedEntitiesForOrganization", &e))?;
                entities.extend(page.entities().iter().filter_map(|entity| {
                    entity.entity_value().map(|value| {
                        AffectedEntity::new(value, entity.aws_account_id().map(str::to_string))
                    })
                }));
                for failed in page.failed_set() {
                    warn!(
                        event_arn = %arn,
                        account_id = failed.aws_account_id().unwrap_or("-"),
                        error_name = failed.error_name().unwrap_or("-"),
                        error = failed.error_message().unwrap_or("-"),
                        "Affected entities unavailable for account"
                    );
                }
            }
        }
        Ok(entities)
    }

    async fn account_description(
        &self,
        arn: &str,
        accounts: &[String],
    ) -> Result<String, HealthError> {
        let output = self
            .client
            .describe_event_details()
            .event_arns(arn)
            .send()
            .await
            .map_err(|e| HealthError::api("DescribeEventDetails", &e))?;

        if let Some(details) = output.successful_set().first() {
            return Ok(details
                .event_description()
                .and_then(|d| d.latest_description())
                .unwrap_or_default()
                .to_string());
        }
        match output.failed_set().first() {
            Some(failed) => Err(HealthError::EventDetails {
                account_id: accounts.first().cloned().unwrap_or_else(|| "-".to_string()),
                error_name: failed.error_name().unwrap_or("unknown").to_string(),
                message: failed.error_message().unwrap_or_default().to_string(),
            }),
            None => Err(HealthError::invalid_event(format!(
                "no details returned for {arn}"
            ))),
        }
    }

    async fn organization_description(
        &self,
        arn: &str,
        account_id: &str,
    ) -> Result<String, HealthError> {
        let output = self
            .client
            .describe_event_details_for_organization()
            .organization_event_detail_filters(account_filter(arn, account_id)?)
            .send()
            .await
            .map_err(|e| HealthError::api("DescribeEventDetailsForOrganization", &e))?;

        if let Some(details) = output.successful_set().first() {
            return Ok(details
                .event_description()
                .and_then(|d| d.latest_description())
                .unwrap_or_default()
                .to_string());
        }
        match output.failed_set().first() {
            Some(failed) => Err(HealthError::EventDetails {
                account_id: failed.aws_account_id().unwrap_or(account_id).to_string(),
                error_name: failed.error_name().unwrap_or("unknown").to_string(),
                message: failed.error_message().unwrap_or_default().to_string(),
            }),
            None => Err(HealthError::invalid_event(format!(
                "no details returned for {arn}"
            ))),
        }
    }
}

#[async_trait]
impl HealthEventSource for AwsHealthSource {
    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<EventSummary>, HealthError> {
        debug!(
            view = ?self.view,
            since = %filter.updated_since,
            categories = ?filter.categories,
            regions = ?filter.regions,
            "Searching for events"
        );
        match self.view {
            HealthView::Account => self.list_account_events(filter).await,
            HealthView::Organization => self.list_organization_events(filter).await,
        }
    }

    async fn affected_accounts(&self, event: &EventSummary) -> Result<Vec<String>, HealthError> {
        match self.view {
            HealthView::Account => {
                let entities = self.account_entities(&event.arn).await?;
                Ok(distinct_accounts(&entities))
            }
            HealthView::Organization => {
                let mut accounts = Vec::new();
                let mut pages = self
                    .client
                    .describe_affected_accounts_for_organization()
                    .event_arn(&event.arn)
                    .into_paginator()
                    .send();
                while let Some(page) = pages.next().await {
                    let page = page.map_err(|e| {
                        HealthError::api("DescribeAffectedAccountsForOrganization", &e)
                    })?;
                    accounts.extend(page.affected_accounts().iter().cloned());
                }
                Ok(accounts)
            }
        }
    }

    async fn affected_entities(
        &self,
        event: &EventSummary,
        accounts: &[String],
    ) -> Result<Vec<AffectedEntity>, HealthError> {
        match self.view {
            HealthView::Account => self.account_entities(&event.arn).await,
            HealthView::Organization => self.organization_entities(&event.arn, accounts).await,
        }
    }

    async fn latest_description(
        &self,
        event: &EventSummary,
        accounts: &[String],
    ) -> Result<String, HealthError> {
        match (self.view, accounts.first()) {
            (HealthView::Organization, Some(first)) => {
                self.organization_description(&event.arn, first).await
            }
            _ => self.account_description(&event.arn, accounts).await,
        }
    }
}

/// Borrowed view over the fields the account and organization event
/// shapes have in common.
struct RawEvent<'a> {
    arn: Option<&'a str>,
    service: Option<&'a str>,
    event_type_code: Option<&'a str>,
    event_type_category: Option<&'a str>,
    region: Option<&'a str>,
    status_code: Option<&'a str>,
    start_time: Option<&'a DateTime>,
    end_time: Option<&'a DateTime>,
    last_updated_time: Option<&'a DateTime>,
    event_scope_code: Option<&'a str>,
}

fn summarize(raw: RawEvent<'_>) -> Result<EventSummary, HealthError> {
    let arn = raw
        .arn
        .ok_or_else(|| HealthError::invalid_event("event without arn"))?
        .to_string();
    let required = |value: Option<&str>, name: &str| {
        value
            .map(str::to_string)
            .ok_or_else(|| HealthError::invalid_event(format!("{arn}: missing {name}")))
    };
    let status_code: EventStatus = required(raw.status_code, "statusCode")?.parse()?;
    let start_time = raw
        .start_time
        .ok_or_else(|| HealthError::invalid_event(format!("{arn}: missing startTime")))?;
    let last_updated_time = raw
        .last_updated_time
        .ok_or_else(|| HealthError::invalid_event(format!("{arn}: missing lastUpdatedTime")))?;

    Ok(EventSummary {
        service: required(raw.service, "service")?,
        event_type_code: raw.event_type_code.unwrap_or_default().to_string(),
        event_type_category: raw.event_type_category.unwrap_or_default().to_string(),
        region: required(raw.region, "region")?,
        status_code,
        start_time: format_timestamp(start_time)?,
        end_time: raw.end_time.map(format_timestamp).transpose()?,
        last_updated_time: format_timestamp(last_updated_time)?,
        event_scope_code: raw.event_scope_code.map(str::to_string),
        arn,
    })
}

/// Renders an SDK timestamp the way upstream event payloads print it.
pub fn format_timestamp(value: &DateTime) -> Result<String, HealthError> {
    let datetime = OffsetDateTime::from_unix_timestamp(value.secs())
        .map_err(|e| HealthError::invalid_event(e.to_string()))?
        + Duration::nanoseconds(i64::from(value.subsec_nanos()));
    Ok(upstream_timestamp(datetime)?)
}

fn time_range(since: OffsetDateTime) -> DateTimeRange {
    DateTimeRange::builder()
        .from(DateTime::from_secs(since.unix_timestamp()))
        .build()
}

fn categories(filter: &EventFilter) -> Option<Vec<EventTypeCategory>> {
    (!filter.categories.is_empty()).then(|| {
        filter
            .categories
            .iter()
            .map(|c| EventTypeCategory::from(c.as_str()))
            .collect()
    })
}

fn regions(filter: &EventFilter) -> Option<Vec<String>> {
    (!filter.regions.is_empty()).then(|| filter.regions.clone())
}

/// Account ids named by entities, first occurrence first.
fn distinct_accounts(entities: &[AffectedEntity]) -> Vec<String> {
    let mut accounts: Vec<String> = Vec::new();
    for id in entities.iter().filter_map(|e| e.account_id.as_deref()) {
        if !accounts.iter().any(|seen| seen == id) {
            accounts.push(id.to_string());
        }
    }
    accounts
}

fn account_filter(arn: &str, account_id: &str) -> Result<EventAccountFilter, HealthError> {
    EventAccountFilter::builder()
        .event_arn(arn)
        .aws_account_id(account_id)
        .build()
        .map_err(|e| HealthError::Request(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw<'a>(start: &'a DateTime, updated: &'a DateTime) -> RawEvent<'a> {
        RawEvent {
            arn: Some("arn:aws:health:us-east-1::event/EC2/X"),
            service: Some("EC2"),
            event_type_code: Some("AWS_EC2_OPERATIONAL_ISSUE"),
            event_type_category: Some("issue"),
            region: Some("us-east-1"),
            status_code: Some("open"),
            start_time: Some(start),
            end_time: None,
            last_updated_time: Some(updated),
            event_scope_code: Some("PUBLIC"),
        }
    }

    #[test]
    fn test_format_timestamp() {
        let value = DateTime::from_secs(1_684_161_000);
        assert_eq!(format_timestamp(&value).unwrap(), "2023-05-15 14:30:00+00:00");
    }

    #[test]
    fn test_summarize() {
        let start = DateTime::from_secs(1_684_161_000);
        let updated = DateTime::from_secs(1_684_161_900);
        let summary = summarize(raw(&start, &updated)).unwrap();

        assert_eq!(summary.arn, "arn:aws:health:us-east-1::event/EC2/X");
        assert_eq!(summary.status_code, EventStatus::Open);
        assert_eq!(summary.start_time, "2023-05-15 14:30:00+00:00");
        assert_eq!(summary.last_updated_time, "2023-05-15 14:45:00+00:00");
        assert_eq!(summary.end_time, None);
        assert_eq!(summary.event_scope_code.as_deref(), Some("PUBLIC"));
    }

    #[test]
    fn test_summarize_rejects_unknown_status() {
        let start = DateTime::from_secs(1_684_161_000);
        let mut event = raw(&start, &start);
        event.status_code = Some("pending");
        assert!(matches!(
            summarize(event),
            Err(HealthError::InvalidEvent(_))
        ));
    }

    #[test]
    fn test_summarize_requires_region() {
        let start = DateTime::from_secs(1_684_161_000);
        let mut event = raw(&start, &start);
        event.region = None;
        let err = summarize(event).unwrap_err();
        assert!(err.to_string().contains("missing region"));
    }

    #[test]
    fn test_category_filter_conversion() {
        let filter = EventFilter::new(1, OffsetDateTime::UNIX_EPOCH).issues_only();
        let converted = categories(&filter).unwrap();
        assert_eq!(
            converted,
            vec![EventTypeCategory::Issue, EventTypeCategory::Investigation]
        );
        assert!(regions(&filter).is_none());
    }

    #[test]
    fn test_distinct_accounts_keeps_first_seen_order() {
        let entities = [
            AffectedEntity::new("i-1", Some("222233334444".to_string())),
            AffectedEntity::new("i-2", Some("111122223333".to_string())),
            AffectedEntity::new("UNKNOWN", None),
            AffectedEntity::new("i-3", Some("222233334444".to_string())),
        ];
        assert_eq!(
            distinct_accounts(&entities),
            vec!["222233334444", "111122223333"]
        );
        assert!(distinct_accounts(&[AffectedEntity::new("UNKNOWN", None)]).is_empty());
    }
}
