use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Health event status as reported upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Open,
    Upcoming,
    Closed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Upcoming => "upcoming",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "open" => Ok(Self::Open),
            "upcoming" => Ok(Self::Upcoming),
            "closed" => Ok(Self::Closed),
            other => Err(CoreError::invalid_status(other)),
        }
    }
}

/// A resource (or account) reported as impacted by an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedEntity {
    pub entity_value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
}

impl AffectedEntity {
    pub fn new(entity_value: impl Into<String>, account_id: Option<String>) -> Self {
        Self {
            entity_value: entity_value.into(),
            account_id,
            account_name: None,
        }
    }
}

/// Event as listed by the upstream query, before affected accounts,
/// entities and the latest description are resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub arn: String,
    pub service: String,
    #[serde(default)]
    pub event_type_code: String,
    #[serde(default)]
    pub event_type_category: String,
    pub region: String,
    pub status_code: EventStatus,
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub last_updated_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_scope_code: Option<String>,
}

impl EventSummary {
    /// Attaches the resolved context, producing a complete event.
    pub fn into_event(
        self,
        latest_description: impl Into<String>,
        affected_account_ids: Vec<String>,
        affected_entities: Vec<AffectedEntity>,
    ) -> Event {
        Event {
            arn: self.arn,
            service: self.service,
            event_type_code: self.event_type_code,
            event_type_category: self.event_type_category,
            region: self.region,
            status_code: self.status_code,
            start_time: self.start_time,
            end_time: self.end_time,
            last_updated_time: self.last_updated_time,
            event_scope_code: self.event_scope_code,
            latest_description: latest_description.into(),
            affected_account_ids,
            affected_entities,
        }
    }
}

/// A health event with its affected accounts, entities and latest update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub arn: String,
    pub service: String,
    #[serde(default)]
    pub event_type_code: String,
    #[serde(default)]
    pub event_type_category: String,
    pub region: String,
    pub status_code: EventStatus,
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub last_updated_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_scope_code: Option<String>,

    /// Most recent human-readable update
    #[serde(default)]
    pub latest_description: String,

    /// Empty means all accounts in the region
    #[serde(default)]
    pub affected_account_ids: Vec<String>,

    /// Empty means all resources
    #[serde(default)]
    pub affected_entities: Vec<AffectedEntity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> EventSummary {
        EventSummary {
            arn: "arn:aws:health:us-east-1::event/EC2/X".to_string(),
            service: "EC2".to_string(),
            event_type_code: "AWS_EC2_OPERATIONAL_ISSUE".to_string(),
            event_type_category: "issue".to_string(),
            region: "us-east-1".to_string(),
            status_code: EventStatus::Open,
            start_time: "2023-05-15 14:30:00+00:00".to_string(),
            end_time: None,
            last_updated_time: "2023-05-15 14:45:00+00:00".to_string(),
            event_scope_code: Some("PUBLIC".to_string()),
        }
    }

    #[test]
    fn test_status_round_trip_str() {
        for status in [EventStatus::Open, EventStatus::Upcoming, EventStatus::Closed] {
            assert_eq!(status.as_str().parse::<EventStatus>().unwrap(), status);
        }
        assert!("pending".parse::<EventStatus>().is_err());
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_string(&EventStatus::Closed).unwrap();
        assert_eq!(json, "\"closed\"");
    }

    #[test]
    fn test_into_event_carries_context() {
        let event = summary().into_event(
            "We are investigating increased error rates.",
            vec!["123456789012".to_string()],
            vec![AffectedEntity::new("i-abc", Some("123456789012".to_string()))],
        );
        assert_eq!(event.arn, "arn:aws:health:us-east-1::event/EC2/X");
        assert_eq!(event.affected_account_ids, vec!["123456789012"]);
        assert_eq!(event.affected_entities.len(), 1);
        assert_eq!(event.status_code, EventStatus::Open);
    }

    #[test]
    fn test_event_deserializes_camel_case() {
        let event: Event = serde_json::from_value(serde_json::json!({
            "arn": "arn:aws:health:eu-west-1::event/S3/Y",
            "service": "S3",
            "region": "eu-west-1",
            "statusCode": "closed",
            "startTime": "2023-05-15 14:30:00+00:00",
            "endTime": "2023-05-15 16:00:00+00:00",
            "lastUpdatedTime": "2023-05-15 16:05:00+00:00",
            "latestDescription": "Resolved."
        }))
        .unwrap();
        assert_eq!(event.status_code, EventStatus::Closed);
        assert!(event.affected_entities.is_empty());
        assert_eq!(event.end_time.as_deref(), Some("2023-05-15 16:00:00+00:00"));
    }
}
