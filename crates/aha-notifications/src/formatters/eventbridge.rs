use serde_json::{Map, Value, json};

use aha_core::LabelKind;
use aha_core::labels::label_list;

use crate::error::NotificationError;
use crate::types::{NotificationContext, Payload};

/// Source tag on every bus entry
pub const EVENT_SOURCE: &str = "aha";

/// Event detail in the shape native health events use: `arn` becomes
/// `eventArn` and the latest update sits under `eventDescription`.
pub fn detail(ctx: &NotificationContext) -> Value {
    let event = &ctx.event;

    let mut detail = Map::new();
    detail.insert("eventArn".into(), json!(event.arn));
    detail.insert("service".into(), json!(event.service));
    detail.insert("eventTypeCode".into(), json!(event.event_type_code));
    detail.insert("eventTypeCategory".into(), json!(event.event_type_category));
    detail.insert("region".into(), json!(event.region));
    detail.insert("startTime".into(), json!(event.start_time));
    if let Some(end_time) = &event.end_time {
        detail.insert("endTime".into(), json!(end_time));
    }
    detail.insert("lastUpdatedTime".into(), json!(event.last_updated_time));
    detail.insert("statusCode".into(), json!(event.status_code));
    if let Some(scope) = &event.event_scope_code {
        detail.insert("eventScopeCode".into(), json!(scope));
    }
    detail.insert(
        "eventDescription".into(),
        json!({ "latestDescription": event.latest_description }),
    );
    detail.insert(
        "affectedEntities".into(),
        json!(label_list(&ctx.resource_labels, LabelKind::Resources)),
    );
    detail.insert(
        "affectedAccounts".into(),
        json!(label_list(&ctx.account_labels, LabelKind::Accounts)),
    );

    Value::Object(detail)
}

/// Bus entry tagged with the event type as its detail-type.
pub fn entry(ctx: &NotificationContext) -> Result<Payload, NotificationError> {
    let detail = serde_json::to_string(&json!({ "mydata": detail(ctx) }))
        .map_err(|e| NotificationError::format(e.to_string()))?;

    Ok(Payload::BusEvent {
        source: EVENT_SOURCE.to_string(),
        detail_type: ctx.event_type.as_str().to_string(),
        detail,
    })
}
