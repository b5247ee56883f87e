use serde_json::{Value, json};

use aha_core::{EventType, ListFormat};

use super::{Fields, headline};
use crate::error::NotificationError;
use crate::types::NotificationContext;

fn summary(ctx: &NotificationContext) -> String {
    let emoji = match ctx.event_type {
        EventType::Create => ":rotating_light:",
        EventType::Resolve => ":heavy_check_mark:",
    };
    format!("{emoji}*{}*", headline(ctx))
}

/// Incoming-webhook message with a colored attachment card.
pub fn webhook(ctx: &NotificationContext) -> Result<Value, NotificationError> {
    let fields = Fields::collect(ctx, ListFormat::STACKED)?;
    let color = match ctx.event_type {
        EventType::Create => "danger",
        EventType::Resolve => "00ff00",
    };

    let rows: Vec<Value> = fields
        .rows()
        .into_iter()
        .map(|(title, value, short)| json!({ "title": title, "value": value, "short": short }))
        .collect();

    Ok(json!({
        "text": summary(ctx),
        "attachments": [{
            "color": color,
            "fields": rows,
        }]
    }))
}

/// Workflow-webhook body: flat keys that workflow steps reference by name.
pub fn workflow(ctx: &NotificationContext) -> Result<Value, NotificationError> {
    let fields = Fields::collect(ctx, ListFormat::LINES)?;

    let mut body = json!({
        "text": summary(ctx),
        "accounts": fields.accounts,
        "resources": fields.resources,
        "service": fields.service,
        "region": fields.region,
        "start_time": fields.start_time,
        "status": fields.status,
        "event_arn": fields.event_arn,
        "updates": fields.updates,
    });
    if let (Some(end_time), Some(map)) = (fields.end_time, body.as_object_mut()) {
        map.insert("end_time".to_string(), Value::String(end_time));
    }
    Ok(body)
}
