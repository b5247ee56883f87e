use serde_json::{Value, json};

use aha_core::{EventType, ListFormat};

use super::{Fields, headline};
use crate::error::NotificationError;
use crate::types::NotificationContext;

/// Legacy connector MessageCard with a single fact section.
pub fn message_card(ctx: &NotificationContext) -> Result<Value, NotificationError> {
    let fields = Fields::collect(ctx, ListFormat::STACKED)?;
    let (icon, theme) = match ctx.event_type {
        EventType::Create => ("&#x1F6A8;", "FF0000"),
        EventType::Resolve => ("&#x2705;", "00ff00"),
    };

    let facts: Vec<Value> = fields
        .rows()
        .into_iter()
        .map(|(name, value, _)| json!({ "name": name, "value": value }))
        .collect();

    Ok(json!({
        "@type": "MessageCard",
        "@context": "http://schema.org/extensions",
        "themeColor": theme,
        "summary": "AWS Health Aware Alert",
        "sections": [{
            "activityTitle": format!("{icon} {}", headline(ctx)),
            "markdown": false,
            "facts": facts,
        }]
    }))
}
