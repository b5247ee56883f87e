use std::fmt::Write;

use serde_json::{Value, json};

use aha_core::{EventType, ListFormat};

use super::{Fields, headline};
use crate::error::NotificationError;
use crate::types::NotificationContext;

/// Markdown message body, before it is wrapped for the webhook.
pub fn markdown(ctx: &NotificationContext) -> Result<String, NotificationError> {
    let fields = Fields::collect(ctx, ListFormat::STACKED)?;
    let emoji = match ctx.event_type {
        EventType::Create => ":rotating_light:",
        EventType::Resolve => ":heavy_check_mark:",
    };
    // Chime markdown treats bare brackets as link syntax
    let title = headline(ctx).replace('[', "\\[").replace(']', "\\]");

    let mut text = format!("/md\n**{emoji}{title}**\n---\n");
    for (name, value, _) in fields.rows() {
        if name == "Updates" {
            let _ = write!(text, "**Updates:**\n{value}");
        } else {
            let _ = writeln!(text, "**{name}**: {value}");
        }
    }
    Ok(text)
}

/// Webhook body: `{"Content": markdown}`.
pub fn message(ctx: &NotificationContext) -> Result<Value, NotificationError> {
    Ok(json!({ "Content": markdown(ctx)? }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatters::fixtures;
    use aha_core::EventStatus;

    #[test]
    fn test_markdown_new_event() {
        let text = markdown(&fixtures::context(EventStatus::Open)).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("/md"));
        assert_eq!(
            lines.next(),
            Some(
                "**:rotating_light:\\[NEW\\] AWS Health reported an issue with the EC2 service in the US-EAST-1 region.**"
            )
        );
        assert_eq!(lines.next(), Some("---"));
        assert_eq!(lines.next(), Some("**Account(s)**: prod (123456789012)"));
        assert!(text.contains("**Start Time (UTC)**: 2023-05-15 14:30:00\n"));
        assert!(!text.contains("End Time"));
        assert!(text.ends_with("**Updates:**\nWe are investigating increased error rates."));
    }

    #[test]
    fn test_markdown_resolved_event() {
        let text = markdown(&fixtures::context(EventStatus::Closed)).unwrap();
        assert!(text.contains(":heavy_check_mark:\\[RESOLVED\\]"));
        assert!(text.contains("**End Time (UTC)**: 2023-05-15 16:02:00\n"));
    }

    #[test]
    fn test_message_wraps_content() {
        let ctx = fixtures::bare_context(EventStatus::Open);
        let body = message(&ctx).unwrap();
        let content = body["Content"].as_str().unwrap();
        assert!(content.contains("**Resource(s)**: All resources\nin region\n"));
    }
}
