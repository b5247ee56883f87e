use aha_core::{EventType, ListFormat};

use super::Fields;
use crate::error::NotificationError;
use crate::types::NotificationContext;

const DASHBOARD_URL: &str = "https://status.aws.amazon.com";
const SUPPORT_URL: &str = "https://console.aws.amazon.com/support/home";

/// HTML body with the event fields inlined into a short letter.
pub fn html_body(ctx: &NotificationContext) -> Result<String, NotificationError> {
    let fields = Fields::collect(ctx, ListFormat::COMMA)?;

    let (greeting, intro, closing) = match ctx.event_type {
        EventType::Create => (
            "Greetings from AWS Health Aware,",
            "There is an AWS incident that is in effect which may likely impact your resources. \
             Here are the details:",
            format!(
                "For updates, please visit the <a href={DASHBOARD_URL}>AWS Service Health Dashboard</a><br>\n\
                 If you are experiencing issues related to this event, please open an \
                 <a href={SUPPORT_URL}>AWS Support</a> case within your account."
            ),
        ),
        EventType::Resolve => (
            "Greetings again from AWS Health Aware,",
            "Good news! The AWS Health incident from earlier has now been marked as resolved.",
            format!(
                "If you are still experiencing issues related to this event, please open an \
                 <a href={SUPPORT_URL}>AWS Support</a> case within your account."
            ),
        ),
    };

    let mut details = String::new();
    for (name, value, _) in fields.rows() {
        details.push_str(&format!("<b>{name}:</b> {}<br>\n", escape_html(value)));
    }

    Ok(format!(
        "<html>\n<body>\n<h>{greeting}</h><br>\n<p>{intro}<br><br>\n{details}<br>\n{closing}<br><br>\n\
         Thanks, <br><br>AHA: AWS Health Aware\n</p>\n</body>\n</html>\n"
    ))
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatters::fixtures;
    use aha_core::EventStatus;

    #[test]
    fn test_new_event_letter() {
        let html = html_body(&fixtures::context(EventStatus::Open)).unwrap();
        assert!(html.contains("<h>Greetings from AWS Health Aware,</h>"));
        assert!(html.contains("<b>Account(s):</b> prod (123456789012)<br>"));
        assert!(html.contains("<b>Start Time (UTC):</b> 2023-05-15 14:30:00<br>"));
        assert!(html.contains("AWS Service Health Dashboard"));
        assert!(!html.contains("End Time"));
    }

    #[test]
    fn test_resolved_letter() {
        let html = html_body(&fixtures::context(EventStatus::Closed)).unwrap();
        assert!(html.contains("Greetings again from AWS Health Aware,"));
        assert!(html.contains("<b>End Time (UTC):</b> 2023-05-15 16:02:00<br>"));
        assert!(!html.contains("Service Health Dashboard"));
    }

    #[test]
    fn test_lists_are_comma_joined() {
        let mut ctx = fixtures::context(EventStatus::Open);
        ctx.account_labels.push("dev (210987654321)".to_string());
        let html = html_body(&ctx).unwrap();
        assert!(html.contains("prod (123456789012), dev (210987654321)"));
    }

    #[test]
    fn test_description_is_escaped() {
        let mut ctx = fixtures::context(EventStatus::Open);
        ctx.event.latest_description = "latency < 5s & rising".to_string();
        let html = html_body(&ctx).unwrap();
        assert!(html.contains("latency &lt; 5s &amp; rising"));
    }
}
