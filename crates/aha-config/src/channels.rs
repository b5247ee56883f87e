use crate::app::AppConfig;
use crate::secrets::ChannelSecrets;

const SLACK_WEBHOOK_MARKER: &str = "hooks.slack.com/services";
const SLACK_WORKFLOW_MARKER: &str = "hooks.slack.com/workflows";
const TEAMS_MARKER: &str = "office.com/webhook";
const CHIME_MARKER: &str = "hooks.chime.aws/incomingwebhooks";

/// A configured delivery target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    EventBridge {
        bus_name: String,
    },
    SlackWebhook {
        url: String,
    },
    SlackWorkflow {
        url: String,
    },
    Teams {
        url: String,
    },
    Email {
        from: String,
        to: Vec<String>,
        subject: String,
    },
    Chime {
        url: String,
    },
}

impl Endpoint {
    pub fn name(&self) -> &'static str {
        match self {
            Self::EventBridge { .. } => "eventbridge",
            Self::SlackWebhook { .. } => "slack_webhook",
            Self::SlackWorkflow { .. } => "slack_workflow",
            Self::Teams { .. } => "teams",
            Self::Email { .. } => "email",
            Self::Chime { .. } => "chime",
        }
    }
}

/// Whether a channel is on, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelStatus {
    pub name: &'static str,
    pub enabled: bool,
    pub reason: String,
}

/// Enabled endpoints in delivery order: event bus, Slack, Teams, email,
/// Chime.
pub fn enabled_endpoints(config: &AppConfig, secrets: &ChannelSecrets) -> Vec<Endpoint> {
    let mut endpoints = Vec::new();

    if let Some(bus_name) = &secrets.event_bus {
        endpoints.push(Endpoint::EventBridge {
            bus_name: bus_name.clone(),
        });
    }
    if let Some(url) = &secrets.slack {
        if url.contains(SLACK_WEBHOOK_MARKER) {
            endpoints.push(Endpoint::SlackWebhook { url: url.clone() });
        }
        if url.contains(SLACK_WORKFLOW_MARKER) {
            endpoints.push(Endpoint::SlackWorkflow { url: url.clone() });
        }
    }
    if let Some(url) = secrets.teams.as_ref().filter(|u| u.contains(TEAMS_MARKER)) {
        endpoints.push(Endpoint::Teams { url: url.clone() });
    }
    if config.email_enabled() {
        endpoints.push(Endpoint::Email {
            from: config.from_email.clone(),
            to: config.recipients(),
            subject: config.email_subject.clone(),
        });
    }
    if let Some(url) = secrets.chime.as_ref().filter(|u| u.contains(CHIME_MARKER)) {
        endpoints.push(Endpoint::Chime { url: url.clone() });
    }

    endpoints
}

/// One status line per channel, without endpoint values.
pub fn channel_report(config: &AppConfig, secrets: &ChannelSecrets) -> Vec<ChannelStatus> {
    let url_status = |name, value: &Option<String>, marker: &str| match value {
        None => ChannelStatus {
            name,
            enabled: false,
            reason: "no endpoint configured".into(),
        },
        Some(url) if url.contains(marker) => ChannelStatus {
            name,
            enabled: true,
            reason: format!("endpoint matches {marker}"),
        },
        Some(_) => ChannelStatus {
            name,
            enabled: false,
            reason: format!("endpoint is not a {marker} URL"),
        },
    };

    let email = if config.from_email.contains(crate::app::PLACEHOLDER_SENDER) {
        ChannelStatus {
            name: "email",
            enabled: false,
            reason: "sender is the placeholder address".into(),
        }
    } else if config.recipients().is_empty() {
        ChannelStatus {
            name: "email",
            enabled: false,
            reason: "no recipients".into(),
        }
    } else {
        let via = if config.smtp_host.is_some() { "SMTP" } else { "SES" };
        ChannelStatus {
            name: "email",
            enabled: true,
            reason: format!("{} recipient(s) via {via}", config.recipients().len()),
        }
    };

    vec![
        ChannelStatus {
            name: "eventbridge",
            enabled: secrets.event_bus.is_some(),
            reason: match secrets.event_bus {
                Some(_) => "event bus configured".into(),
                None => "no event bus configured".into(),
            },
        },
        url_status("slack_webhook", &secrets.slack, SLACK_WEBHOOK_MARKER),
        url_status("slack_workflow", &secrets.slack, SLACK_WORKFLOW_MARKER),
        url_status("teams", &secrets.teams, TEAMS_MARKER),
        email,
        url_status("chime", &secrets.chime, CHIME_MARKER),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_secrets() -> ChannelSecrets {
        ChannelSecrets {
            slack: Some("https://hooks.slack.com/services/T/B/X".into()),
            teams: Some("https://example.webhook.office.com/webhookb2/abc".into()),
            chime: Some("https://hooks.chime.aws/incomingwebhooks/abc?token=x".into()),
            event_bus: Some("aha-bus".into()),
            assume_role: None,
        }
    }

    fn email_config() -> AppConfig {
        AppConfig {
            from_email: "aha@example.com".into(),
            to_email: "ops@example.com".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_delivery_order() {
        let names: Vec<_> = enabled_endpoints(&email_config(), &all_secrets())
            .iter()
            .map(Endpoint::name)
            .collect();
        assert_eq!(
            names,
            vec!["eventbridge", "slack_webhook", "teams", "email", "chime"]
        );
    }

    #[test]
    fn test_slack_workflow_url() {
        let secrets = ChannelSecrets {
            slack: Some("https://hooks.slack.com/workflows/T/A/1/x".into()),
            ..Default::default()
        };
        assert_eq!(
            enabled_endpoints(&AppConfig::default(), &secrets),
            vec![Endpoint::SlackWorkflow {
                url: "https://hooks.slack.com/workflows/T/A/1/x".into()
            }]
        );
    }

    #[test]
    fn test_unrecognized_urls_are_ignored() {
        let secrets = ChannelSecrets {
            slack: Some("https://example.com/hook".into()),
            teams: Some("https://example.com/teams".into()),
            chime: Some("https://example.com/chime".into()),
            ..Default::default()
        };
        assert!(enabled_endpoints(&AppConfig::default(), &secrets).is_empty());
    }

    #[test]
    fn test_report_covers_every_channel() {
        let report = channel_report(&AppConfig::default(), &ChannelSecrets::default());
        assert_eq!(report.len(), 6);
        assert!(report.iter().all(|status| !status.enabled));
        assert_eq!(report[4].reason, "sender is the placeholder address");

        let report = channel_report(&email_config(), &all_secrets());
        let enabled: Vec<_> = report.iter().filter(|s| s.enabled).map(|s| s.name).collect();
        assert_eq!(
            enabled,
            vec!["eventbridge", "slack_webhook", "teams", "email", "chime"]
        );
    }
}
