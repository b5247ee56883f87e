use async_trait::async_trait;
use aws_sdk_ses::error::ProvideErrorMetadata;
use aws_sdk_ses::types::{Body, Content, Destination, Message as SesMessage};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor, message::header::ContentType,
    transport::smtp::authentication::Credentials,
};
use tracing::debug;

use super::{NotificationAdapter, SendResult};
use crate::error::NotificationError;
use crate::types::{Channel, Payload};

const CHARSET: &str = "UTF-8";

/// SMTP relay settings
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// How the email channel reaches its recipients
#[derive(Debug, Clone)]
pub enum EmailTransport {
    Ses(aws_sdk_ses::Client),
    Smtp(SmtpSettings),
}

/// Sends HTML notifications to a fixed recipient list.
pub struct EmailAdapter {
    transport: EmailTransport,
    from: String,
    to: Vec<String>,
    subject: String,
}

impl EmailAdapter {
    pub fn new(
        transport: EmailTransport,
        from: impl Into<String>,
        to: Vec<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            from: from.into(),
            to,
            subject: subject.into(),
        }
    }

    async fn send_ses(
        &self,
        client: &aws_sdk_ses::Client,
        html: &str,
    ) -> Result<SendResult, NotificationError> {
        let subject = Content::builder()
            .data(&self.subject)
            .charset(CHARSET)
            .build()
            .map_err(|e| NotificationError::InvalidConfig(e.to_string()))?;
        let html = Content::builder()
            .data(html)
            .charset(CHARSET)
            .build()
            .map_err(|e| NotificationError::InvalidConfig(e.to_string()))?;
        let message = SesMessage::builder()
            .subject(subject)
            .body(Body::builder().html(html).build())
            .build();

        let result = client
            .send_email()
            .source(&self.from)
            .destination(
                Destination::builder()
                    .set_to_addresses(Some(self.to.clone()))
                    .build(),
            )
            .message(message)
            .send()
            .await;

        match result {
            Ok(output) => {
                debug!(message_id = %output.message_id(), "SES accepted message");
                Ok(SendResult::delivered(Some(output.message_id().to_string())))
            }
            Err(e) => Ok(SendResult::failed(format!(
                "SES SendEmail failed: {}: {}",
                e.code().unwrap_or("unknown"),
                e.message().unwrap_or_default()
            ))),
        }
    }

    async fn send_smtp(
        &self,
        settings: &SmtpSettings,
        html: &str,
    ) -> Result<SendResult, NotificationError> {
        let mut builder = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| NotificationError::InvalidConfig(format!("Invalid from: {}", e)))?,
            )
            .subject(self.subject.as_str())
            .header(ContentType::TEXT_HTML);
        for to in &self.to {
            builder = builder.to(to
                .parse()
                .map_err(|e| NotificationError::InvalidConfig(format!("Invalid to: {}", e)))?);
        }
        let email = builder
            .body(html.to_string())
            .map_err(|e| NotificationError::send_failed(e.to_string()))?;

        let mut mailer_builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            .map_err(|e| NotificationError::InvalidConfig(e.to_string()))?
            .port(settings.port);

        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            mailer_builder =
                mailer_builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let mailer = mailer_builder.build();

        match mailer.send(email).await {
            Ok(response) => Ok(SendResult::delivered(Some(
                response.message().collect::<Vec<_>>().join(" "),
            ))),
            Err(e) => Ok(SendResult::failed(e.to_string())),
        }
    }
}

#[async_trait]
impl NotificationAdapter for EmailAdapter {
    async fn send(&self, payload: &Payload) -> Result<SendResult, NotificationError> {
        let Payload::Html(html) = payload else {
            return Err(NotificationError::UnsupportedPayload {
                channel: "email",
                payload: payload.kind(),
            });
        };
        if self.to.is_empty() {
            return Err(NotificationError::InvalidConfig("No recipients".into()));
        }

        match &self.transport {
            EmailTransport::Ses(client) => self.send_ses(client, html).await,
            EmailTransport::Smtp(settings) => self.send_smtp(settings, html).await,
        }
    }

    fn supports(&self, channel: Channel) -> bool {
        channel == Channel::Email
    }
}
