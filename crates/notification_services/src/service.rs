use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ses::Client as SesClient;
use aws_sdk_ses::types::{Body, Content, Destination, Message};

use crate::types::*;

/// Trait for email delivery implementations.
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Sends the message and returns the transport's message id.
    async fn send_email(&self, message: &EmailMessage) -> Result<String, NotificationError>;
}

/// Email service backed by AWS SES.
#[derive(Debug, Clone)]
pub struct SesEmailService {
    ses_client: SesClient,
}

impl SesEmailService {
    /// Creates the service from an already loaded AWS config.
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            ses_client: SesClient::new(config),
        }
    }
}

fn utf8_content(data: &str, what: &str) -> Result<Content, NotificationError> {
    Content::builder()
        .data(data)
        .charset("UTF-8")
        .build()
        .map_err(|e| {
            log::error!("❌ Failed to build {} content: {}", what, e);
            NotificationError::SesError(format!("Failed to build {}: {}", what, e))
        })
}

#[async_trait]
impl EmailService for SesEmailService {
    async fn send_email(&self, message: &EmailMessage) -> Result<String, NotificationError> {
        message.validate()?;

        log::info!(
            "📧 Sending \"{}\" to {} recipient(s)",
            message.subject,
            message.to.len()
        );

        let subject = utf8_content(&message.subject, "subject")?;
        let html = utf8_content(&message.html_body, "HTML body")?;
        let text = utf8_content(&message.text_body, "text body")?;

        let body = Body::builder().html(html).text(text).build();

        let ses_message = Message::builder().subject(subject).body(body).build();

        let destination = Destination::builder()
            .set_to_addresses(Some(message.to.clone()))
            .build();

        log::info!("📧 Sending email via AWS SES...");

        let result = self
            .ses_client
            .send_email()
            .source(&message.from)
            .destination(destination)
            .message(ses_message)
            .send()
            .await;

        match result {
            Ok(output) => {
                let message_id = output.message_id().to_string();
                log::info!("✅ Notification email sent");
                log::info!("📧 SES Message ID: {}", message_id);
                Ok(message_id)
            }
            Err(e) => {
                log::error!("❌ AWS SES error: {:#?}", e);
                let error_msg = if let Some(service_error) = e.as_service_error() {
                    format!("AWS SES service error: {:?}", service_error)
                } else {
                    format!("AWS SES error: {}", e)
                };
                Err(NotificationError::SesError(error_msg))
            }
        }
    }
}
