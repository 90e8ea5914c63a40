/// Errors raised while sending notifications.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// Simple email service (SES) errors.
    #[error("AWS SES error: {0}")]
    SesError(String),

    /// The message cannot be sent as built (no recipients, empty subject).
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}

/// An email addressed to one or more recipients.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    /// Sender address.
    pub from: String,
    /// Recipient addresses; all of them receive the same message.
    pub to: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// Full HTML document for HTML-capable clients.
    pub html_body: String,
    /// Plain-text alternative.
    pub text_body: String,
}

impl EmailMessage {
    /// Builds a message, wrapping `html_fragment` into a minimal HTML document.
    pub fn new(
        from: impl Into<String>,
        to: Vec<String>,
        subject: impl Into<String>,
        html_fragment: &str,
        text_body: impl Into<String>,
    ) -> Self {
        let html_body = format!(
            r#"<html>
<head>
<meta charset="UTF-8">
</head>
<body>
{}
</body>
</html>
"#,
            html_fragment
        );

        Self {
            from: from.into(),
            to,
            subject: subject.into(),
            html_body,
            text_body: text_body.into(),
        }
    }

    /// Checks the message can be handed to a transport.
    pub fn validate(&self) -> Result<(), NotificationError> {
        if self.from.trim().is_empty() {
            return Err(NotificationError::InvalidMessage(
                "sender address is empty".to_string(),
            ));
        }
        if self.to.is_empty() {
            return Err(NotificationError::InvalidMessage(
                "no recipients".to_string(),
            ));
        }
        if self.subject.trim().is_empty() {
            return Err(NotificationError::InvalidMessage(
                "subject is empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(to: Vec<String>) -> EmailMessage {
        EmailMessage::new(
            "monitor@example.com",
            to,
            "UR Property Monitor: 3 new rooms found!",
            "<p>There are 3 new rooms on UR.</p>",
            "There are 3 new rooms on UR.",
        )
    }

    #[test]
    fn test_html_fragment_is_wrapped() {
        let message = message(vec!["a@example.com".to_string()]);

        assert!(message.html_body.starts_with("<html>"));
        assert!(message.html_body.contains("<meta charset=\"UTF-8\">"));
        assert!(
            message
                .html_body
                .contains("<body>\n<p>There are 3 new rooms on UR.</p>\n</body>")
        );
        assert_eq!(message.text_body, "There are 3 new rooms on UR.");
    }

    #[test]
    fn test_validate_requires_recipients() {
        let err = message(Vec::new()).validate().unwrap_err();
        assert!(matches!(err, NotificationError::InvalidMessage(_)));
    }

    #[test]
    fn test_validate_accepts_complete_message() {
        let message = message(vec![
            "a@example.com".to_string(),
            "b@example.com".to_string(),
        ]);
        assert!(message.validate().is_ok());
    }
}
