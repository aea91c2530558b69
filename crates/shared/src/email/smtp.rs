//! SMTP strategy.
//!
//! Uses `lettre` with STARTTLS required. Server certificates are
//! validated unless `email.smtp.accept_invalid_certs` is set.

use std::time::Duration;

use lettre::{
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};
use tracing::{debug, warn};

use super::error::EmailError;
use super::request::{SEMICOLON, SendRequest, load_attachments};
use crate::config::{SmtpConfig, present};

/// Sends a [`SendRequest`] through an SMTP relay.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    /// Creates a new SMTP mailer.
    #[must_use]
    pub const fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Creates an SMTP transport for one send.
    fn create_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        if self.config.accept_invalid_certs {
            warn!(
                smtp_host = %self.config.host,
                "SMTP certificate validation is DISABLED; connections can be intercepted"
            );
        }

        let tls = TlsParameters::builder(self.config.host.clone())
            .dangerous_accept_invalid_certs(self.config.accept_invalid_certs)
            .build_rustls()
            .map_err(|e| EmailError::Configuration(format!("TLS parameters: {e}")))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.host)
            .port(self.config.port)
            .tls(Tls::Required(tls))
            .timeout(Some(Duration::from_secs(self.config.timeout_secs)));

        if let (Some(username), Some(password)) = (
            present(self.config.username.as_ref()),
            present(self.config.password.as_ref()),
        ) {
            builder = builder.credentials(Credentials::new(
                username.to_string(),
                password.to_string(),
            ));
        }

        Ok(builder.build())
    }

    /// Builds the MIME message for a request.
    ///
    /// A request without a sender falls back to `email.smtp.default_from`;
    /// with neither, building fails because SMTP needs an envelope sender.
    pub async fn build_message(&self, request: &SendRequest) -> Result<Message, EmailError> {
        let recipients = request.recipients(SEMICOLON);
        let mut builder = Message::builder().subject(request.subject.clone());

        match request
            .sender()
            .or_else(|| present(self.config.default_from.as_ref()))
        {
            Some(from) => {
                let name = request.sender_name().map(ToString::to_string);
                builder = builder.from(Mailbox::new(name, parse_address(from)?));
            }
            None => debug!("Request has no sender and no default sender is configured"),
        }

        for to in &recipients.to {
            builder = builder.to(Mailbox::new(None, parse_address(to)?));
        }
        for cc in &recipients.cc {
            builder = builder.cc(Mailbox::new(None, parse_address(cc)?));
        }
        for bcc in &recipients.bcc {
            builder = builder.bcc(Mailbox::new(None, parse_address(bcc)?));
        }

        let body = if request.is_html_format {
            SinglePart::html(request.body.clone())
        } else {
            SinglePart::plain(request.body.clone())
        };

        let attachments = load_attachments(&request.attachment_paths()).await?;

        let message = if attachments.is_empty() {
            builder.singlepart(body)
        } else {
            let mut parts = MultiPart::mixed().singlepart(body);
            for attachment in attachments {
                let content_type = ContentType::parse(attachment.content_type)
                    .map_err(|e| EmailError::BuildError(e.to_string()))?;
                parts = parts.singlepart(
                    Attachment::new(attachment.filename).body(attachment.content, content_type),
                );
            }
            builder.multipart(parts)
        };

        message.map_err(|e| EmailError::BuildError(e.to_string()))
    }

    /// Sends a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be built or the relay
    /// cannot be reached or refuses it.
    pub async fn send(&self, request: &SendRequest) -> Result<(), EmailError> {
        let message = self.build_message(request).await?;
        let transport = self.create_transport()?;

        debug!(
            smtp_host = %self.config.host,
            smtp_port = self.config.port,
            "Sending email over SMTP"
        );

        transport.send(message).await.map_err(|e| {
            if e.is_permanent() || e.is_transient() {
                EmailError::Rejected(e.to_string())
            } else {
                EmailError::SendError(e.to_string())
            }
        })?;

        Ok(())
    }
}

fn parse_address(raw: &str) -> Result<Address, EmailError> {
    raw.parse()
        .map_err(|e| EmailError::InvalidAddress(format!("{raw}: {e}")))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn mailer() -> SmtpMailer {
        SmtpMailer::new(SmtpConfig::default())
    }

    fn formatted(message: &Message) -> String {
        String::from_utf8_lossy(&message.formatted()).into_owned()
    }

    #[tokio::test]
    async fn test_build_message_two_recipients() {
        let request = SendRequest::new("a@x.com;b@x.com", "Hi", "Body").with_from("me@x.com", None);
        let message = mailer().build_message(&request).await.expect("buildable");

        assert_eq!(message.envelope().to().len(), 2);
        let text = formatted(&message);
        assert!(text.contains("Subject: Hi"));
        assert!(text.contains("text/plain"));
        assert!(!text.contains("Cc:"));
    }

    #[tokio::test]
    async fn test_build_message_html_with_display_name() {
        let request = SendRequest::new("a@x.com", "Hi", "<b>Body</b>")
            .with_from("me@x.com", Some("Me".into()))
            .with_cc("c@x.com")
            .html();
        let message = mailer().build_message(&request).await.expect("buildable");

        let text = formatted(&message);
        assert!(text.contains("text/html"));
        assert!(text.contains("Me <me@x.com>"));
        assert!(text.contains("Cc: c@x.com"));
        assert_eq!(message.envelope().to().len(), 2);
    }

    #[tokio::test]
    async fn test_build_message_uses_default_sender() {
        let config = SmtpConfig {
            default_from: Some("noreply@x.com".to_string()),
            ..SmtpConfig::default()
        };
        let request = SendRequest::new("a@x.com", "Hi", "Body");
        let message = SmtpMailer::new(config)
            .build_message(&request)
            .await
            .expect("buildable");

        assert_eq!(
            message.envelope().from().map(ToString::to_string).as_deref(),
            Some("noreply@x.com")
        );
    }

    #[tokio::test]
    async fn test_build_message_without_any_sender_fails() {
        let request = SendRequest::new("a@x.com", "Hi", "Body");
        let err = mailer().build_message(&request).await.unwrap_err();
        assert!(matches!(err, EmailError::BuildError(_)));
    }

    #[tokio::test]
    async fn test_build_message_rejects_bad_address() {
        let request = SendRequest::new("not-an-address", "Hi", "Body").with_from("me@x.com", None);
        let err = mailer().build_message(&request).await.unwrap_err();
        assert!(matches!(err, EmailError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn test_build_message_attaches_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("notes.txt");
        std::fs::File::create(&path)
            .and_then(|mut f| f.write_all(b"attached text"))
            .expect("write attachment");

        let request = SendRequest::new("a@x.com", "Hi", "Body")
            .with_from("me@x.com", None)
            .with_attachments(format!("{};", path.display()));
        let message = mailer().build_message(&request).await.expect("buildable");

        let text = formatted(&message);
        assert!(text.contains("multipart/mixed"));
        assert!(text.contains("notes.txt"));
    }

    #[tokio::test]
    async fn test_build_message_missing_attachment_fails() {
        let request = SendRequest::new("a@x.com", "Hi", "Body")
            .with_from("me@x.com", None)
            .with_attachments("/definitely/not/here.pdf");
        let err = mailer().build_message(&request).await.unwrap_err();
        assert!(matches!(err, EmailError::Attachment { .. }));
    }

    #[tokio::test]
    async fn test_create_transport() {
        assert!(mailer().create_transport().is_ok());

        let insecure = SmtpMailer::new(SmtpConfig {
            accept_invalid_certs: true,
            ..SmtpConfig::default()
        });
        assert!(insecure.create_transport().is_ok());
    }
}
