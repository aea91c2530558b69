//! Provider routing.

use tracing::{debug, info};

use super::error::EmailError;
use super::provider::EmailProvider;
use super::request::SendRequest;
use super::sendgrid::SendGridMailer;
use super::ses::SesMailer;
use super::smtp::SmtpMailer;
use crate::config::EmailConfig;

/// Routes send requests to the provider named in [`EmailConfig`].
#[derive(Debug, Clone)]
pub struct EmailDispatcher {
    config: EmailConfig,
}

impl EmailDispatcher {
    /// Creates a dispatcher over an email configuration section.
    #[must_use]
    pub const fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// The provider the current selector resolves to.
    #[must_use]
    pub fn provider(&self) -> EmailProvider {
        EmailProvider::from_selector(&self.config.provider)
    }

    /// Sends a request through exactly one provider and reports which one
    /// handled it.
    ///
    /// # Errors
    ///
    /// Returns the provider's error unchanged.
    pub async fn send(&self, request: &SendRequest) -> Result<EmailProvider, EmailError> {
        let provider = self.provider();

        debug!(
            provider = %provider,
            recipients = request.recipients(provider.recipient_delimiter()).len(),
            "Dispatching email"
        );

        match provider {
            EmailProvider::Smtp => {
                SmtpMailer::new(self.config.smtp.clone()).send(request).await?;
            }
            EmailProvider::SendGrid => {
                SendGridMailer::new(self.config.sendgrid.clone())
                    .send(request)
                    .await?;
            }
            EmailProvider::Ses => SesMailer::new(self.config.ses.clone()).send(request).await?,
        }

        info!(
            provider = %provider,
            subject = %request.subject,
            "Email sent"
        );

        Ok(provider)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn dispatcher(selector: &str) -> EmailDispatcher {
        EmailDispatcher::new(EmailConfig {
            provider: selector.to_string(),
            ..EmailConfig::default()
        })
    }

    #[rstest]
    #[case("Smtp", EmailProvider::Smtp)]
    #[case("Sendgrid", EmailProvider::SendGrid)]
    #[case("AWS", EmailProvider::Ses)]
    #[case("", EmailProvider::Smtp)]
    #[case("Postmark", EmailProvider::Smtp)]
    fn test_provider_from_config(#[case] selector: &str, #[case] expected: EmailProvider) {
        assert_eq!(dispatcher(selector).provider(), expected);
    }

    #[tokio::test]
    async fn test_sendgrid_without_key_fails_before_network() {
        let request = SendRequest::new("a@x.com", "Hi", "Body").with_from("me@x.com", None);
        let err = dispatcher("Sendgrid").send(&request).await.unwrap_err();
        assert!(matches!(err, EmailError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_ses_without_keys_fails_before_network() {
        let request = SendRequest::new("a@x.com", "Hi", "Body").with_from("me@x.com", None);
        let err = dispatcher("AWS").send(&request).await.unwrap_err();
        assert!(matches!(err, EmailError::Configuration(_)));
    }
}
