//! Amazon SES strategy.
//!
//! Recipients are split on `,`. Only the subject and an HTML body are
//! sent; cc, bcc and attachments are not used by this strategy.

use aws_credential_types::Credentials;
use aws_sdk_sesv2::{
    Client,
    config::{BehaviorVersion, Region, retry::RetryConfig},
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    operation::send_email::SendEmailError,
    types::{Body, Content, Destination, EmailContent, Message},
};
use tracing::debug;

use super::error::EmailError;
use super::request::{COMMA, SendRequest};
use crate::config::{SesConfig, present};

const CHARSET: &str = "UTF-8";

/// Error codes SES uses when it refuses the access key or signature.
const CREDENTIAL_CODES: [&str; 3] = [
    "InvalidClientTokenId",
    "SignatureDoesNotMatch",
    "UnrecognizedClientException",
];

/// Sends a [`SendRequest`] through Amazon SES v2.
#[derive(Debug, Clone)]
pub struct SesMailer {
    config: SesConfig,
}

/// A request mapped onto the SES `SendEmail` shape.
#[derive(Debug, Clone)]
pub(crate) struct SesEmail {
    pub(crate) from: Option<String>,
    pub(crate) destination: Destination,
    pub(crate) content: EmailContent,
}

impl SesMailer {
    /// Creates a new SES mailer.
    #[must_use]
    pub const fn new(config: SesConfig) -> Self {
        Self { config }
    }

    /// Builds an SES client from static credentials, retries disabled.
    fn client(&self) -> Result<Client, EmailError> {
        let access_key = present(self.config.access_key_id.as_ref())
            .ok_or_else(|| EmailError::missing_setting("email.ses.access_key_id"))?;
        let secret_key = present(self.config.secret_access_key.as_ref())
            .ok_or_else(|| EmailError::missing_setting("email.ses.secret_access_key"))?;

        let credentials = Credentials::new(access_key, secret_key, None, None, "stratus");

        let mut builder = aws_sdk_sesv2::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(self.config.region.clone()))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled());

        if let Some(endpoint) = present(self.config.endpoint.as_ref()) {
            builder = builder.endpoint_url(endpoint);
        }

        Ok(Client::from_conf(builder.build()))
    }

    pub(crate) fn build_email(request: &SendRequest) -> Result<SesEmail, EmailError> {
        let recipients = request.recipients(COMMA);

        let subject = Content::builder()
            .data(request.subject.clone())
            .charset(CHARSET)
            .build()
            .map_err(|e| EmailError::BuildError(e.to_string()))?;
        let html = Content::builder()
            .data(request.body.clone())
            .charset(CHARSET)
            .build()
            .map_err(|e| EmailError::BuildError(e.to_string()))?;

        let message = Message::builder()
            .subject(subject)
            .body(Body::builder().html(html).build())
            .build();

        Ok(SesEmail {
            from: request.sender().map(ToString::to_string),
            destination: Destination::builder()
                .set_to_addresses(Some(recipients.to))
                .build(),
            content: EmailContent::builder().simple(message).build(),
        })
    }

    /// Sends a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the SES keys are missing, the endpoint cannot be
    /// reached, or SES refuses the credentials or the message.
    pub async fn send(&self, request: &SendRequest) -> Result<(), EmailError> {
        let client = self.client()?;
        let email = Self::build_email(request)?;

        debug!(region = %self.config.region, "Sending email through SES");

        client
            .send_email()
            .set_from_email_address(email.from)
            .destination(email.destination)
            .content(email.content)
            .send()
            .await
            .map_err(classify)?;

        Ok(())
    }
}

fn classify(err: SdkError<SendEmailError>) -> EmailError {
    let message = DisplayErrorContext(&err).to_string();

    if matches!(err, SdkError::DispatchFailure(_) | SdkError::TimeoutError(_)) {
        return EmailError::SendError(message);
    }

    match err.code() {
        Some(code) if CREDENTIAL_CODES.contains(&code) => EmailError::Credentials(message),
        _ => EmailError::Rejected(message),
    }
}
