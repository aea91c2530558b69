//! SendGrid strategy.

use std::time::Duration;

use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::debug;

use super::error::EmailError;
use super::request::{SEMICOLON, SendRequest, load_attachments};
use crate::config::{SendGridConfig, present};

/// SendGrid email content
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SendGridContent {
    #[serde(rename = "type")]
    pub(crate) content_type: &'static str,
    pub(crate) value: String,
}

/// SendGrid email address
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SendGridEmail {
    pub(crate) email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
}

impl SendGridEmail {
    fn address(email: &str) -> Self {
        Self {
            email: email.to_string(),
            name: None,
        }
    }
}

/// SendGrid personalization
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SendGridPersonalization {
    pub(crate) to: Vec<SendGridEmail>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) cc: Vec<SendGridEmail>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) bcc: Vec<SendGridEmail>,
}

/// SendGrid attachment
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SendGridAttachment {
    pub(crate) content: String,
    #[serde(rename = "type")]
    pub(crate) content_type: &'static str,
    pub(crate) filename: String,
    pub(crate) disposition: &'static str,
}

/// SendGrid API request
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SendGridRequest {
    pub(crate) personalizations: Vec<SendGridPersonalization>,
    pub(crate) from: SendGridEmail,
    pub(crate) subject: String,
    pub(crate) content: Vec<SendGridContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) attachments: Vec<SendGridAttachment>,
}

/// Sends a [`SendRequest`] through the SendGrid v3 API.
#[derive(Debug, Clone)]
pub struct SendGridMailer {
    config: SendGridConfig,
}

impl SendGridMailer {
    /// Creates a new SendGrid mailer.
    #[must_use]
    pub const fn new(config: SendGridConfig) -> Self {
        Self { config }
    }

    fn api_key(&self) -> Result<&str, EmailError> {
        present(self.config.api_key.as_ref())
            .ok_or_else(|| EmailError::missing_setting("email.sendgrid.api_key"))
    }

    /// Maps a request onto the SendGrid payload, reading attachment files.
    pub(crate) async fn build_request(
        &self,
        request: &SendRequest,
    ) -> Result<SendGridRequest, EmailError> {
        let recipients = request.recipients(SEMICOLON);

        let content = if request.is_html_format {
            SendGridContent {
                content_type: "text/html",
                value: request.body.clone(),
            }
        } else {
            SendGridContent {
                content_type: "text/plain",
                value: request.body.clone(),
            }
        };

        let attachments = load_attachments(&request.attachment_paths())
            .await?
            .into_iter()
            .map(|att| SendGridAttachment {
                content: base64::engine::general_purpose::STANDARD.encode(&att.content),
                content_type: att.content_type,
                filename: att.filename,
                disposition: "attachment",
            })
            .collect();

        Ok(SendGridRequest {
            personalizations: vec![SendGridPersonalization {
                to: recipients.to.iter().map(|e| SendGridEmail::address(e)).collect(),
                cc: recipients.cc.iter().map(|e| SendGridEmail::address(e)).collect(),
                bcc: recipients.bcc.iter().map(|e| SendGridEmail::address(e)).collect(),
            }],
            from: SendGridEmail {
                email: request.sender().unwrap_or_default().to_string(),
                name: request.sender_name().map(ToString::to_string),
            },
            subject: request.subject.clone(),
            content: vec![content],
            attachments,
        })
    }

    /// Sends a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing, an attachment cannot
    /// be read, the API cannot be reached, or it answers with an error.
    pub async fn send(&self, request: &SendRequest) -> Result<(), EmailError> {
        let api_key = self.api_key()?;
        let payload = self.build_request(request).await?;

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| EmailError::Configuration(format!("HTTP client: {e}")))?;

        debug!(api_url = %self.config.api_url, "Sending email through SendGrid");

        let response = client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| EmailError::SendError(format!("SendGrid API request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(EmailError::Credentials(
                format!("SendGrid API error ({status}): {body}"),
            )),
            _ => Err(EmailError::Rejected(format!(
                "SendGrid API error ({status}): {body}"
            ))),
        }
    }
}
