//! Boolean-returning send for callers of the old email helper.
//!
//! SMTP and SendGrid failures are logged and reported as `Ok(false)`.
//! SES failures are returned as errors.

use tracing::error;

use super::dispatcher::EmailDispatcher;
use super::error::EmailError;
use super::request::SendRequest;
use crate::config::EmailConfig;

/// Sends `request` with the provider selected in `config`.
///
/// # Errors
///
/// Returns an error only when the selected provider is SES and the send
/// fails.
pub async fn send_email(config: &EmailConfig, request: &SendRequest) -> Result<bool, EmailError> {
    let dispatcher = EmailDispatcher::new(config.clone());
    let provider = dispatcher.provider();

    match dispatcher.send(request).await {
        Ok(_) => Ok(true),
        Err(e) if provider.propagates_errors() => Err(e),
        Err(e) => {
            error!(provider = %provider, error = %e, "Failed to send email");
            Ok(false)
        }
    }
}
