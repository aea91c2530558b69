//! Email dispatch error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::error::AppError;

/// Email dispatch errors.
#[derive(Debug, Error)]
pub enum EmailError {
    /// A required provider setting is missing.
    #[error("email provider not configured: {0}")]
    Configuration(String),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Failed to build email message.
    #[error("Failed to build email: {0}")]
    BuildError(String),

    /// An attachment could not be read.
    #[error("failed to read attachment {path}: {source}")]
    Attachment {
        /// Path of the attachment.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The provider could not be reached.
    #[error("Failed to send email: {0}")]
    SendError(String),

    /// The provider refused the configured credentials.
    #[error("email provider rejected credentials: {0}")]
    Credentials(String),

    /// The provider answered with an error.
    #[error("email provider rejected request: {0}")]
    Rejected(String),
}

impl EmailError {
    /// Create a configuration error naming the missing setting.
    #[must_use]
    pub fn missing_setting(key: &str) -> Self {
        Self::Configuration(format!("`{key}` is not set"))
    }
}

impl From<EmailError> for AppError {
    fn from(err: EmailError) -> Self {
        let message = err.to_string();
        match err {
            EmailError::Configuration(_) => Self::Configuration(message),
            EmailError::InvalidAddress(_) | EmailError::BuildError(_) => Self::Validation(message),
            EmailError::Attachment { .. } => Self::Io(message),
            EmailError::SendError(_) => Self::Transport(message),
            EmailError::Credentials(_) => Self::Credentials(message),
            EmailError::Rejected(_) => Self::ProviderRejected(message),
        }
    }
}
