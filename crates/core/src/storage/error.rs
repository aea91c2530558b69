//! Object storage error types.

use std::path::PathBuf;

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use stratus_shared::AppError;
use thiserror::Error;

/// S3 error codes that mean the access key or signature was refused.
const CREDENTIAL_CODES: [&str; 2] = ["InvalidAccessKeyId", "InvalidSecurity"];

/// Object storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Storage endpoint or credentials are not configured.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// The provider refused the configured credentials.
    #[error("storage credentials rejected: {0}")]
    Credentials(String),

    /// The endpoint could not be reached.
    #[error("storage endpoint unreachable: {0}")]
    Transport(String),

    /// Object not found in storage.
    #[error("object not found: {key}")]
    NotFound {
        /// Storage key that was not found.
        key: String,
    },

    /// The provider answered with an error.
    #[error("storage operation failed: {0}")]
    Rejected(String),

    /// A local file could not be written.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Local path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// Create a configuration error naming the missing setting.
    #[must_use]
    pub fn missing_setting(key: &str) -> Self {
        Self::Configuration(format!("`{key}` is not set"))
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Whether the provider refused the credentials.
    #[must_use]
    pub const fn is_credentials(&self) -> bool {
        matches!(self, Self::Credentials(_))
    }

    /// Whether the failure happened before any request was made.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Classifies an S3 SDK error for the object at `key`.
    pub(crate) fn from_sdk<E, R>(err: SdkError<E, R>, key: &str) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
        R: std::fmt::Debug,
    {
        let message = DisplayErrorContext(&err).to_string();

        match err {
            SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => Self::Transport(message),
            SdkError::ConstructionFailure(_) => Self::Configuration(message),
            err => Self::from_code(err.code(), key, message),
        }
    }

    /// Maps a provider error code.
    pub(crate) fn from_code(code: Option<&str>, key: &str, message: String) -> Self {
        match code {
            Some(code) if CREDENTIAL_CODES.contains(&code) => Self::Credentials(message),
            Some("NoSuchKey" | "NotFound") => Self::not_found(key),
            _ => Self::Rejected(message),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        let message = err.to_string();
        match err {
            StorageError::Configuration(_) => Self::Configuration(message),
            StorageError::Credentials(_) => Self::Credentials(message),
            StorageError::Transport(_) => Self::Transport(message),
            StorageError::NotFound { .. } => Self::NotFound(message),
            StorageError::Rejected(_) => Self::ProviderRejected(message),
            StorageError::Io { .. } => Self::Io(message),
        }
    }
}
