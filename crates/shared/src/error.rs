//! Application-wide error types.
//!
//! Module errors (`StorageError`, `EmailError`) classify themselves into
//! one of these variants so callers can tell a missing setting from a
//! network failure from a provider refusal.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required configuration value is missing or empty.
    #[error("Configuration missing: {0}")]
    Configuration(String),

    /// The provider rejected the configured credentials.
    #[error("Invalid credentials: {0}")]
    Credentials(String),

    /// The request never got a response (connect, DNS, TLS, timeout).
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The provider answered with an error.
    #[error("Provider rejected request: {0}")]
    ProviderRejected(String),

    /// Object or blob not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input (bad address, unbuildable message).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Local filesystem error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl AppError {
    /// Returns the stable error code for this error.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_MISSING",
            Self::Credentials(_) => "INVALID_CREDENTIALS",
            Self::Transport(_) => "TRANSPORT_FAILURE",
            Self::ProviderRejected(_) => "PROVIDER_REJECTED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Whether the failure happened before the provider saw the request.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::Validation(_) | Self::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::Configuration(String::new()).error_code(),
            "CONFIGURATION_MISSING"
        );
        assert_eq!(
            AppError::Credentials(String::new()).error_code(),
            "INVALID_CREDENTIALS"
        );
        assert_eq!(
            AppError::Transport(String::new()).error_code(),
            "TRANSPORT_FAILURE"
        );
        assert_eq!(
            AppError::ProviderRejected(String::new()).error_code(),
            "PROVIDER_REJECTED"
        );
        assert_eq!(AppError::NotFound(String::new()).error_code(), "NOT_FOUND");
        assert_eq!(
            AppError::Validation(String::new()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(AppError::Io(String::new()).error_code(), "IO_ERROR");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Configuration("msg".into()).to_string(),
            "Configuration missing: msg"
        );
        assert_eq!(
            AppError::Credentials("msg".into()).to_string(),
            "Invalid credentials: msg"
        );
        assert_eq!(
            AppError::Transport("msg".into()).to_string(),
            "Transport failure: msg"
        );
        assert_eq!(
            AppError::ProviderRejected("msg".into()).to_string(),
            "Provider rejected request: msg"
        );
        assert_eq!(
            AppError::NotFound("msg".into()).to_string(),
            "Not found: msg"
        );
        assert_eq!(
            AppError::Validation("msg".into()).to_string(),
            "Validation error: msg"
        );
        assert_eq!(AppError::Io("msg".into()).to_string(), "I/O error: msg");
    }

    #[test]
    fn test_is_local() {
        assert!(AppError::Configuration(String::new()).is_local());
        assert!(AppError::Validation(String::new()).is_local());
        assert!(AppError::Io(String::new()).is_local());
        assert!(!AppError::Transport(String::new()).is_local());
        assert!(!AppError::ProviderRejected(String::new()).is_local());
        assert!(!AppError::Credentials(String::new()).is_local());
        assert!(!AppError::NotFound(String::new()).is_local());
    }
}
