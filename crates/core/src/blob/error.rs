//! Blob store error types.

use std::path::PathBuf;

use stratus_shared::AppError;
use thiserror::Error;

/// Blob store operation errors.
#[derive(Debug, Error)]
pub enum BlobError {
    /// No blob provider is configured.
    #[error("blob store not configured: `blob.provider` is not set")]
    NotConfigured,

    /// Blob store provider configuration error.
    #[error("blob store configuration error: {0}")]
    Configuration(String),

    /// The container could not be reached or prepared.
    #[error("blob container '{container}' is not available: {message}")]
    ContainerUnavailable {
        /// Container name.
        container: String,
        /// Provider message.
        message: String,
    },

    /// The provider refused the configured credentials.
    #[error("blob store permission denied: {0}")]
    PermissionDenied(String),

    /// Blob not found in the container.
    #[error("blob not found: {name}")]
    NotFound {
        /// Blob name that was not found.
        name: String,
    },

    /// OpenDAL operation error.
    #[error("blob operation failed: {0}")]
    Operation(String),

    /// A local file could not be read or written.
    #[error("failed to access {path}: {source}")]
    Io {
        /// Local path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl BlobError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an I/O error for `path`.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Classifies an OpenDAL error for the blob `name`.
    #[must_use]
    pub fn for_blob(name: &str, err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound {
                name: name.to_string(),
            },
            _ => Self::from(err),
        }
    }
}

impl From<opendal::Error> for BlobError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound {
                name: err.to_string(),
            },
            opendal::ErrorKind::PermissionDenied => Self::PermissionDenied(err.to_string()),
            opendal::ErrorKind::ConfigInvalid => Self::Configuration(err.to_string()),
            _ => Self::Operation(err.to_string()),
        }
    }
}

impl From<BlobError> for AppError {
    fn from(err: BlobError) -> Self {
        let message = err.to_string();
        match err {
            BlobError::NotConfigured
            | BlobError::Configuration(_)
            | BlobError::ContainerUnavailable { .. } => Self::Configuration(message),
            BlobError::PermissionDenied(_) => Self::Credentials(message),
            BlobError::NotFound { .. } => Self::NotFound(message),
            BlobError::Operation(_) => Self::Transport(message),
            BlobError::Io { .. } => Self::Io(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opendal_error_mapping() {
        let not_found = opendal::Error::new(opendal::ErrorKind::NotFound, "missing");
        assert!(matches!(
            BlobError::for_blob("a.txt", not_found),
            BlobError::NotFound { ref name } if name == "a.txt"
        ));

        let denied = opendal::Error::new(opendal::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(BlobError::from(denied), BlobError::PermissionDenied(_)));

        let other = opendal::Error::new(opendal::ErrorKind::Unexpected, "boom");
        assert!(matches!(BlobError::from(other), BlobError::Operation(_)));
    }

    #[test]
    fn test_app_error_codes() {
        let cases = [
            (BlobError::NotConfigured, "CONFIGURATION_MISSING"),
            (
                BlobError::ContainerUnavailable {
                    container: "attachments".into(),
                    message: "x".into(),
                },
                "CONFIGURATION_MISSING",
            ),
            (BlobError::PermissionDenied("x".into()), "INVALID_CREDENTIALS"),
            (BlobError::NotFound { name: "a".into() }, "NOT_FOUND"),
            (BlobError::Operation("x".into()), "TRANSPORT_FAILURE"),
        ];

        for (err, code) in cases {
            assert_eq!(AppError::from(err).error_code(), code);
        }
    }
}
