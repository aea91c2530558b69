//! Return conventions of the old object storage helper.
//!
//! Uploads and downloads report `false` on failure. Signed URL generation
//! reports `""`; only [`download_signed_url`] surfaces configuration
//! failures, which happen before any provider call.

use std::path::Path;

use bytes::Bytes;
use tracing::error;

use super::error::StorageError;
use super::key::ContentKind;
use super::service::{ObjectStore, PresignedUrl};

/// Uploads a message file. Failures are logged and reported as `false`.
pub async fn upload_on_amazon(
    store: &ObjectStore,
    bytes: Bytes,
    content_kind: i32,
    file_name: &str,
    bucket: Option<&str>,
) -> bool {
    match store
        .upload(bytes, ContentKind::from_code(content_kind), file_name, bucket)
        .await
    {
        Ok(_) => true,
        Err(e) => {
            error!(error = %e, file_name, "Failed to upload object");
            false
        }
    }
}

/// Downloads a message file to `destination`. Failures are logged and
/// reported as `false`.
pub async fn download_from_amazon(
    store: &ObjectStore,
    destination: &Path,
    file_name: &str,
    content_kind: i32,
    bucket: Option<&str>,
) -> bool {
    match store
        .download(destination, file_name, ContentKind::from_code(content_kind), bucket)
        .await
    {
        Ok(_) => true,
        Err(e) => {
            error!(error = %e, file_name, "Failed to download object");
            false
        }
    }
}

/// Generates a one-day signed URL, or `""` if generation fails.
pub async fn generate_presigned_url(
    store: &ObjectStore,
    file_name: &str,
    content_kind: i32,
    bucket: Option<&str>,
) -> String {
    url_or_empty(
        store
            .signed_download_url(file_name, ContentKind::from_code(content_kind), bucket)
            .await,
    )
}

/// Caller-facing signed URL lookup.
///
/// # Errors
///
/// Returns an error only if the store's endpoint or credentials are not
/// configured. Provider failures yield `Ok("")`.
pub async fn download_signed_url(
    store: &ObjectStore,
    file_name: &str,
    content_kind: i32,
    bucket: Option<&str>,
) -> Result<String, StorageError> {
    store.check_configuration()?;
    Ok(generate_presigned_url(store, file_name, content_kind, bucket).await)
}

fn url_or_empty(result: Result<PresignedUrl, StorageError>) -> String {
    match result {
        Ok(presigned) => presigned.url,
        Err(e) if e.is_credentials() => {
            error!(error = %e, "Check the provided storage credentials");
            String::new()
        }
        Err(e) => {
            error!(error = %e, "Failed to generate presigned URL");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use stratus_shared::config::ObjectStorageConfig;

    use super::*;

    fn unreachable_store() -> ObjectStore {
        ObjectStore::new(ObjectStorageConfig {
            endpoint: Some("http://127.0.0.1:1".to_string()),
            access_key_id: Some("AKIDEXAMPLE".to_string()),
            secret_access_key: Some("secret".to_string()),
            ..ObjectStorageConfig::default()
        })
    }

    #[tokio::test]
    async fn test_upload_unreachable_returns_false() {
        let uploaded = upload_on_amazon(
            &unreachable_store(),
            Bytes::from_static(b"hello"),
            1,
            "a.txt",
            None,
        )
        .await;
        assert!(!uploaded);
    }

    #[tokio::test]
    async fn test_download_unreachable_returns_false() {
        let dir = tempfile::tempdir().expect("tempdir");
        let downloaded = download_from_amazon(
            &unreachable_store(),
            &dir.path().join("a.txt"),
            "a.txt",
            9,
            None,
        )
        .await;
        assert!(!downloaded);
    }

    #[test]
    fn test_credential_error_yields_empty_url() {
        let err = StorageError::from_code(
            Some("InvalidAccessKeyId"),
            "/messagefiles/File/a.pdf",
            "The AWS Access Key Id you provided does not exist".into(),
        );
        assert!(err.is_credentials());
        assert_eq!(url_or_empty(Err(err)), "");
        assert_eq!(url_or_empty(Err(StorageError::Rejected("x".into()))), "");
    }

    #[tokio::test]
    async fn test_generate_presigned_url_without_configuration_is_empty() {
        let store = ObjectStore::new(ObjectStorageConfig::default());
        assert_eq!(generate_presigned_url(&store, "a.pdf", 1, None).await, "");
    }

    #[tokio::test]
    async fn test_download_signed_url_raises_configuration_errors() {
        let store = ObjectStore::new(ObjectStorageConfig::default());
        let err = download_signed_url(&store, "a.pdf", 1, None).await.unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_download_signed_url_when_configured() {
        let url = download_signed_url(&unreachable_store(), "a.pdf", 2, None)
            .await
            .expect("configured");
        assert!(url.contains("messagefiles/Audio/a.pdf"));
        assert!(url.contains("X-Amz-Expires=86400"));
    }
}
