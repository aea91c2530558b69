//! Object store implementation over the AWS S3 SDK.

use std::path::Path;
use std::time::Duration;

use aws_credential_types::Credentials;
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Region, retry::RetryConfig},
    presigning::PresigningConfig,
    primitives::ByteStream,
    types::ObjectCannedAcl,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use stratus_shared::config::{ObjectStorageConfig, present};
use tracing::{debug, info, warn};

use super::error::StorageError;
use super::key::{ContentKind, StorageKey};

/// Lifetime of a pre-signed download URL: one day.
pub const PRESIGNED_URL_TTL: Duration = Duration::from_secs(86_400);

/// Pre-signed download URL.
#[derive(Debug, Clone)]
pub struct PresignedUrl {
    /// The presigned URL.
    pub url: String,
    /// When the URL expires.
    pub expires_at: DateTime<Utc>,
}

/// S3-compatible store for message files.
///
/// Every operation builds its own client from the configuration.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    config: ObjectStorageConfig,
}

impl ObjectStore {
    /// Create a new object store from configuration.
    #[must_use]
    pub const fn new(config: ObjectStorageConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &ObjectStorageConfig {
        &self.config
    }

    /// Bucket used when the caller does not name one.
    #[must_use]
    pub fn default_bucket(&self) -> &str {
        &self.config.default_bucket
    }

    /// Checks that the endpoint and both keys are configured.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first missing setting.
    pub fn check_configuration(&self) -> Result<(), StorageError> {
        self.settings().map(|_| ())
    }

    fn settings(&self) -> Result<(&str, &str, &str), StorageError> {
        let endpoint = present(self.config.endpoint.as_ref())
            .ok_or_else(|| StorageError::missing_setting("storage.endpoint"))?;
        let access_key = present(self.config.access_key_id.as_ref())
            .ok_or_else(|| StorageError::missing_setting("storage.access_key_id"))?;
        let secret_key = present(self.config.secret_access_key.as_ref())
            .ok_or_else(|| StorageError::missing_setting("storage.secret_access_key"))?;
        Ok((endpoint, access_key, secret_key))
    }

    /// Builds an S3 client for one operation, retries disabled.
    fn client(&self) -> Result<Client, StorageError> {
        let (endpoint, access_key, secret_key) = self.settings()?;

        let credentials = Credentials::new(access_key, secret_key, None, None, "stratus");

        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(endpoint)
            .region(Region::new(self.config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(self.config.force_path_style)
            .retry_config(RetryConfig::disabled())
            .build();

        Ok(Client::from_conf(config))
    }

    fn resolve<'a>(
        &'a self,
        content_kind: ContentKind,
        file_name: &str,
        bucket: Option<&'a str>,
    ) -> (StorageKey, &'a str) {
        let key = StorageKey::new(content_kind, file_name);
        if key.has_traversal() {
            warn!(key = %key, "Storage key contains a parent directory segment");
        }
        (key, bucket.unwrap_or(&self.config.default_bucket))
    }

    /// Uploads `bytes` as a public-read object.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is not configured or the put fails.
    pub async fn upload(
        &self,
        bytes: Bytes,
        content_kind: ContentKind,
        file_name: &str,
        bucket: Option<&str>,
    ) -> Result<StorageKey, StorageError> {
        let (key, bucket) = self.resolve(content_kind, file_name, bucket);
        let client = self.client()?;
        let size = bytes.len();

        client
            .put_object()
            .bucket(bucket)
            .key(key.as_str())
            .acl(ObjectCannedAcl::PublicRead)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::from_sdk(e, key.as_str()))?;

        info!(bucket = %bucket, key = %key, size, "Uploaded object");
        Ok(key)
    }

    /// Downloads an object into `destination`, overwriting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is not configured, the object cannot
    /// be fetched, or the file cannot be written.
    pub async fn download(
        &self,
        destination: &Path,
        file_name: &str,
        content_kind: ContentKind,
        bucket: Option<&str>,
    ) -> Result<u64, StorageError> {
        let (key, bucket) = self.resolve(content_kind, file_name, bucket);
        let client = self.client()?;

        let output = client
            .get_object()
            .bucket(bucket)
            .key(key.as_str())
            .send()
            .await
            .map_err(|e| StorageError::from_sdk(e, key.as_str()))?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?
            .into_bytes();

        tokio::fs::write(destination, &data)
            .await
            .map_err(|source| StorageError::Io {
                path: destination.to_path_buf(),
                source,
            })?;

        debug!(
            bucket = %bucket,
            key = %key,
            destination = %destination.display(),
            size = data.len(),
            "Downloaded object"
        );
        Ok(data.len() as u64)
    }

    /// Generates a pre-signed GET URL valid for [`PRESIGNED_URL_TTL`].
    ///
    /// # Errors
    ///
    /// Returns an error if the store is not configured or signing fails.
    pub async fn signed_download_url(
        &self,
        file_name: &str,
        content_kind: ContentKind,
        bucket: Option<&str>,
    ) -> Result<PresignedUrl, StorageError> {
        let (key, bucket) = self.resolve(content_kind, file_name, bucket);
        let client = self.client()?;

        let presigning = PresigningConfig::expires_in(PRESIGNED_URL_TTL)
            .map_err(|e| StorageError::Configuration(e.to_string()))?;

        let presigned = client
            .get_object()
            .bucket(bucket)
            .key(key.as_str())
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::from_sdk(e, key.as_str()))?;

        debug!(bucket = %bucket, key = %key, "Generated presigned download URL");

        Ok(PresignedUrl {
            url: presigned.uri().to_string(),
            expires_at: Utc::now()
                + chrono::Duration::seconds(
                    i64::try_from(PRESIGNED_URL_TTL.as_secs()).unwrap_or(i64::MAX),
                ),
        })
    }

    /// Unsigned URL of a public-read object, built from `storage.bucket_url`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `storage.bucket_url` is not set.
    pub fn public_url(
        &self,
        file_name: &str,
        content_kind: ContentKind,
    ) -> Result<String, StorageError> {
        let base = present(self.config.bucket_url.as_ref())
            .ok_or_else(|| StorageError::missing_setting("storage.bucket_url"))?;
        let key = StorageKey::new(content_kind, file_name);

        Ok(format!("{}{key}", base.trim_end_matches('/')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ObjectStorageConfig {
        ObjectStorageConfig {
            endpoint: Some("http://127.0.0.1:1".to_string()),
            access_key_id: Some("AKIDEXAMPLE".to_string()),
            secret_access_key: Some("secret".to_string()),
            bucket_url: Some("https://cdn.example.com/mybucketname/".to_string()),
            ..ObjectStorageConfig::default()
        }
    }

    #[test]
    fn test_check_configuration() {
        assert!(ObjectStore::new(config()).check_configuration().is_ok());

        let err = ObjectStore::new(ObjectStorageConfig::default())
            .check_configuration()
            .unwrap_err();
        assert!(matches!(err, StorageError::Configuration(ref m) if m.contains("storage.endpoint")));

        let blank_secret = ObjectStorageConfig {
            secret_access_key: Some("  ".to_string()),
            ..config()
        };
        let err = ObjectStore::new(blank_secret).check_configuration().unwrap_err();
        assert!(err.to_string().contains("storage.secret_access_key"));
    }

    #[test]
    fn test_public_url() {
        let store = ObjectStore::new(config());
        assert_eq!(
            store.public_url("a.pdf", ContentKind::Video).expect("configured"),
            "https://cdn.example.com/mybucketname/messagefiles/Video/a.pdf"
        );

        let unset = ObjectStore::new(ObjectStorageConfig::default());
        assert!(unset.public_url("a.pdf", ContentKind::File).is_err());
    }

    #[tokio::test]
    async fn test_signed_download_url_lasts_one_day() {
        let store = ObjectStore::new(config());
        let before = Utc::now();

        let presigned = store
            .signed_download_url("report.pdf", ContentKind::File, None)
            .await
            .expect("signing is local");

        assert!(presigned.url.contains("X-Amz-Expires=86400"));
        assert!(presigned.url.contains("mybucketname"));
        assert!(presigned.url.contains("messagefiles/File/report.pdf"));

        let ttl = presigned.expires_at - before;
        assert!((ttl - chrono::Duration::days(1)).num_seconds().abs() <= 5);
    }

    #[tokio::test]
    async fn test_signed_download_url_uses_named_bucket() {
        let store = ObjectStore::new(config());
        let presigned = store
            .signed_download_url("clip.mp4", ContentKind::Video, Some("archive"))
            .await
            .expect("signing is local");

        assert!(presigned.url.contains("/archive/"));
        assert!(presigned.url.contains("messagefiles/Video/clip.mp4"));
    }

    #[tokio::test]
    async fn test_upload_unreachable_endpoint_is_transport_error() {
        let store = ObjectStore::new(config());
        let err = store
            .upload(Bytes::from_static(b"hello"), ContentKind::File, "a.txt", None)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Transport(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_download_without_configuration_fails_first() {
        let dir = tempfile::tempdir().expect("tempdir");
        let destination = dir.path().join("out.bin");

        let err = ObjectStore::new(ObjectStorageConfig::default())
            .download(&destination, "a.txt", ContentKind::File, None)
            .await
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(!destination.exists());
    }
}
