//! Blob store implementation using Apache OpenDAL.

use std::io::SeekFrom;
use std::path::Path;

use azure_storage::StorageCredentials;
use azure_storage_blobs::prelude::ClientBuilder;
use bytes::Bytes;
use futures::TryStreamExt;
use opendal::{EntryMode, Operator, services};
use stratus_shared::config::{BlobConfig, BlobProvider};
use stratus_shared::content_type::content_type_for_path;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::error::BlobError;
use super::types::{BlobItem, BlobSource};

/// Named blobs in one container.
///
/// The container is prepared on first use; later operations reuse that.
#[derive(Debug)]
pub struct BlobStore {
    operator: Operator,
    provider: BlobProvider,
    ready: OnceCell<()>,
}

impl BlobStore {
    /// Create a blob store from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no provider is configured or it cannot be
    /// initialized.
    pub fn from_config(config: &BlobConfig) -> Result<Self, BlobError> {
        let provider = config.provider.clone().ok_or(BlobError::NotConfigured)?;
        Self::new(provider)
    }

    /// Create a blob store for a provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be initialized.
    pub fn new(provider: BlobProvider) -> Result<Self, BlobError> {
        let operator = Self::create_operator(&provider)?;
        Ok(Self {
            operator,
            provider,
            ready: OnceCell::new(),
        })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &BlobProvider) -> Result<Operator, BlobError> {
        let operator = match provider {
            BlobProvider::AzureBlob {
                account,
                access_key,
                container,
            } => {
                let builder = services::Azblob::default()
                    .endpoint(&format!("https://{account}.blob.core.windows.net"))
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);

                Operator::new(builder)
                    .map_err(|e| BlobError::configuration(e.to_string()))?
                    .finish()
            }
            BlobProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| BlobError::configuration("invalid path"))?,
                );

                Operator::new(builder)
                    .map_err(|e| BlobError::configuration(e.to_string()))?
                    .finish()
            }
            BlobProvider::Memory => Operator::new(services::Memory::default())
                .map_err(|e| BlobError::configuration(e.to_string()))?
                .finish(),
        };

        Ok(operator)
    }

    /// Runs the one-time container step.
    ///
    /// Local roots and Azure containers are created if absent; an existing
    /// one is reused. The backend must answer a health check afterwards.
    async fn ensure_container(&self) -> Result<(), BlobError> {
        self.ready
            .get_or_try_init(|| async move {
                match &self.provider {
                    BlobProvider::LocalFs { root } => tokio::fs::create_dir_all(root)
                        .await
                        .map_err(|source| BlobError::io(root, source))?,
                    BlobProvider::AzureBlob {
                        account,
                        access_key,
                        container,
                    } => {
                        create_azure_container(account, access_key, container).await?;
                        self.operator.check().await.map_err(|e| {
                            BlobError::ContainerUnavailable {
                                container: container.clone(),
                                message: e.to_string(),
                            }
                        })?;
                    }
                    BlobProvider::Memory => {}
                }

                debug!(
                    provider = self.provider.name(),
                    container = self.provider.container(),
                    "Blob container ready"
                );
                Ok::<(), BlobError>(())
            })
            .await?;
        Ok(())
    }

    /// Uploads a blob and returns its final name.
    ///
    /// A [`BlobSource::File`] is stored as `blob_name` plus the file's
    /// extension, with the content type for that extension. A
    /// [`BlobSource::Reader`] is rewound and stored as `blob_name` with no
    /// content type.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or the write fails.
    pub async fn upload(&self, blob_name: &str, source: BlobSource) -> Result<String, BlobError> {
        self.ensure_container().await?;

        let (name, content, content_type) = match source {
            BlobSource::Reader(mut reader) => {
                let mut buf = Vec::new();
                reader
                    .seek(SeekFrom::Start(0))
                    .await
                    .map_err(|e| BlobError::io(blob_name, e))?;
                reader
                    .read_to_end(&mut buf)
                    .await
                    .map_err(|e| BlobError::io(blob_name, e))?;
                (blob_name.to_string(), buf, None)
            }
            BlobSource::File(path) => {
                let content = tokio::fs::read(&path)
                    .await
                    .map_err(|e| BlobError::io(&path, e))?;
                (
                    with_extension_of(blob_name, &path),
                    content,
                    Some(content_type_for_path(&path)),
                )
            }
        };

        let size = content.len();
        match content_type {
            Some(content_type) => {
                self.operator
                    .write_with(&name, content)
                    .content_type(content_type)
                    .await
                    .map_err(|e| BlobError::for_blob(&name, e))?;
            }
            None => {
                self.operator
                    .write(&name, content)
                    .await
                    .map_err(|e| BlobError::for_blob(&name, e))?;
            }
        }

        info!(
            container = self.provider.container(),
            blob = %name,
            size,
            "Uploaded blob"
        );
        Ok(name)
    }

    /// Reads a whole blob into memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob does not exist or cannot be read.
    pub async fn download(&self, blob_name: &str) -> Result<Bytes, BlobError> {
        self.ensure_container().await?;

        let buffer = self
            .operator
            .read(blob_name)
            .await
            .map_err(|e| BlobError::for_blob(blob_name, e))?;

        Ok(buffer.to_bytes())
    }

    /// Reads `blob_name` plus the extension of `path` and writes it to
    /// `path`, overwriting it. Returns the content type for the extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be read or the file written.
    pub async fn download_to_file(
        &self,
        blob_name: &str,
        path: &Path,
    ) -> Result<&'static str, BlobError> {
        let name = with_extension_of(blob_name, path);
        let content_type = content_type_for_path(path);
        let data = self.download(&name).await?;

        tokio::fs::write(path, &data)
            .await
            .map_err(|e| BlobError::io(path, e))?;

        debug!(
            blob = %name,
            path = %path.display(),
            content_type,
            "Downloaded blob to file"
        );
        Ok(content_type)
    }

    /// Lists the container.
    ///
    /// With `flat_listing` every blob at any depth is returned and folders
    /// are omitted. Without it only the root's immediate children are
    /// returned, virtual folders included. Every page is read before
    /// returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    pub async fn list_blobs(&self, flat_listing: bool) -> Result<Vec<BlobItem>, BlobError> {
        self.ensure_container().await?;

        let entries: Vec<opendal::Entry> = self
            .operator
            .lister_with("/")
            .recursive(flat_listing)
            .await?
            .try_collect()
            .await?;

        // Some listers (memory, fs) leave sizes unset; stat those entries.
        let listed_length = self
            .operator
            .info()
            .full_capability()
            .list_has_content_length;

        let mut items = Vec::with_capacity(entries.len());
        for entry in entries {
            if matches!(entry.path(), "" | "/")
                || (flat_listing && entry.metadata().mode() == EntryMode::DIR)
            {
                continue;
            }

            let mut item = BlobItem::from_path(entry.path());
            if !item.is_directory {
                let meta = if listed_length {
                    entry.metadata().clone()
                } else {
                    self.operator
                        .stat(entry.path())
                        .await
                        .map_err(|e| BlobError::for_blob(entry.path(), e))?
                };
                item.content_length = Some(meta.content_length());
                item.content_type = meta.content_type().map(String::from);
            }
            items.push(item);
        }

        items.sort_by(BlobItem::listing_order);
        Ok(items)
    }

    /// Delete a blob. Deleting a missing blob succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn delete(&self, blob_name: &str) -> Result<(), BlobError> {
        self.ensure_container().await?;
        self.operator
            .delete(blob_name)
            .await
            .map_err(|e| BlobError::for_blob(blob_name, e))
    }

    /// Check if a blob exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be queried.
    pub async fn exists(&self, blob_name: &str) -> Result<bool, BlobError> {
        self.ensure_container().await?;
        self.operator
            .exists(blob_name)
            .await
            .map_err(|e| BlobError::for_blob(blob_name, e))
    }

    /// Get the blob provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Get the container name.
    #[must_use]
    pub fn container(&self) -> &str {
        self.provider.container()
    }
}

/// Creates an Azure container, treating an existing one as success.
async fn create_azure_container(
    account: &str,
    access_key: &str,
    container: &str,
) -> Result<(), BlobError> {
    let credentials = StorageCredentials::access_key(account.to_string(), access_key.to_string());
    let client = ClientBuilder::new(account.to_string(), credentials).container_client(container);

    match client.create().await {
        Ok(_) => {
            info!(container, "Created blob container");
            Ok(())
        }
        Err(e) if is_already_exists(e.as_http_error().and_then(|h| h.error_code())) => Ok(()),
        Err(e) => Err(BlobError::ContainerUnavailable {
            container: container.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Whether an Azure error code means the container is already there.
fn is_already_exists(error_code: Option<&str>) -> bool {
    error_code == Some("ContainerAlreadyExists")
}

/// `blob_name` followed by the extension of `path`, dot included.
fn with_extension_of(blob_name: &str, path: &Path) -> String {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("{blob_name}.{ext}"),
        None => blob_name.to_string(),
    }
}
