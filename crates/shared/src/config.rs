//! Application configuration management.
//!
//! Every helper receives its section of [`AppConfig`] at construction
//! time. Credentials are plain values in that section; operations read
//! them when they build their provider client.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// S3-compatible object storage.
    #[serde(default)]
    pub storage: ObjectStorageConfig,
    /// Blob store (Azure Blob Storage or a development backend).
    #[serde(default)]
    pub blob: BlobConfig,
    /// Email dispatch.
    #[serde(default)]
    pub email: EmailConfig,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `STRATUS__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("STRATUS").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

/// Returns the trimmed value if it is set and not blank.
///
/// Blank settings are treated exactly like missing ones.
#[must_use]
pub fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// S3-compatible object storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectStorageConfig {
    /// Service URL of the S3 endpoint.
    pub endpoint: Option<String>,
    /// Access key ID.
    pub access_key_id: Option<String>,
    /// Secret access key.
    pub secret_access_key: Option<String>,
    /// Public base URL of the bucket, used for unsigned links.
    pub bucket_url: Option<String>,
    /// Signing region.
    #[serde(default = "default_storage_region")]
    pub region: String,
    /// Bucket used when a caller does not name one.
    #[serde(default = "default_bucket")]
    pub default_bucket: String,
    /// Use path-style addressing (`endpoint/bucket/key`).
    #[serde(default = "default_true")]
    pub force_path_style: bool,
}

fn default_storage_region() -> String {
    "us-east-1".to_string()
}

fn default_bucket() -> String {
    "mybucketname".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ObjectStorageConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            bucket_url: None,
            region: default_storage_region(),
            default_bucket: default_bucket(),
            force_path_style: true,
        }
    }
}

/// Blob store configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlobConfig {
    /// Backend holding the blobs. Unset means the blob store is not configured.
    pub provider: Option<BlobProvider>,
}

/// Blob store backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlobProvider {
    /// Azure Blob Storage
    AzureBlob {
        /// Azure storage account name.
        account: String,
        /// Azure storage access key.
        access_key: String,
        /// Azure container name.
        container: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
    /// Process memory (tests only)
    Memory,
}

impl BlobProvider {
    /// Create Azure Blob Storage provider.
    #[must_use]
    pub fn azure_blob(
        account: impl Into<String>,
        access_key: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        Self::AzureBlob {
            account: account.into(),
            access_key: access_key.into(),
            container: container.into(),
        }
    }

    /// Create local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Get the provider name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AzureBlob { .. } => "azure_blob",
            Self::LocalFs { .. } => "local",
            Self::Memory => "memory",
        }
    }

    /// Get the container name.
    #[must_use]
    pub fn container(&self) -> &str {
        match self {
            Self::AzureBlob { container, .. } => container,
            Self::LocalFs { root } => root.to_str().unwrap_or("local"),
            Self::Memory => "memory",
        }
    }
}

/// Email dispatch configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Provider selector: `Smtp`, `Sendgrid` or `AWS`.
    #[serde(default = "default_email_provider")]
    pub provider: String,
    /// SMTP relay settings.
    #[serde(default)]
    pub smtp: SmtpConfig,
    /// SendGrid API settings.
    #[serde(default)]
    pub sendgrid: SendGridConfig,
    /// Amazon SES settings.
    #[serde(default)]
    pub ses: SesConfig,
}

fn default_email_provider() -> String {
    "Smtp".to_string()
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: default_email_provider(),
            smtp: SmtpConfig::default(),
            sendgrid: SendGridConfig::default(),
            ses: SesConfig::default(),
        }
    }
}

/// SMTP relay configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    /// SMTP server host.
    #[serde(default = "default_smtp_host")]
    pub host: String,
    /// SMTP server port.
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Username for SMTP AUTH.
    pub username: Option<String>,
    /// Password for SMTP AUTH.
    pub password: Option<String>,
    /// Sender used when a request carries no from address.
    pub default_from: Option<String>,
    /// Skip server certificate validation. Never enable in production.
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Connection and command timeout in seconds.
    #[serde(default = "default_smtp_timeout")]
    pub timeout_secs: u64,
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_timeout() -> u64 {
    30
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            username: None,
            password: None,
            default_from: None,
            accept_invalid_certs: false,
            timeout_secs: default_smtp_timeout(),
        }
    }
}

/// SendGrid API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SendGridConfig {
    /// API key.
    pub api_key: Option<String>,
    /// Mail send endpoint.
    #[serde(default = "default_sendgrid_url")]
    pub api_url: String,
}

fn default_sendgrid_url() -> String {
    "https://api.sendgrid.com/v3/mail/send".to_string()
}

impl Default for SendGridConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_sendgrid_url(),
        }
    }
}

/// Amazon SES configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SesConfig {
    /// Access key ID.
    pub access_key_id: Option<String>,
    /// Secret access key.
    pub secret_access_key: Option<String>,
    /// SES region.
    #[serde(default = "default_ses_region")]
    pub region: String,
    /// Endpoint override (local SES emulators, tests).
    pub endpoint: Option<String>,
}

fn default_ses_region() -> String {
    "us-west-2".to_string()
}

impl Default for SesConfig {
    fn default() -> Self {
        Self {
            access_key_id: None,
            secret_access_key: None,
            region: default_ses_region(),
            endpoint: None,
        }
    }
}
