//! Stratus CLI
//!
//! Runs the object storage, blob store and email helpers from the shell.
//! Configuration comes from `config/*.toml`, `.env` and `STRATUS__*`
//! environment variables.
//!
//! ```bash
//! stratus upload ./report.pdf --kind 1
//! stratus sign report.pdf
//! stratus blob-list --hierarchical
//! stratus send-email ./request.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stratus_core::{BlobSource, BlobStore, ContentKind, ObjectStore};
use stratus_shared::{AppConfig, EmailDispatcher, SendRequest};

#[derive(Parser)]
#[command(name = "stratus")]
#[command(about = "Cloud storage and email dispatch helpers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a local file to the object store (public-read)
    Upload {
        /// File to upload
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Object file name (defaults to the local file name)
        #[arg(long)]
        name: Option<String>,

        /// Content kind code: 1 file, 2 audio, 3 video, 4 link
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        kind: i32,

        /// Bucket (defaults to `storage.default_bucket`)
        #[arg(short, long)]
        bucket: Option<String>,
    },

    /// Download an object to a local file
    Download {
        /// Object file name
        #[arg(value_name = "NAME")]
        name: String,

        /// Destination path (overwritten)
        #[arg(value_name = "DESTINATION")]
        destination: PathBuf,

        /// Content kind code: 1 file, 2 audio, 3 video, 4 link
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        kind: i32,

        /// Bucket (defaults to `storage.default_bucket`)
        #[arg(short, long)]
        bucket: Option<String>,
    },

    /// Print a one-day pre-signed download URL
    Sign {
        /// Object file name
        #[arg(value_name = "NAME")]
        name: String,

        /// Content kind code: 1 file, 2 audio, 3 video, 4 link
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        kind: i32,

        /// Bucket (defaults to `storage.default_bucket`)
        #[arg(short, long)]
        bucket: Option<String>,
    },

    /// Print the unsigned public URL of an object
    PublicUrl {
        /// Object file name
        #[arg(value_name = "NAME")]
        name: String,

        /// Content kind code: 1 file, 2 audio, 3 video, 4 link
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        kind: i32,
    },

    /// Upload a local file to the blob store
    BlobUpload {
        /// File to upload
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Blob name; the file's extension is appended
        #[arg(value_name = "BLOB_NAME")]
        blob_name: String,
    },

    /// Download a blob to a local file
    BlobDownload {
        /// Blob name without extension
        #[arg(value_name = "BLOB_NAME")]
        blob_name: String,

        /// Destination path; its extension selects the blob
        #[arg(value_name = "DESTINATION")]
        destination: PathBuf,
    },

    /// List the blob container
    BlobList {
        /// Show only the root's immediate children, folders included
        #[arg(long)]
        hierarchical: bool,
    },

    /// Send an email described by a JSON request file
    SendEmail {
        /// JSON file in the `SendRequest` shape (`ToAddresses`, `Subject`, ...)
        #[arg(value_name = "REQUEST")]
        request: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stratus=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;

    run(cli.command, config).await
}

async fn run(command: Commands, config: AppConfig) -> Result<()> {
    match command {
        Commands::Upload {
            file,
            name,
            kind,
            bucket,
        } => {
            let name = match name {
                Some(name) => name,
                None => file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .context("FILE has no file name")?,
            };
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let key = ObjectStore::new(config.storage)
                .upload(
                    Bytes::from(data),
                    ContentKind::from_code(kind),
                    &name,
                    bucket.as_deref(),
                )
                .await?;
            println!("{key}");
        }
        Commands::Download {
            name,
            destination,
            kind,
            bucket,
        } => {
            let size = ObjectStore::new(config.storage)
                .download(
                    &destination,
                    &name,
                    ContentKind::from_code(kind),
                    bucket.as_deref(),
                )
                .await?;
            info!(destination = %destination.display(), size, "Download complete");
        }
        Commands::Sign { name, kind, bucket } => {
            let presigned = ObjectStore::new(config.storage)
                .signed_download_url(&name, ContentKind::from_code(kind), bucket.as_deref())
                .await?;
            info!(expires_at = %presigned.expires_at, "Generated presigned URL");
            println!("{}", presigned.url);
        }
        Commands::PublicUrl { name, kind } => {
            let url = ObjectStore::new(config.storage)
                .public_url(&name, ContentKind::from_code(kind))?;
            println!("{url}");
        }
        Commands::BlobUpload { file, blob_name } => {
            let store = BlobStore::from_config(&config.blob)?;
            let name = store.upload(&blob_name, BlobSource::File(file)).await?;
            println!("{name}");
        }
        Commands::BlobDownload {
            blob_name,
            destination,
        } => {
            let store = BlobStore::from_config(&config.blob)?;
            let content_type = store.download_to_file(&blob_name, &destination).await?;
            info!(destination = %destination.display(), content_type, "Download complete");
        }
        Commands::BlobList { hierarchical } => {
            let store = BlobStore::from_config(&config.blob)?;
            for item in store.list_blobs(!hierarchical).await? {
                if item.is_directory {
                    println!("{}/", item.name);
                } else {
                    println!("{}\t{}", item.name, item.content_length.unwrap_or_default());
                }
            }
        }
        Commands::SendEmail { request } => {
            let raw = tokio::fs::read_to_string(&request)
                .await
                .with_context(|| format!("Failed to read {}", request.display()))?;
            let request: SendRequest =
                serde_json::from_str(&raw).context("Invalid email request JSON")?;

            let provider = EmailDispatcher::new(config.email).send(&request).await?;
            println!("sent via {provider}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_upload_defaults() {
        let cli = Cli::try_parse_from(["stratus", "upload", "./report.pdf"]).expect("valid args");
        match cli.command {
            Commands::Upload {
                file,
                name,
                kind,
                bucket,
            } => {
                assert_eq!(file, PathBuf::from("./report.pdf"));
                assert_eq!(name, None);
                assert_eq!(kind, 1);
                assert_eq!(bucket, None);
            }
            _ => panic!("expected upload"),
        }
    }

    #[test]
    fn test_parse_sign_with_kind_and_bucket() {
        let cli = Cli::try_parse_from(["stratus", "sign", "clip.mp4", "-k", "3", "-b", "archive"])
            .expect("valid args");
        assert!(matches!(
            cli.command,
            Commands::Sign { ref name, kind: 3, bucket: Some(ref b) } if name == "clip.mp4" && b == "archive"
        ));
    }

    #[test]
    fn test_parse_blob_list() {
        let cli = Cli::try_parse_from(["stratus", "blob-list", "--hierarchical"]).expect("valid args");
        assert!(matches!(cli.command, Commands::BlobList { hierarchical: true }));
    }
}
