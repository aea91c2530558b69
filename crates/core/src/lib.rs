//! Cloud storage helpers for Stratus.
//!
//! # Modules
//!
//! - `storage` - Message files on an S3-compatible object store
//! - `blob` - Named blobs on Azure Blob Storage (or a local backend)

pub mod blob;
pub mod storage;

pub use blob::{BlobError, BlobItem, BlobSource, BlobStore};
pub use storage::{ContentKind, ObjectStore, PresignedUrl, StorageError, StorageKey};
