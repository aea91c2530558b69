//! Object storage for message files on an S3-compatible endpoint.
//!
//! Files are stored under a key derived from their content kind:
//!
//! ```text
//! code 1 (or unknown) -> /messagefiles/File/{file_name}
//! code 2              -> /messagefiles/Audio/{file_name}
//! code 3              -> /messagefiles/Video/{file_name}
//! code 4              -> /messagefiles/Link/{file_name}
//! ```
//!
//! Uploads are public-read. Downloads can also be shared through a
//! pre-signed GET URL that expires after one day.

mod error;
mod key;
pub mod legacy;
mod service;

pub use error::StorageError;
pub use key::{ContentKind, KEY_PREFIX, StorageKey, resolve_key};
pub use service::{ObjectStore, PRESIGNED_URL_TTL, PresignedUrl};
