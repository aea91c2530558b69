//! Blob listing entries and upload sources.

use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

use tokio::io::{AsyncRead, AsyncSeek};

/// One entry of a blob listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobItem {
    /// Full blob name (`folder/file_name`).
    pub name: String,
    /// Parent path, `""` at the container root.
    pub folder: String,
    /// Last path segment.
    pub file_name: String,
    /// Whether this is a virtual folder.
    pub is_directory: bool,
    /// Size in bytes, when the backend reports it.
    pub content_length: Option<u64>,
    /// Content type, when the backend reports it.
    pub content_type: Option<String>,
}

impl BlobItem {
    /// Builds an item from a backend path. Folder paths end with `/`.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let is_directory = path.ends_with('/');
        let name = path.trim_start_matches('/').trim_end_matches('/');
        let (folder, file_name) = name.rsplit_once('/').unwrap_or(("", name));

        Self {
            name: name.to_string(),
            folder: folder.to_string(),
            file_name: file_name.to_string(),
            is_directory,
            content_length: None,
            content_type: None,
        }
    }

    /// Whether the item sits directly in the container root.
    #[must_use]
    pub fn is_root_level(&self) -> bool {
        self.folder.is_empty()
    }

    /// Listing order: items inside folders first, by folder then name;
    /// root-level items after them, by name.
    #[must_use]
    pub fn listing_order(&self, other: &Self) -> Ordering {
        self.is_root_level()
            .cmp(&other.is_root_level())
            .then_with(|| self.folder.cmp(&other.folder))
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// Readers accepted as blob upload sources.
pub trait SeekableReader: AsyncRead + AsyncSeek + Unpin + Send {}

impl<T: AsyncRead + AsyncSeek + Unpin + Send> SeekableReader for T {}

/// Where an uploaded blob's bytes come from.
pub enum BlobSource {
    /// A local file. Its extension is appended to the blob name.
    File(PathBuf),
    /// An in-memory or otherwise seekable stream, read from the start.
    Reader(Box<dyn SeekableReader>),
}

impl BlobSource {
    /// Wraps a seekable reader.
    #[must_use]
    pub fn reader(reader: impl SeekableReader + 'static) -> Self {
        Self::Reader(Box::new(reader))
    }
}

impl From<PathBuf> for BlobSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

impl fmt::Debug for BlobSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}
