//! Content kinds and storage keys.

use std::fmt;

/// Prefix shared by every message file key.
pub const KEY_PREFIX: &str = "/messagefiles/";

/// Category of a message file, used to pick its key segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentKind {
    /// Generic file. Also the fallback for unknown codes.
    #[default]
    File,
    /// Audio recording.
    Audio,
    /// Video recording.
    Video,
    /// Link preview.
    Link,
}

impl ContentKind {
    /// Maps a numeric content kind code. Codes outside 1..=4 map to `File`.
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match code {
            2 => Self::Audio,
            3 => Self::Video,
            4 => Self::Link,
            _ => Self::File,
        }
    }

    /// Numeric code of this kind.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::File => 1,
            Self::Audio => 2,
            Self::Video => 3,
            Self::Link => 4,
        }
    }

    /// Key segment for this kind.
    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::File => "File",
            Self::Audio => "Audio",
            Self::Video => "Video",
            Self::Link => "Link",
        }
    }
}

impl From<i32> for ContentKind {
    fn from(code: i32) -> Self {
        Self::from_code(code)
    }
}

/// Key of a message file in the object store.
///
/// Format: `/messagefiles/{segment}/{file_name}`. The file name is used
/// as given, without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    /// Builds the key for `file_name` under `kind`.
    #[must_use]
    pub fn new(kind: ContentKind, file_name: &str) -> Self {
        Self(format!("{KEY_PREFIX}{}/{file_name}", kind.segment()))
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key and returns the owned string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether the key contains a `..` path segment.
    #[must_use]
    pub fn has_traversal(&self) -> bool {
        self.0.split(['/', '\\']).any(|segment| segment == "..")
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Resolves the storage key for a numeric content kind and file name.
#[must_use]
pub fn resolve_key(content_kind: i32, file_name: &str) -> String {
    StorageKey::new(ContentKind::from_code(content_kind), file_name).into_string()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(1, "/messagefiles/File/report.pdf")]
    #[case(2, "/messagefiles/Audio/report.pdf")]
    #[case(3, "/messagefiles/Video/report.pdf")]
    #[case(4, "/messagefiles/Link/report.pdf")]
    #[case(0, "/messagefiles/File/report.pdf")]
    #[case(-1, "/messagefiles/File/report.pdf")]
    #[case(5, "/messagefiles/File/report.pdf")]
    fn test_resolve_key(#[case] code: i32, #[case] expected: &str) {
        assert_eq!(resolve_key(code, "report.pdf"), expected);
    }

    #[test]
    fn test_code_roundtrip() {
        for kind in [
            ContentKind::File,
            ContentKind::Audio,
            ContentKind::Video,
            ContentKind::Link,
        ] {
            assert_eq!(ContentKind::from(kind.code()), kind);
        }
    }

    #[test]
    fn test_file_name_is_not_escaped() {
        let key = StorageKey::new(ContentKind::Audio, "my voice note (1).m4a");
        assert_eq!(key.as_str(), "/messagefiles/Audio/my voice note (1).m4a");
        assert_eq!(key.to_string(), key.as_str());
    }

    #[rstest]
    #[case("report.pdf", false)]
    #[case("..report.pdf", false)]
    #[case("../secrets.txt", true)]
    #[case("a/../../b", true)]
    #[case("..\\windows", true)]
    fn test_has_traversal(#[case] file_name: &str, #[case] expected: bool) {
        assert_eq!(StorageKey::new(ContentKind::File, file_name).has_traversal(), expected);
    }
}
