//! File extension to MIME type lookup.

/// Content type used when the extension is unknown.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Returns the content type for a file extension.
///
/// Matching is case-insensitive and a leading dot is ignored, so both
/// `"PDF"` and `".pdf"` resolve to `application/pdf`.
#[must_use]
pub fn content_type_for_extension(extension: &str) -> &'static str {
    let extension = extension.trim_start_matches('.').to_ascii_lowercase();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "bmp" => "image/bmp",
        "gif" => "image/gif",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "xls" => "application/vnd.ms-excel",
        "xml" => "text/xml",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

/// Returns the content type for a file name or path, by its extension.
#[must_use]
pub fn content_type_for_path(path: impl AsRef<std::path::Path>) -> &'static str {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(DEFAULT_CONTENT_TYPE, content_type_for_extension)
}
