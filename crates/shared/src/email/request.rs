//! Normalized email send request.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::EmailError;
use crate::content_type::content_type_for_path;

/// Delimiter used by the SMTP and SendGrid strategies.
pub const SEMICOLON: char = ';';

/// Delimiter used by the SES strategy.
pub const COMMA: char = ',';

/// A provider-independent send request.
///
/// Address and attachment fields keep their delimited string form; each
/// strategy splits them with its own delimiter. Field names follow the
/// legacy JSON DTO (`ToAddresses`, `CCAddresses`, `IsHtmlFormat`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SendRequest {
    /// Sender address.
    #[serde(default)]
    pub from_address: Option<String>,
    /// Sender display name.
    #[serde(default)]
    pub from_display_name: Option<String>,
    /// Delimited list of primary recipients.
    #[serde(default)]
    pub to_addresses: Option<String>,
    /// Delimited list of carbon-copy recipients.
    #[serde(default, rename = "CCAddresses")]
    pub cc_addresses: Option<String>,
    /// Delimited list of blind carbon-copy recipients.
    #[serde(default, rename = "BCCAddresses")]
    pub bcc_addresses: Option<String>,
    /// Subject line.
    #[serde(default)]
    pub subject: String,
    /// Message body.
    #[serde(default)]
    pub body: String,
    /// Whether `body` is HTML.
    #[serde(default)]
    pub is_html_format: bool,
    /// `;`-delimited list of local files to attach.
    #[serde(default, rename = "AttachmentFile")]
    pub attachment_files: Option<String>,
}

impl SendRequest {
    /// Creates a plain-text request to the given recipients.
    #[must_use]
    pub fn new(
        to_addresses: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            to_addresses: Some(to_addresses.into()),
            subject: subject.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// Sets the sender address and display name.
    #[must_use]
    pub fn with_from(mut self, address: impl Into<String>, display_name: Option<String>) -> Self {
        self.from_address = Some(address.into());
        self.from_display_name = display_name;
        self
    }

    /// Sets the delimited carbon-copy list.
    #[must_use]
    pub fn with_cc(mut self, cc: impl Into<String>) -> Self {
        self.cc_addresses = Some(cc.into());
        self
    }

    /// Sets the delimited blind carbon-copy list.
    #[must_use]
    pub fn with_bcc(mut self, bcc: impl Into<String>) -> Self {
        self.bcc_addresses = Some(bcc.into());
        self
    }

    /// Marks the body as HTML.
    #[must_use]
    pub fn html(mut self) -> Self {
        self.is_html_format = true;
        self
    }

    /// Sets the `;`-delimited attachment list.
    #[must_use]
    pub fn with_attachments(mut self, files: impl Into<String>) -> Self {
        self.attachment_files = Some(files.into());
        self
    }

    /// The sender address, if one is set and not blank.
    #[must_use]
    pub fn sender(&self) -> Option<&str> {
        self.from_address
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The sender display name, if one is set and not blank.
    #[must_use]
    pub fn sender_name(&self) -> Option<&str> {
        self.from_display_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Splits to/cc/bcc with `delimiter`.
    #[must_use]
    pub fn recipients(&self, delimiter: char) -> Recipients {
        Recipients {
            to: split_addresses(self.to_addresses.as_deref(), delimiter),
            cc: split_addresses(self.cc_addresses.as_deref(), delimiter),
            bcc: split_addresses(self.bcc_addresses.as_deref(), delimiter),
        }
    }

    /// Attachment paths, split on `;`.
    #[must_use]
    pub fn attachment_paths(&self) -> Vec<PathBuf> {
        split_addresses(self.attachment_files.as_deref(), SEMICOLON)
            .into_iter()
            .map(PathBuf::from)
            .collect()
    }
}

/// Recipient lists after splitting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipients {
    /// Primary recipients.
    pub to: Vec<String>,
    /// Carbon-copy recipients.
    pub cc: Vec<String>,
    /// Blind carbon-copy recipients.
    pub bcc: Vec<String>,
}

impl Recipients {
    /// Total number of recipients across all lists.
    #[must_use]
    pub fn len(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }

    /// Whether there are no recipients at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Splits a delimited list, trimming entries and dropping empty ones.
#[must_use]
pub fn split_addresses(raw: Option<&str>, delimiter: char) -> Vec<String> {
    raw.map(|raw| {
        raw.split(delimiter)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// An attachment read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentFile {
    /// File name without directories.
    pub filename: String,
    /// MIME type from the extension table.
    pub content_type: &'static str,
    /// Raw file contents.
    pub content: Vec<u8>,
}

/// Reads every attachment; the first unreadable file fails the whole request.
pub async fn load_attachments(paths: &[PathBuf]) -> Result<Vec<AttachmentFile>, EmailError> {
    let mut attachments = Vec::with_capacity(paths.len());

    for path in paths {
        let content = tokio::fs::read(path)
            .await
            .map_err(|source| EmailError::Attachment {
                path: path.clone(),
                source,
            })?;

        attachments.push(AttachmentFile {
            filename: file_name(path),
            content_type: content_type_for_path(path),
            content,
        });
    }

    Ok(attachments)
}

fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.to_string_lossy().into_owned(),
        |name| name.to_string_lossy().into_owned(),
    )
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rstest::rstest;

    use super::*;

    #[test]
    fn test_semicolon_recipients() {
        let request = SendRequest::new("a@x.com;b@x.com", "Hi", "Body");
        let recipients = request.recipients(SEMICOLON);

        assert_eq!(recipients.to, vec!["a@x.com", "b@x.com"]);
        assert!(recipients.cc.is_empty());
        assert!(recipients.bcc.is_empty());
        assert_eq!(recipients.len(), 2);
    }

    #[rstest]
    #[case(None, SEMICOLON, 0)]
    #[case(Some(""), SEMICOLON, 0)]
    #[case(Some(";;"), SEMICOLON, 0)]
    #[case(Some("a@x.com;"), SEMICOLON, 1)]
    #[case(Some(" a@x.com ; b@x.com "), SEMICOLON, 2)]
    #[case(Some("a@x.com,b@x.com"), SEMICOLON, 1)]
    #[case(Some("a@x.com, b@x.com"), COMMA, 2)]
    #[case(Some("a@x.com;b@x.com"), COMMA, 1)]
    fn test_split_addresses(
        #[case] raw: Option<&str>,
        #[case] delimiter: char,
        #[case] expected: usize,
    ) {
        assert_eq!(split_addresses(raw, delimiter).len(), expected);
    }

    #[test]
    fn test_split_trims_entries() {
        assert_eq!(
            split_addresses(Some(" a@x.com , b@x.com"), COMMA),
            vec!["a@x.com", "b@x.com"]
        );
    }

    #[test]
    fn test_cc_and_bcc_use_same_delimiter() {
        let request = SendRequest::new("a@x.com", "Hi", "Body")
            .with_cc("c@x.com;d@x.com")
            .with_bcc("e@x.com");
        let recipients = request.recipients(SEMICOLON);

        assert_eq!(recipients.cc, vec!["c@x.com", "d@x.com"]);
        assert_eq!(recipients.bcc, vec!["e@x.com"]);
        assert_eq!(recipients.len(), 4);
    }

    #[test]
    fn test_sender_blank_is_absent() {
        let request = SendRequest::new("a@x.com", "Hi", "Body").with_from("  ", None);
        assert_eq!(request.sender(), None);

        let request = request.with_from("me@x.com", Some("Me".into()));
        assert_eq!(request.sender(), Some("me@x.com"));
        assert_eq!(request.sender_name(), Some("Me"));
    }

    #[test]
    fn test_deserialize_legacy_dto() {
        let json = r#"{
            "FromAddress": "me@x.com",
            "FromDisplayName": "Me",
            "ToAddresses": "a@x.com;b@x.com",
            "CCAddresses": "c@x.com",
            "BCCAddresses": null,
            "Subject": "Hi",
            "Body": "<b>Hello</b>",
            "IsHtmlFormat": true,
            "AttachmentFile": "/tmp/a.pdf;/tmp/b.txt"
        }"#;

        let request: SendRequest = serde_json::from_str(json).expect("valid DTO");
        assert_eq!(request.sender(), Some("me@x.com"));
        assert!(request.is_html_format);
        assert_eq!(request.recipients(SEMICOLON).cc, vec!["c@x.com"]);
        assert!(request.bcc_addresses.is_none());
        assert_eq!(
            request.attachment_paths(),
            vec![PathBuf::from("/tmp/a.pdf"), PathBuf::from("/tmp/b.txt")]
        );
    }

    #[tokio::test]
    async fn test_load_attachments_reads_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.PDF");
        let mut file = std::fs::File::create(&path).expect("create file");
        file.write_all(b"%PDF-1.4").expect("write file");

        let attachments = load_attachments(&[path]).await.expect("readable");
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].filename, "report.PDF");
        assert_eq!(attachments[0].content_type, "application/pdf");
        assert_eq!(attachments[0].content, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_load_attachments_missing_file() {
        let err = load_attachments(&[PathBuf::from("/definitely/not/here.txt")])
            .await
            .unwrap_err();
        assert!(matches!(err, EmailError::Attachment { .. }));
    }
}
