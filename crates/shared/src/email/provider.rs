//! Provider selection.

use std::fmt;

use super::request::{COMMA, SEMICOLON};

/// Email backend chosen by the `email.provider` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmailProvider {
    /// SMTP relay. Also the fallback for any unrecognized selector.
    Smtp,
    /// SendGrid v3 HTTP API.
    SendGrid,
    /// Amazon SES v2.
    Ses,
}

impl EmailProvider {
    /// Parses a selector value. Matching is exact after trimming;
    /// anything other than `Sendgrid` or `AWS` selects SMTP.
    #[must_use]
    pub fn from_selector(selector: &str) -> Self {
        match selector.trim() {
            "Sendgrid" => Self::SendGrid,
            "AWS" => Self::Ses,
            _ => Self::Smtp,
        }
    }

    /// The selector value that picks this provider.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Smtp => "Smtp",
            Self::SendGrid => "Sendgrid",
            Self::Ses => "AWS",
        }
    }

    /// Delimiter this provider's strategy splits recipient lists on.
    #[must_use]
    pub const fn recipient_delimiter(self) -> char {
        match self {
            Self::Ses => COMMA,
            Self::Smtp | Self::SendGrid => SEMICOLON,
        }
    }

    /// Whether legacy callers see this provider's failures as errors
    /// instead of a `false` return.
    #[must_use]
    pub const fn propagates_errors(self) -> bool {
        matches!(self, Self::Ses)
    }
}

impl fmt::Display for EmailProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
