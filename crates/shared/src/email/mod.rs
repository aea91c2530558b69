//! Email dispatch over SMTP, SendGrid and Amazon SES.
//!
//! One [`SendRequest`] shape is mapped onto three provider APIs. The
//! provider is chosen per call from the `email.provider` setting:
//!
//! ```text
//! "Sendgrid"  -> SendGrid v3 mail/send      (recipients split on ';')
//! "AWS"       -> Amazon SES v2 SendEmail    (recipients split on ',')
//! otherwise   -> SMTP via lettre            (recipients split on ';')
//! ```
//!
//! Every strategy builds its own client for the call. Failures are
//! returned as [`EmailError`]; the [`legacy`] module reproduces the old
//! boolean return convention on top of that.

mod dispatcher;
mod error;
pub mod legacy;
mod provider;
mod request;
mod sendgrid;
mod ses;
mod smtp;

pub use dispatcher::EmailDispatcher;
pub use error::EmailError;
pub use provider::EmailProvider;
pub use request::{
    AttachmentFile, COMMA, Recipients, SEMICOLON, SendRequest, load_attachments, split_addresses,
};
pub use sendgrid::SendGridMailer;
pub use ses::SesMailer;
pub use smtp::SmtpMailer;
