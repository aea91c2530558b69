//! Shared configuration, errors, and email dispatch for Stratus.
//!
//! This crate provides the pieces used by every other crate:
//! - Layered configuration (`config` files plus `STRATUS__` environment)
//! - The application-wide error taxonomy
//! - The extension to content-type table
//! - Email dispatch over SMTP, SendGrid and Amazon SES

pub mod config;
pub mod content_type;
pub mod email;
pub mod error;

pub use config::AppConfig;
pub use content_type::content_type_for_extension;
pub use email::{EmailDispatcher, EmailError, EmailProvider, SendRequest};
pub use error::{AppError, AppResult};
