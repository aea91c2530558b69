//! Named blob storage using Apache OpenDAL.
//!
//! Backends:
//! - Azure Blob Storage
//! - Local filesystem (development only)
//! - Process memory (tests only)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          BlobStore                              │
//! │          (one-time container step, then pass-through)           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ op.write_with(name, data)  │ op.lister_with("/").recursive(..)  │
//! │ op.read(name)              │ op.exists(name)                    │
//! │ op.delete(name)            │ op.check()                         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod error;
mod service;
mod types;

pub use error::BlobError;
pub use service::BlobStore;
pub use types::{BlobItem, BlobSource, SeekableReader};
