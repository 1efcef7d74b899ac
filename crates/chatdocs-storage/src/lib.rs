//! Chatdocs Storage Library
//!
//! This crate provides the object-storage abstraction and its backends.
//!
//! # Storage key format
//!
//! Keys are derived from identifiers, never filenames:
//! `files/{owner_id}/{file_id}`. Renaming a file therefore never requires a
//! storage move, and overwriting writes to the same key. Keys must not
//! contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use chatdocs_core::StorageBackend;
pub use factory::create_storage;
pub use keys::generate_storage_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
