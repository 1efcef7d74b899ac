//! Chatdocs Core Library
//!
//! This crate provides the domain models, error types, configuration, and
//! filename validation shared across all chatdocs components.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
