//! Configuration module
//!
//! This module provides configuration for the library crates, including
//! database, storage, upload-limit, and search-index settings. Values are
//! read from the environment with sensible defaults and checked by
//! [`AppConfig::validate`].

use std::env;

use crate::constants::{DEFAULT_FILE_SIZE_LIMIT_BYTES, DEFAULT_SIGNED_URL_TTL_SECS};
use crate::storage_types::StorageBackend;

// Common constants
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const SEARCH_INDEX_TIMEOUT_SECS: u64 = 30;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    // Upload limits
    pub file_size_limit_bytes: i64,
    pub signed_url_ttl_secs: u64,
    // External search index (optional; unset = notifications disabled)
    pub search_index_url: Option<String>,
    pub search_index_api_key: Option<String>,
    pub search_index_timeout_secs: u64,
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from the environment (and a `.env` file if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let storage_backend = env_opt("STORAGE_BACKEND")
            .map(|v| v.parse::<StorageBackend>())
            .transpose()
            .map_err(|e| anyhow::anyhow!(e))?
            .unwrap_or(StorageBackend::Local);

        let config = AppConfig {
            database_url,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: env_parse("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            environment: env_opt("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            storage_backend,
            local_storage_path: env_opt("LOCAL_STORAGE_PATH"),
            local_storage_base_url: env_opt("LOCAL_STORAGE_BASE_URL"),
            s3_bucket: env_opt("S3_BUCKET"),
            s3_region: env_opt("S3_REGION").or_else(|| env_opt("AWS_REGION")),
            s3_endpoint: env_opt("S3_ENDPOINT"),
            file_size_limit_bytes: env_parse("FILE_SIZE_LIMIT", DEFAULT_FILE_SIZE_LIMIT_BYTES),
            signed_url_ttl_secs: env_parse("SIGNED_URL_TTL_SECS", DEFAULT_SIGNED_URL_TTL_SECS),
            search_index_url: env_opt("SEARCH_INDEX_URL"),
            search_index_api_key: env_opt("SEARCH_INDEX_API_KEY"),
            search_index_timeout_secs: env_parse(
                "SEARCH_INDEX_TIMEOUT_SECS",
                SEARCH_INDEX_TIMEOUT_SECS,
            ),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.file_size_limit_bytes <= 0 {
            anyhow::bail!("FILE_SIZE_LIMIT must be positive");
        }

        match self.storage_backend {
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    anyhow::bail!("LOCAL_STORAGE_PATH must be set for the local storage backend");
                }
                if self.local_storage_base_url.is_none() {
                    anyhow::bail!(
                        "LOCAL_STORAGE_BASE_URL must be set for the local storage backend"
                    );
                }
            }
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    anyhow::bail!("S3_BUCKET must be set for the S3 storage backend");
                }
                if self.s3_region.is_none() {
                    anyhow::bail!("S3_REGION or AWS_REGION must be set for the S3 storage backend");
                }
            }
        }

        if self.search_index_api_key.is_some() && self.search_index_url.is_none() {
            anyhow::bail!("SEARCH_INDEX_API_KEY is set but SEARCH_INDEX_URL is not");
        }

        Ok(())
    }
}
