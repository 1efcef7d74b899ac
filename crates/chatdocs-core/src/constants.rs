//! Shared constants

/// Maximum total length of a normalized filename, extension included.
pub const MAX_FILENAME_LENGTH: usize = 100;

/// Maximum length of a user-supplied file description.
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Default per-file upload size limit in bytes (10 MB).
pub const DEFAULT_FILE_SIZE_LIMIT_BYTES: i64 = 10_000_000;

/// Default lifetime of signed read URLs (24 hours).
pub const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 60 * 60 * 24;

/// Fallback display name when a filename yields an empty stem.
pub const DEFAULT_DISPLAY_NAME: &str = "untitled";
