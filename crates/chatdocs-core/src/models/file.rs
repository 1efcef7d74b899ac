use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored file's metadata row.
///
/// `name` always holds the normalized filename; `storage_path` is empty
/// until the object-store write completes and is patched afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct FileRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub content_type: String,
    pub size: i64,
    pub storage_path: String,
    pub tokens: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new file record. The storage path starts as the
/// empty placeholder and the token count as zero; both are populated later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFileRecord {
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub content_type: String,
    pub size: i64,
}

/// Partial update of a file record. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileRecordUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub content_type: Option<String>,
    pub size: Option<i64>,
    pub storage_path: Option<String>,
    pub tokens: Option<i32>,
}

/// Association between a file and a workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct FileWorkspace {
    pub owner_id: Uuid,
    pub file_id: Uuid,
    pub workspace_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl FileRecordUpdate {
    /// Update carrying only a new storage path.
    pub fn storage_path(path: impl Into<String>) -> Self {
        FileRecordUpdate {
            storage_path: Some(path.into()),
            ..Default::default()
        }
    }
}
