use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::file::FileRecord;

/// A user-chosen local file: raw bytes plus the metadata captured at
/// selection time. Owned exclusively by the upload session until committed
/// or discarded.
#[derive(Debug, Clone)]
pub struct LocalFile {
    pub original_filename: String,
    pub content_type: String,
    pub size: i64,
    pub last_modified_ms: i64,
    pub data: Bytes,
}

impl LocalFile {
    /// Stable selection identifier derived from the original filename,
    /// modification time, and byte size. Re-adding the same unchanged file
    /// yields the same identifier.
    pub fn selection_id(&self) -> String {
        format!(
            "{}-{}-{}",
            self.original_filename, self.last_modified_ms, self.size
        )
    }
}

/// Resolved per-file commit action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadAction {
    Upload,
    Overwrite,
    Skip,
}

/// One instruction to the commit executor.
///
/// `existing_file_id` is mandatory when `action` is [`UploadAction::Overwrite`]
/// and must reference a record owned by `owner_id`.
#[derive(Debug, Clone)]
pub struct UploadOperation {
    pub local_file: LocalFile,
    pub name: String,
    pub description: String,
    pub action: UploadAction,
    pub owner_id: Uuid,
    pub workspace_id: Uuid,
    pub existing_file_id: Option<Uuid>,
}

/// What happened to a single operation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CommitOutcome {
    Succeeded { file: FileRecord },
    Skipped,
    Failed { error: String },
}

/// Per-operation result, carrying the original filename for correlation.
#[derive(Debug, Clone, Serialize)]
pub struct CommitResult {
    pub original_filename: String,
    pub outcome: CommitOutcome,
}

impl CommitResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, CommitOutcome::Succeeded { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, CommitOutcome::Skipped)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, CommitOutcome::Failed { .. })
    }
}

/// Aggregate outcome of a commit batch, in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommitSummary {
    pub results: Vec<CommitResult>,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl CommitSummary {
    pub fn from_results(results: Vec<CommitResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        let skipped = results.iter().filter(|r| r.is_skipped()).count();
        let failed = results.iter().filter(|r| r.is_failure()).count();
        CommitSummary {
            results,
            succeeded,
            skipped,
            failed,
        }
    }

    /// Every attempted operation succeeded (skips do not count as attempts).
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    /// Every attempted operation failed.
    pub fn all_failed(&self) -> bool {
        self.failed > 0 && self.succeeded == 0
    }

    /// Some attempted operations succeeded and some failed.
    pub fn is_partial(&self) -> bool {
        self.failed > 0 && self.succeeded > 0
    }
}
