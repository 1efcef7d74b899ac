//! Session-local state for the file-selection dialog.

use chatdocs_core::models::LocalFile;
use chatdocs_core::validation::{candidate_storage_name, display_name_from_filename};
use serde::Serialize;
use uuid::Uuid;

/// Where a selected file stands in the duplicate-check cycle.
///
/// Valid transitions:
/// `New -> Checking -> {Unique, Duplicate}`;
/// `Duplicate -> RenamingChecking -> New` (rename re-enters the cycle with a
/// new candidate name); `Duplicate -> Unique` when the user resolves with
/// skip or overwrite; a failed check reverts `Checking`/`RenamingChecking`
/// to `New`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    New,
    Checking,
    Unique,
    Duplicate,
    RenamingChecking,
}

/// The user's (or default) resolution for a file once its duplicate verdict
/// is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedAction {
    Upload,
    Overwrite,
    Skip,
}

/// How the user resolves a detected duplicate.
#[derive(Debug, Clone)]
pub enum DuplicateResolution {
    /// Leave the existing file alone; exclude this one from the commit.
    Skip,
    /// Replace the existing file's content and metadata.
    Overwrite,
    /// Try again under a new display name.
    Rename { new_name: String },
}

/// One user-chosen local file awaiting processing.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    /// Stable identifier derived from (original filename, modification time,
    /// size); the correlation key across async steps.
    pub id: String,
    pub local_file: LocalFile,
    /// User-editable name (without extension), mutable until commit.
    pub display_name: String,
    /// Immutable, captured at selection time.
    pub original_filename: String,
    pub description: String,
    pub status: FileStatus,
    pub action: ResolvedAction,
    /// The conflicting record's id, carried forward for overwrite commits.
    pub duplicate_of: Option<Uuid>,
    /// Last transient error from a failed duplicate check, cleared on retry.
    pub api_error: Option<String>,
}

impl SelectedFile {
    pub fn from_local(local_file: LocalFile) -> Self {
        let id = local_file.selection_id();
        let original_filename = local_file.original_filename.clone();
        let display_name = display_name_from_filename(&original_filename).to_string();
        SelectedFile {
            id,
            local_file,
            display_name,
            original_filename,
            description: String::new(),
            status: FileStatus::New,
            action: ResolvedAction::Upload,
            duplicate_of: None,
            api_error: None,
        }
    }

    /// The normalized storage name this file would commit under right now.
    pub fn candidate_name(&self) -> String {
        candidate_storage_name(&self.display_name, &self.original_filename)
    }

    /// Whether the file is waiting to (re-)enter the duplicate check.
    pub fn is_pending_check(&self) -> bool {
        matches!(self.status, FileStatus::New | FileStatus::RenamingChecking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn local(name: &str) -> LocalFile {
        LocalFile {
            original_filename: name.to_string(),
            content_type: "text/plain".to_string(),
            size: 3,
            last_modified_ms: 42,
            data: Bytes::from_static(b"abc"),
        }
    }

    #[test]
    fn selection_defaults() {
        let file = SelectedFile::from_local(local("Quarterly Report.docx"));
        assert_eq!(file.display_name, "Quarterly Report");
        assert_eq!(file.original_filename, "Quarterly Report.docx");
        assert_eq!(file.status, FileStatus::New);
        assert_eq!(file.action, ResolvedAction::Upload);
        assert_eq!(file.candidate_name(), "quarterly_report.docx");
    }

    #[test]
    fn pending_statuses() {
        let mut file = SelectedFile::from_local(local("a.txt"));
        assert!(file.is_pending_check());
        file.status = FileStatus::RenamingChecking;
        assert!(file.is_pending_check());
        file.status = FileStatus::Checking;
        assert!(!file.is_pending_check());
        file.status = FileStatus::Unique;
        assert!(!file.is_pending_check());
    }
}
