//! Upload session: the client-side state machine for one open
//! file-creation dialog.
//!
//! The duplicate-check cycle is driven explicitly: every mutating method
//! ends by calling [`UploadSession::run_pending_checks`], which batches all
//! files awaiting a verdict into one bulk query. Nothing here depends on a
//! rendering framework's effect scheduling.

pub mod types;

use std::collections::HashSet;
use std::sync::Arc;

use chatdocs_core::models::{CommitSummary, LocalFile, UploadAction, UploadOperation};
use chatdocs_core::{AppError, ErrorMetadata};
use chatdocs_db::FileStore;
use uuid::Uuid;

use crate::commit::FileCommitService;
use crate::duplicates::DuplicateChecker;

pub use types::{DuplicateResolution, FileStatus, ResolvedAction, SelectedFile};

/// One upload session. Holds transient client-side state until committed or
/// discarded; all durable effects go through the commit executor.
pub struct UploadSession {
    owner_id: Uuid,
    workspace_id: Uuid,
    store: Arc<dyn FileStore>,
    checker: DuplicateChecker,
    committer: Arc<FileCommitService>,
    files: Vec<SelectedFile>,
    checking: bool,
    last_summary: Option<CommitSummary>,
    closed: bool,
}

impl UploadSession {
    /// Open a session for one owner and workspace.
    pub fn open(
        owner_id: Uuid,
        workspace_id: Uuid,
        store: Arc<dyn FileStore>,
        committer: Arc<FileCommitService>,
    ) -> Self {
        let checker = DuplicateChecker::new(Arc::clone(&store), owner_id, workspace_id);
        UploadSession {
            owner_id,
            workspace_id,
            store,
            checker,
            committer,
            files: Vec::new(),
            checking: false,
            last_summary: None,
            closed: false,
        }
    }

    /// Append newly chosen local files to the session.
    ///
    /// Each gets a fresh entry with status `New`, default action `Upload`,
    /// and a display name defaulting to the original filename minus its
    /// extension. Re-adding an unchanged file (same id) is ignored.
    pub async fn select_files(&mut self, raw_files: Vec<LocalFile>) -> Result<(), AppError> {
        self.ensure_open()?;

        for local_file in raw_files {
            let id = local_file.selection_id();
            if self.files.iter().any(|f| f.id == id) {
                tracing::debug!(file = %local_file.original_filename, "File already selected, ignoring");
                continue;
            }
            self.files.push(SelectedFile::from_local(local_file));
        }

        self.run_pending_checks().await;
        Ok(())
    }

    /// Change a file's display name. The new name is a new candidate, so the
    /// file re-enters the duplicate-check cycle.
    pub async fn set_name(&mut self, file_id: &str, name: &str) -> Result<(), AppError> {
        self.ensure_open()?;

        let file = self.file_mut(file_id)?;
        file.display_name = name.to_string();
        file.status = FileStatus::New;
        file.action = ResolvedAction::Upload;
        file.duplicate_of = None;
        file.api_error = None;

        self.run_pending_checks().await;
        Ok(())
    }

    pub fn set_description(&mut self, file_id: &str, text: &str) -> Result<(), AppError> {
        self.ensure_open()?;
        let file = self.file_mut(file_id)?;
        file.description = text.to_string();
        Ok(())
    }

    /// Resolve a detected duplicate. Only valid while the file's status is
    /// `Duplicate`.
    pub async fn resolve_duplicate(
        &mut self,
        file_id: &str,
        resolution: DuplicateResolution,
    ) -> Result<(), AppError> {
        self.ensure_open()?;

        let status = self.file(file_id)?.status;
        if status != FileStatus::Duplicate {
            return Err(AppError::InvalidInput(format!(
                "File '{}' has no duplicate conflict to resolve",
                file_id
            )));
        }

        match resolution {
            DuplicateResolution::Skip => {
                let file = self.file_mut(file_id)?;
                file.action = ResolvedAction::Skip;
                file.status = FileStatus::Unique;
                Ok(())
            }
            DuplicateResolution::Overwrite => {
                // The conflicting record's id must travel with the commit, so
                // look it up under the same scope the check used.
                let candidate = self.file(file_id)?.candidate_name();
                let existing = self
                    .store
                    .find_by_name(self.owner_id, self.workspace_id, &candidate)
                    .await?;

                let needs_recheck = {
                    let file = self.file_mut(file_id)?;
                    match existing {
                        Some(record) => {
                            file.action = ResolvedAction::Overwrite;
                            file.status = FileStatus::Unique;
                            file.duplicate_of = Some(record.id);
                            false
                        }
                        None => {
                            // The conflict vanished in the meantime; the name
                            // may be free now. Back through the check cycle.
                            file.status = FileStatus::New;
                            file.duplicate_of = None;
                            file.api_error = None;
                            true
                        }
                    }
                };

                if needs_recheck {
                    self.run_pending_checks().await;
                }
                Ok(())
            }
            DuplicateResolution::Rename { new_name } => {
                let file = self.file_mut(file_id)?;
                file.display_name = new_name;
                file.status = FileStatus::RenamingChecking;
                file.action = ResolvedAction::Upload;
                file.duplicate_of = None;
                file.api_error = None;

                self.run_pending_checks().await;
                Ok(())
            }
        }
    }

    /// Remove a file from the session. Permitted at any status; has no side
    /// effects beyond removing it from the set.
    pub fn remove_file(&mut self, file_id: &str) -> Result<(), AppError> {
        self.ensure_open()?;
        let before = self.files.len();
        self.files.retain(|f| f.id != file_id);
        if self.files.len() == before {
            return Err(AppError::NotFound(format!(
                "No selected file with id '{}'",
                file_id
            )));
        }
        Ok(())
    }

    /// Whether the commit action is currently allowed: at least one file is
    /// selected, every file is resolved, and at least one file remains after
    /// excluding skips.
    pub fn can_commit(&self) -> bool {
        if self.closed || self.files.is_empty() {
            return false;
        }
        let all_resolved = self.files.iter().all(|f| f.status == FileStatus::Unique);
        let any_committable = self.files.iter().any(|f| f.action != ResolvedAction::Skip);
        all_resolved && any_committable
    }

    /// Project every non-skipped file into an operation and hand the whole
    /// batch to the commit executor. Files that commit successfully leave the
    /// session; failures stay selected so the user can retry.
    pub async fn commit(&mut self) -> Result<CommitSummary, AppError> {
        self.ensure_open()?;
        if !self.can_commit() {
            return Err(AppError::InvalidInput(
                "Upload session is not ready to commit".to_string(),
            ));
        }

        let committed: Vec<(String, UploadOperation)> = self
            .files
            .iter()
            .filter(|f| f.action != ResolvedAction::Skip)
            .map(|f| (f.id.clone(), self.to_operation(f)))
            .collect();

        let operations = committed.iter().map(|(_, op)| op.clone()).collect();
        let summary = self.committer.commit(operations).await;

        // Results preserve input order, so pair them back up by position.
        let succeeded: HashSet<&str> = committed
            .iter()
            .zip(summary.results.iter())
            .filter(|(_, result)| result.is_success())
            .map(|((id, _), _)| id.as_str())
            .collect();
        self.files.retain(|f| !succeeded.contains(f.id.as_str()));

        self.last_summary = Some(summary.clone());
        Ok(summary)
    }

    /// Re-run the duplicate check for files whose last check failed.
    pub async fn retry_checks(&mut self) -> Result<(), AppError> {
        self.ensure_open()?;
        self.run_pending_checks().await;
        Ok(())
    }

    /// Discard all session state. In-flight check results, if any, are
    /// dropped with it.
    pub fn close(&mut self) {
        self.files.clear();
        self.last_summary = None;
        self.closed = true;
        tracing::debug!("Upload session closed, selection discarded");
    }

    /// Ordered snapshot of the selected files, for rendering.
    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    /// Whether a duplicate check is in flight.
    pub fn is_checking(&self) -> bool {
        self.checking || self.files.iter().any(|f| f.status == FileStatus::Checking)
    }

    pub fn last_summary(&self) -> Option<&CommitSummary> {
        self.last_summary.as_ref()
    }

    /// The reactive check driver: batch every file awaiting a verdict into
    /// one bulk query and apply the results.
    ///
    /// A failed check reverts the whole batch to `New` with the error
    /// recorded per file; ambiguity never resolves to `Unique` or
    /// `Duplicate`. Results are only applied to files still in `Checking`,
    /// so anything mutated mid-flight keeps its newer state.
    async fn run_pending_checks(&mut self) {
        // Rename intents re-enter the cycle as fresh candidates.
        for file in &mut self.files {
            if file.status == FileStatus::RenamingChecking {
                file.status = FileStatus::New;
            }
        }

        let batch: Vec<String> = self
            .files
            .iter()
            .filter(|f| f.is_pending_check())
            .map(|f| f.id.clone())
            .collect();
        if batch.is_empty() {
            return;
        }

        let mut candidates = Vec::with_capacity(batch.len());
        for file in &mut self.files {
            if file.is_pending_check() {
                file.status = FileStatus::Checking;
                candidates.push(file.candidate_name());
            }
        }

        self.checking = true;
        let result = self.checker.check(&candidates).await;
        self.checking = false;

        match result {
            Ok(existing) => {
                for id in &batch {
                    let Some(file) = self.files.iter_mut().find(|f| &f.id == id) else {
                        continue;
                    };
                    if file.status != FileStatus::Checking {
                        continue;
                    }
                    file.api_error = None;
                    if existing.contains(&file.candidate_name()) {
                        file.status = FileStatus::Duplicate;
                    } else {
                        file.status = FileStatus::Unique;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    error = %e.detailed_message(),
                    batch_size = batch.len(),
                    "Duplicate check failed, batch reverts to pending"
                );
                let message = e.client_message();
                for id in &batch {
                    let Some(file) = self.files.iter_mut().find(|f| &f.id == id) else {
                        continue;
                    };
                    if file.status != FileStatus::Checking {
                        continue;
                    }
                    file.status = FileStatus::New;
                    file.api_error = Some(message.clone());
                }
            }
        }
    }

    fn to_operation(&self, file: &SelectedFile) -> UploadOperation {
        UploadOperation {
            local_file: file.local_file.clone(),
            name: file.display_name.clone(),
            description: file.description.clone(),
            action: match file.action {
                ResolvedAction::Upload => UploadAction::Upload,
                ResolvedAction::Overwrite => UploadAction::Overwrite,
                ResolvedAction::Skip => UploadAction::Skip,
            },
            owner_id: self.owner_id,
            workspace_id: self.workspace_id,
            existing_file_id: file.duplicate_of,
        }
    }

    fn ensure_open(&self) -> Result<(), AppError> {
        if self.closed {
            return Err(AppError::InvalidInput(
                "Upload session is closed".to_string(),
            ));
        }
        Ok(())
    }

    fn file(&self, file_id: &str) -> Result<&SelectedFile, AppError> {
        self.files
            .iter()
            .find(|f| f.id == file_id)
            .ok_or_else(|| AppError::NotFound(format!("No selected file with id '{}'", file_id)))
    }

    fn file_mut(&mut self, file_id: &str) -> Result<&mut SelectedFile, AppError> {
        self.files
            .iter_mut()
            .find(|f| f.id == file_id)
            .ok_or_else(|| AppError::NotFound(format!("No selected file with id '{}'", file_id)))
    }
}
