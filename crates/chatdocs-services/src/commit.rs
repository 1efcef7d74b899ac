//! Durable application of resolved upload operations.
//!
//! Operations are applied strictly sequentially so writes for one session
//! never race each other and a partial failure leaves a clean boundary
//! between completed and not-yet-attempted operations. One operation's
//! failure never aborts the batch; each gets its own result, in input order.

use std::sync::Arc;

use chatdocs_core::models::{
    CommitOutcome, CommitResult, CommitSummary, FileRecord, FileRecordUpdate, LocalFile,
    NewFileRecord, UploadAction, UploadOperation,
};
use chatdocs_core::validation::candidate_storage_name;
use chatdocs_core::{AppError, ErrorMetadata};
use chatdocs_db::FileStore;
use chatdocs_storage::Storage;

use crate::index::SearchIndex;

/// Executes resolved upload/overwrite/skip operations against the metadata
/// store and object store, with best-effort search-index notification.
#[derive(Clone)]
pub struct FileCommitService {
    store: Arc<dyn FileStore>,
    storage: Arc<dyn Storage>,
    index: Arc<dyn SearchIndex>,
    file_size_limit_bytes: i64,
}

impl FileCommitService {
    pub fn new(
        store: Arc<dyn FileStore>,
        storage: Arc<dyn Storage>,
        index: Arc<dyn SearchIndex>,
        file_size_limit_bytes: i64,
    ) -> Self {
        Self {
            store,
            storage,
            index,
            file_size_limit_bytes,
        }
    }

    /// Apply a batch of operations, one result per operation in input order.
    ///
    /// Operation N+1 does not begin until operation N's result is recorded.
    #[tracing::instrument(skip(self, operations), fields(operation_count = operations.len()))]
    pub async fn commit(&self, operations: Vec<UploadOperation>) -> CommitSummary {
        let mut results = Vec::with_capacity(operations.len());

        for op in operations {
            let original_filename = op.local_file.original_filename.clone();
            let outcome = match op.action {
                UploadAction::Skip => {
                    tracing::debug!(file = %original_filename, "Skipping file");
                    CommitOutcome::Skipped
                }
                UploadAction::Upload => match self.upload_one(&op).await {
                    Ok(file) => CommitOutcome::Succeeded { file },
                    Err(e) => {
                        tracing::error!(
                            file = %original_filename,
                            error = %e.detailed_message(),
                            "Failed to upload file"
                        );
                        CommitOutcome::Failed {
                            error: e.client_message(),
                        }
                    }
                },
                UploadAction::Overwrite => match self.overwrite_one(&op).await {
                    Ok(file) => CommitOutcome::Succeeded { file },
                    Err(e) => {
                        tracing::error!(
                            file = %original_filename,
                            error = %e.detailed_message(),
                            "Failed to overwrite file"
                        );
                        CommitOutcome::Failed {
                            error: e.client_message(),
                        }
                    }
                },
            };
            results.push(CommitResult {
                original_filename,
                outcome,
            });
        }

        let summary = CommitSummary::from_results(results);
        tracing::info!(
            succeeded = summary.succeeded,
            skipped = summary.skipped,
            failed = summary.failed,
            "Commit batch finished"
        );
        summary
    }

    async fn upload_one(&self, op: &UploadOperation) -> Result<FileRecord, AppError> {
        self.check_size(&op.local_file)?;

        let normalized = normalized_name_for(op);

        // Authoritative re-check: time has passed since the advisory check
        // and other sessions may have committed in the interim.
        if self
            .store
            .find_by_name(op.owner_id, op.workspace_id, &normalized)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateName { name: normalized });
        }

        let record = self
            .store
            .insert_file(NewFileRecord {
                owner_id: op.owner_id,
                name: normalized,
                description: op.description.clone(),
                content_type: op.local_file.content_type.clone(),
                size: op.local_file.size,
            })
            .await?;

        tracing::info!(
            file_id = %record.id,
            file_name = %record.name,
            size_bytes = record.size,
            "File record created, uploading content"
        );

        let storage_path = self
            .storage
            .upload(
                op.owner_id,
                record.id,
                &op.local_file.content_type,
                op.local_file.data.clone(),
            )
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload file content: {}", e)))?;

        let record = self
            .store
            .update_file(record.id, FileRecordUpdate::storage_path(storage_path))
            .await?;

        self.store
            .link_workspace(op.owner_id, record.id, op.workspace_id)
            .await?;

        self.index.notify_upserted(record.id).await;

        Ok(record)
    }

    async fn overwrite_one(&self, op: &UploadOperation) -> Result<FileRecord, AppError> {
        let existing_id = op.existing_file_id.ok_or_else(|| {
            AppError::MissingOverwriteTarget(format!(
                "An existing file id is required to overwrite '{}'",
                op.local_file.original_filename
            ))
        })?;

        self.check_size(&op.local_file)?;

        let existing = self
            .store
            .get_file(existing_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File {} not found", existing_id)))?;
        if existing.owner_id != op.owner_id {
            return Err(AppError::InvalidInput(
                "Overwrite target belongs to another owner".to_string(),
            ));
        }

        let normalized = normalized_name_for(op);

        // Metadata first, then the bytes.
        let mut updated = self
            .store
            .update_file(
                existing_id,
                FileRecordUpdate {
                    name: Some(normalized),
                    description: Some(op.description.clone()),
                    content_type: Some(op.local_file.content_type.clone()),
                    size: Some(op.local_file.size),
                    ..Default::default()
                },
            )
            .await?;

        // Same deterministic key as the original upload, so the storage path
        // is stable across overwrites.
        let storage_path = self
            .storage
            .upload(
                op.owner_id,
                existing_id,
                &op.local_file.content_type,
                op.local_file.data.clone(),
            )
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload file content: {}", e)))?;

        if updated.storage_path != storage_path {
            updated = self
                .store
                .update_file(existing_id, FileRecordUpdate::storage_path(storage_path))
                .await?;
        }

        self.index.notify_upserted(existing_id).await;

        Ok(updated)
    }

    /// Delete a file: index notification first (best-effort), then the
    /// object-store blob (best-effort, logged), then the metadata row, whose
    /// workspace associations cascade. Only the row delete is authoritative.
    #[tracing::instrument(skip(self, file), fields(file_id = %file.id, file_name = %file.name))]
    pub async fn delete_file(&self, file: &FileRecord) -> Result<(), AppError> {
        self.index.notify_deleted(file.id).await;

        if !file.storage_path.is_empty() {
            if let Err(e) = self.storage.delete(&file.storage_path).await {
                tracing::warn!(
                    file_id = %file.id,
                    storage_path = %file.storage_path,
                    error = %e,
                    "Failed to remove file content from storage, continuing with metadata delete"
                );
            }
        }

        let deleted = self.store.delete_file(file.id).await?;
        if !deleted {
            return Err(AppError::NotFound(format!("File {} not found", file.id)));
        }

        tracing::info!(file_id = %file.id, "File deleted");
        Ok(())
    }

    fn check_size(&self, local_file: &LocalFile) -> Result<(), AppError> {
        if local_file.size > self.file_size_limit_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "File must be less than {}MB",
                self.file_size_limit_bytes / 1_000_000
            )));
        }
        Ok(())
    }
}

/// The storage name an operation will commit under. Shared with the
/// session's advisory check so both compare the same candidate.
fn normalized_name_for(op: &UploadOperation) -> String {
    candidate_storage_name(&op.name, &op.local_file.original_filename)
}
