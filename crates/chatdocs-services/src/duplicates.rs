//! Advisory duplicate detection for pending upload candidates.
//!
//! The result is advisory only: other sessions may commit between the check
//! and this session's commit, so the commit executor re-checks
//! authoritatively before writing.

use std::collections::HashSet;
use std::sync::Arc;

use chatdocs_core::AppError;
use chatdocs_db::FileStore;
use uuid::Uuid;

/// Checks candidate normalized filenames against the metadata store,
/// scoped to one owner and workspace.
#[derive(Clone)]
pub struct DuplicateChecker {
    store: Arc<dyn FileStore>,
    owner_id: Uuid,
    workspace_id: Uuid,
}

impl DuplicateChecker {
    pub fn new(store: Arc<dyn FileStore>, owner_id: Uuid, workspace_id: Uuid) -> Self {
        Self {
            store,
            owner_id,
            workspace_id,
        }
    }

    /// Which of the candidate names already exist in scope.
    ///
    /// Candidates must already be normalized names. All candidates go out in
    /// one bulk query; an empty input returns an empty set without touching
    /// the store. Absence of a name in the result means it is safe to upload
    /// as unique.
    #[tracing::instrument(skip(self, candidates), fields(candidate_count = candidates.len()))]
    pub async fn check(&self, candidates: &[String]) -> Result<HashSet<String>, AppError> {
        if candidates.is_empty() {
            return Ok(HashSet::new());
        }

        let mut unique: Vec<String> = candidates.to_vec();
        unique.sort();
        unique.dedup();

        let existing = self
            .store
            .find_existing_names(self.owner_id, self.workspace_id, &unique)
            .await?;

        tracing::debug!(
            checked = unique.len(),
            existing = existing.len(),
            "Duplicate check completed"
        );

        Ok(existing.into_iter().collect())
    }
}
