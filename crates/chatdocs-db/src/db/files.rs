use async_trait::async_trait;
use chatdocs_core::models::{FileRecord, FileRecordUpdate, FileWorkspace, NewFileRecord};
use chatdocs_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Metadata store operations the upload workflow depends on.
///
/// Filename uniqueness is scoped per (owner, workspace): both the advisory
/// bulk existence query and the authoritative single-name lookup apply the
/// same scope, so the client-side pre-check and the commit-time check agree
/// on what counts as a collision.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Which of the candidate names already exist in the given scope.
    /// One bulk query per invocation; candidates must be normalized names.
    async fn find_existing_names(
        &self,
        owner_id: Uuid,
        workspace_id: Uuid,
        names: &[String],
    ) -> Result<Vec<String>, AppError>;

    /// Authoritative lookup of a single normalized name in scope.
    async fn find_by_name(
        &self,
        owner_id: Uuid,
        workspace_id: Uuid,
        name: &str,
    ) -> Result<Option<FileRecord>, AppError>;

    async fn get_file(&self, id: Uuid) -> Result<Option<FileRecord>, AppError>;

    async fn insert_file(&self, new_file: NewFileRecord) -> Result<FileRecord, AppError>;

    async fn update_file(
        &self,
        id: Uuid,
        update: FileRecordUpdate,
    ) -> Result<FileRecord, AppError>;

    /// Delete a file row. Returns whether a row was deleted; workspace
    /// associations cascade.
    async fn delete_file(&self, id: Uuid) -> Result<bool, AppError>;

    async fn link_workspace(
        &self,
        owner_id: Uuid,
        file_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<FileWorkspace, AppError>;

    async fn unlink_workspace(&self, file_id: Uuid, workspace_id: Uuid)
        -> Result<bool, AppError>;

    async fn list_by_workspace(
        &self,
        owner_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<Vec<FileRecord>, AppError>;
}

// Qualified with the `f` alias so joined queries stay unambiguous; the
// unqualified variant is for RETURNING clauses.
const FILE_COLUMNS: &str = "f.id, f.owner_id, f.name, f.description, f.content_type, f.size, f.storage_path, f.tokens, f.created_at, f.updated_at";
const FILE_RETURNING: &str =
    "id, owner_id, name, description, content_type, size, storage_path, tokens, created_at, updated_at";

/// Postgres-backed file metadata repository
#[derive(Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileStore for FileRepository {
    #[tracing::instrument(skip(self, names), fields(db.table = "files", db.operation = "select", candidate_count = names.len()))]
    async fn find_existing_names(
        &self,
        owner_id: Uuid,
        workspace_id: Uuid,
        names: &[String],
    ) -> Result<Vec<String>, AppError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let existing = sqlx::query_scalar::<Postgres, String>(
            r#"
            SELECT f.name
            FROM files f
            JOIN file_workspaces fw ON fw.file_id = f.id
            WHERE f.owner_id = $1 AND fw.workspace_id = $2 AND f.name = ANY($3)
            "#,
        )
        .bind(owner_id)
        .bind(workspace_id)
        .bind(names)
        .fetch_all(&self.pool)
        .await?;

        Ok(existing)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "select"))]
    async fn find_by_name(
        &self,
        owner_id: Uuid,
        workspace_id: Uuid,
        name: &str,
    ) -> Result<Option<FileRecord>, AppError> {
        let file = sqlx::query_as::<Postgres, FileRecord>(&format!(
            r#"
            SELECT {FILE_COLUMNS}
            FROM files f
            JOIN file_workspaces fw ON fw.file_id = f.id
            WHERE f.owner_id = $1 AND fw.workspace_id = $2 AND f.name = $3
            "#
        ))
        .bind(owner_id)
        .bind(workspace_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "select", db.record_id = %id))]
    async fn get_file(&self, id: Uuid) -> Result<Option<FileRecord>, AppError> {
        let file = sqlx::query_as::<Postgres, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files f WHERE f.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    #[tracing::instrument(skip(self, new_file), fields(db.table = "files", db.operation = "insert", file_name = %new_file.name))]
    async fn insert_file(&self, new_file: NewFileRecord) -> Result<FileRecord, AppError> {
        let file = sqlx::query_as::<Postgres, FileRecord>(&format!(
            r#"
            INSERT INTO files (owner_id, name, description, content_type, size, storage_path, tokens)
            VALUES ($1, $2, $3, $4, $5, '', 0)
            RETURNING {FILE_RETURNING}
            "#
        ))
        .bind(new_file.owner_id)
        .bind(&new_file.name)
        .bind(&new_file.description)
        .bind(&new_file.content_type)
        .bind(new_file.size)
        .fetch_one(&self.pool)
        .await?;

        Ok(file)
    }

    #[tracing::instrument(skip(self, update), fields(db.table = "files", db.operation = "update", db.record_id = %id))]
    async fn update_file(
        &self,
        id: Uuid,
        update: FileRecordUpdate,
    ) -> Result<FileRecord, AppError> {
        let file = sqlx::query_as::<Postgres, FileRecord>(&format!(
            r#"
            UPDATE files SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                content_type = COALESCE($4, content_type),
                size = COALESCE($5, size),
                storage_path = COALESCE($6, storage_path),
                tokens = COALESCE($7, tokens),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {FILE_RETURNING}
            "#
        ))
        .bind(id)
        .bind(update.name)
        .bind(update.description)
        .bind(update.content_type)
        .bind(update.size)
        .bind(update.storage_path)
        .bind(update.tokens)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("File {} not found", id)))?;

        Ok(file)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "delete", db.record_id = %id))]
    async fn delete_file(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "file_workspaces", db.operation = "insert"))]
    async fn link_workspace(
        &self,
        owner_id: Uuid,
        file_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<FileWorkspace, AppError> {
        let association = sqlx::query_as::<Postgres, FileWorkspace>(
            r#"
            INSERT INTO file_workspaces (owner_id, file_id, workspace_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (file_id, workspace_id) DO UPDATE SET owner_id = EXCLUDED.owner_id
            RETURNING owner_id, file_id, workspace_id, created_at
            "#,
        )
        .bind(owner_id)
        .bind(file_id)
        .bind(workspace_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(association)
    }

    #[tracing::instrument(skip(self), fields(db.table = "file_workspaces", db.operation = "delete"))]
    async fn unlink_workspace(
        &self,
        file_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM file_workspaces WHERE file_id = $1 AND workspace_id = $2")
                .bind(file_id)
                .bind(workspace_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "select"))]
    async fn list_by_workspace(
        &self,
        owner_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<Vec<FileRecord>, AppError> {
        let files = sqlx::query_as::<Postgres, FileRecord>(&format!(
            r#"
            SELECT {FILE_COLUMNS}
            FROM files f
            JOIN file_workspaces fw ON fw.file_id = f.id
            WHERE f.owner_id = $1 AND fw.workspace_id = $2
            ORDER BY f.name ASC
            "#
        ))
        .bind(owner_id)
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }
}
