//! Test helpers: in-memory fakes for the metadata store, object store, and
//! search index, plus wiring for the commit executor and upload sessions.

// Each test binary uses its own subset of these helpers.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use chatdocs_core::models::{
    FileRecord, FileRecordUpdate, FileWorkspace, LocalFile, NewFileRecord,
};
use chatdocs_core::AppError;
use chatdocs_db::FileStore;
use chatdocs_services::index::SearchIndex;
use chatdocs_services::{FileCommitService, UploadSession};
use chatdocs_storage::{generate_storage_key, Storage, StorageBackend, StorageError, StorageResult};

pub const FILE_SIZE_LIMIT: i64 = 10_000_000;

/// In-memory metadata store with failure injection and call counters.
#[derive(Default)]
pub struct MemoryFileStore {
    files: Mutex<Vec<FileRecord>>,
    associations: Mutex<Vec<FileWorkspace>>,
    pub name_query_calls: AtomicUsize,
    pub insert_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    fail_name_queries: AtomicBool,
}

impl MemoryFileStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every bulk/single name query fail until cleared.
    pub fn fail_name_queries(&self, fail: bool) {
        self.fail_name_queries.store(fail, Ordering::SeqCst);
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    pub fn file_named(&self, name: &str) -> Option<FileRecord> {
        self.files
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.name == name)
            .cloned()
    }

    pub fn is_linked(&self, file_id: Uuid, workspace_id: Uuid) -> bool {
        self.associations
            .lock()
            .unwrap()
            .iter()
            .any(|a| a.file_id == file_id && a.workspace_id == workspace_id)
    }

    fn in_scope(&self, owner_id: Uuid, workspace_id: Uuid, file: &FileRecord) -> bool {
        file.owner_id == owner_id && self.is_linked(file.id, workspace_id)
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn find_existing_names(
        &self,
        owner_id: Uuid,
        workspace_id: Uuid,
        names: &[String],
    ) -> Result<Vec<String>, AppError> {
        self.name_query_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_name_queries.load(Ordering::SeqCst) {
            return Err(AppError::Internal("simulated query failure".to_string()));
        }
        let files = self.files.lock().unwrap();
        Ok(files
            .iter()
            .filter(|f| self.in_scope(owner_id, workspace_id, f) && names.contains(&f.name))
            .map(|f| f.name.clone())
            .collect())
    }

    async fn find_by_name(
        &self,
        owner_id: Uuid,
        workspace_id: Uuid,
        name: &str,
    ) -> Result<Option<FileRecord>, AppError> {
        self.name_query_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_name_queries.load(Ordering::SeqCst) {
            return Err(AppError::Internal("simulated query failure".to_string()));
        }
        let files = self.files.lock().unwrap();
        Ok(files
            .iter()
            .find(|f| self.in_scope(owner_id, workspace_id, f) && f.name == name)
            .cloned())
    }

    async fn get_file(&self, id: Uuid) -> Result<Option<FileRecord>, AppError> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.id == id)
            .cloned())
    }

    async fn insert_file(&self, new_file: NewFileRecord) -> Result<FileRecord, AppError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let record = FileRecord {
            id: Uuid::new_v4(),
            owner_id: new_file.owner_id,
            name: new_file.name,
            description: new_file.description,
            content_type: new_file.content_type,
            size: new_file.size,
            storage_path: String::new(),
            tokens: 0,
            created_at: now,
            updated_at: now,
        };
        self.files.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update_file(
        &self,
        id: Uuid,
        update: FileRecordUpdate,
    ) -> Result<FileRecord, AppError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let mut files = self.files.lock().unwrap();
        let file = files
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| AppError::NotFound(format!("File {} not found", id)))?;
        if let Some(name) = update.name {
            file.name = name;
        }
        if let Some(description) = update.description {
            file.description = description;
        }
        if let Some(content_type) = update.content_type {
            file.content_type = content_type;
        }
        if let Some(size) = update.size {
            file.size = size;
        }
        if let Some(storage_path) = update.storage_path {
            file.storage_path = storage_path;
        }
        if let Some(tokens) = update.tokens {
            file.tokens = tokens;
        }
        file.updated_at = Utc::now();
        Ok(file.clone())
    }

    async fn delete_file(&self, id: Uuid) -> Result<bool, AppError> {
        let mut files = self.files.lock().unwrap();
        let before = files.len();
        files.retain(|f| f.id != id);
        let deleted = files.len() < before;
        if deleted {
            self.associations.lock().unwrap().retain(|a| a.file_id != id);
        }
        Ok(deleted)
    }

    async fn link_workspace(
        &self,
        owner_id: Uuid,
        file_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<FileWorkspace, AppError> {
        let association = FileWorkspace {
            owner_id,
            file_id,
            workspace_id,
            created_at: Utc::now(),
        };
        self.associations.lock().unwrap().push(association.clone());
        Ok(association)
    }

    async fn unlink_workspace(
        &self,
        file_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<bool, AppError> {
        let mut associations = self.associations.lock().unwrap();
        let before = associations.len();
        associations.retain(|a| !(a.file_id == file_id && a.workspace_id == workspace_id));
        Ok(associations.len() < before)
    }

    async fn list_by_workspace(
        &self,
        owner_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<Vec<FileRecord>, AppError> {
        let files = self.files.lock().unwrap();
        let mut result: Vec<FileRecord> = files
            .iter()
            .filter(|f| self.in_scope(owner_id, workspace_id, f))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }
}

/// In-memory object store keyed exactly like the real backends.
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, Bytes>>,
    pub upload_calls: AtomicUsize,
    fail_content: Mutex<Option<Bytes>>,
}

impl MemoryStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Force uploads of this exact payload to fail (for mid-batch failures).
    pub fn fail_when_content_is(&self, content: &'static [u8]) {
        *self.fail_content.lock().unwrap() = Some(Bytes::from_static(content));
    }

    pub fn object(&self, key: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn upload(
        &self,
        owner_id: Uuid,
        file_id: Uuid,
        _content_type: &str,
        data: Bytes,
    ) -> StorageResult<String> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_content.lock().unwrap().as_ref() == Some(&data) {
            return Err(StorageError::UploadFailed(
                "simulated storage failure".to_string(),
            ));
        }
        let key = generate_storage_key(owner_id, file_id);
        self.objects.lock().unwrap().insert(key.clone(), data);
        Ok(key)
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(storage_key)
            .map(|b| b.to_vec())
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.objects.lock().unwrap().remove(storage_key);
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.objects.lock().unwrap().contains_key(storage_key))
    }

    async fn get_presigned_url(
        &self,
        storage_key: &str,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        Ok(format!("memory://{}", storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// Records notifications instead of delivering them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexEvent {
    Upserted(Uuid),
    Deleted(Uuid),
}

#[derive(Default)]
pub struct RecordingIndex {
    events: Mutex<Vec<IndexEvent>>,
}

impl RecordingIndex {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<IndexEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn upserted_ids(&self) -> HashSet<Uuid> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                IndexEvent::Upserted(id) => Some(id),
                IndexEvent::Deleted(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl SearchIndex for RecordingIndex {
    async fn notify_upserted(&self, file_id: Uuid) {
        self.events
            .lock()
            .unwrap()
            .push(IndexEvent::Upserted(file_id));
    }

    async fn notify_deleted(&self, file_id: Uuid) {
        self.events
            .lock()
            .unwrap()
            .push(IndexEvent::Deleted(file_id));
    }
}

/// Everything a workflow test needs, wired against shared fakes.
pub struct TestHarness {
    pub owner_id: Uuid,
    pub workspace_id: Uuid,
    pub store: Arc<MemoryFileStore>,
    pub storage: Arc<MemoryStorage>,
    pub index: Arc<RecordingIndex>,
    pub committer: Arc<FileCommitService>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_size_limit(FILE_SIZE_LIMIT)
    }

    pub fn with_size_limit(limit: i64) -> Self {
        let store = MemoryFileStore::new();
        let storage = MemoryStorage::new();
        let index = RecordingIndex::new();
        let committer = Arc::new(FileCommitService::new(
            store.clone(),
            storage.clone(),
            index.clone(),
            limit,
        ));
        TestHarness {
            owner_id: Uuid::new_v4(),
            workspace_id: Uuid::new_v4(),
            store,
            storage,
            index,
            committer,
        }
    }

    pub fn session(&self) -> UploadSession {
        UploadSession::open(
            self.owner_id,
            self.workspace_id,
            self.store.clone(),
            self.committer.clone(),
        )
    }

    /// Seed an already-committed file into the store, linked to the harness
    /// workspace.
    pub async fn seed_file(&self, name: &str) -> FileRecord {
        let record = self
            .store
            .insert_file(NewFileRecord {
                owner_id: self.owner_id,
                name: name.to_string(),
                description: String::new(),
                content_type: "text/plain".to_string(),
                size: 1,
            })
            .await
            .unwrap();
        self.store
            .link_workspace(self.owner_id, record.id, self.workspace_id)
            .await
            .unwrap();
        record
    }
}

/// A local file as the UI would hand it over.
pub fn local_file(original_filename: &str, content: &'static [u8]) -> LocalFile {
    local_file_modified(original_filename, content, 1_700_000_000_000)
}

pub fn local_file_modified(
    original_filename: &str,
    content: &'static [u8],
    last_modified_ms: i64,
) -> LocalFile {
    LocalFile {
        original_filename: original_filename.to_string(),
        content_type: "text/plain".to_string(),
        size: content.len() as i64,
        last_modified_ms,
        data: Bytes::from_static(content),
    }
}
