//! Chatdocs Services Layer
//!
//! This crate is the **business service layer**: it hosts the upload session
//! state machine, the duplicate detector, the commit executor, and the
//! best-effort search-index bridge, and re-exports a unified API from the
//! db and storage crates so that the surrounding application depends on a
//! single service facade.

pub mod commit;
pub mod duplicates;
pub mod index;
pub mod session;
pub mod telemetry;

pub use commit::FileCommitService;
pub use duplicates::DuplicateChecker;
pub use index::{SearchIndex, SearchIndexConfig, SearchIndexService};
pub use session::{DuplicateResolution, FileStatus, ResolvedAction, SelectedFile, UploadSession};

pub use chatdocs_db::{FileRepository, FileStore};
pub use chatdocs_storage::{
    create_storage, Storage, StorageBackend, StorageError, StorageResult,
};
