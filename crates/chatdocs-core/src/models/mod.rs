//! Domain models

pub mod file;
pub mod upload;

pub use file::{FileRecord, FileRecordUpdate, FileWorkspace, NewFileRecord};
pub use upload::{
    CommitOutcome, CommitResult, CommitSummary, LocalFile, UploadAction, UploadOperation,
};
