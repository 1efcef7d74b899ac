//! Validation modules

pub mod filename;

pub use filename::{
    candidate_storage_name, display_name_from_filename, extension_of, normalize_filename,
};
