//! Shared key generation for storage backends.
//!
//! Key format: `files/{owner_id}/{file_id}`. Keys are derived from
//! identifiers, never filenames, so renames and overwrites keep a stable
//! storage location.

use uuid::Uuid;

/// Generate the storage key for a file owned by the given owner.
pub fn generate_storage_key(owner_id: Uuid, file_id: Uuid) -> String {
    format!("files/{}/{}", owner_id, file_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_deterministic_and_identifier_based() {
        let owner = Uuid::new_v4();
        let file = Uuid::new_v4();
        let key = generate_storage_key(owner, file);
        assert_eq!(key, generate_storage_key(owner, file));
        assert_eq!(key, format!("files/{}/{}", owner, file));
    }
}
