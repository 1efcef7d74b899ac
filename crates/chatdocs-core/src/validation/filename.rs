//! Storage-safe filename normalization.
//!
//! Both the advisory client-side duplicate check and the authoritative
//! commit-time check compare candidate names, so normalization must be
//! deterministic: the same display name and extension always produce the
//! same storage name.

use crate::constants::{DEFAULT_DISPLAY_NAME, MAX_FILENAME_LENGTH};

/// Map a name fragment onto the storage-safe charset `[a-z0-9.]`,
/// replacing everything else with `_`.
fn sanitize(fragment: &str) -> String {
    fragment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Normalize a user-supplied display name plus the original file's extension
/// into a storage-safe filename.
///
/// The extension is always the original file's, appended explicitly; a dot
/// the user typed into the display name is not trusted as an extension
/// boundary. The result never exceeds [`MAX_FILENAME_LENGTH`] bytes.
pub fn normalize_filename(display_name: &str, extension: &str) -> String {
    let sanitized = sanitize(display_name);
    let extension = sanitize(extension);

    // Split at the last '.' to drop whatever the user typed as an extension.
    let base = match sanitized.rfind('.') {
        Some(idx) => &sanitized[..idx],
        None => sanitized.as_str(),
    };

    if extension.is_empty() {
        let mut name = base.to_string();
        name.truncate(MAX_FILENAME_LENGTH);
        return name;
    }

    let max_base_len = MAX_FILENAME_LENGTH.saturating_sub(extension.len() + 1);
    let mut name = String::with_capacity(MAX_FILENAME_LENGTH);
    name.push_str(&base[..base.len().min(max_base_len)]);
    name.push('.');
    name.push_str(&extension);
    // Degenerate extensions longer than the cap still must respect the bound.
    name.truncate(MAX_FILENAME_LENGTH);
    name
}

/// The storage name a file would commit under, from its user-editable
/// display name and original filename.
///
/// Falls back to the original filename's stem when the display name is
/// blank, and to [`DEFAULT_DISPLAY_NAME`] when even the normalized result
/// would be empty (e.g. a bare dotfile). The advisory pre-check and the
/// authoritative commit-time check both go through here, so the two always
/// compare the same candidate.
pub fn candidate_storage_name(display_name: &str, original_filename: &str) -> String {
    let trimmed = display_name.trim();
    let display = if !trimmed.is_empty() {
        trimmed
    } else {
        let stem = display_name_from_filename(original_filename);
        if stem.trim().is_empty() {
            DEFAULT_DISPLAY_NAME
        } else {
            stem
        }
    };

    let extension = extension_of(original_filename);
    let normalized = normalize_filename(display, extension);
    if normalized.is_empty() {
        normalize_filename(DEFAULT_DISPLAY_NAME, extension)
    } else {
        normalized
    }
}

/// The extension of a filename: everything after the last `.`, or empty when
/// there is none (a leading dot, as in `.env`, does not start an extension).
pub fn extension_of(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => &filename[idx + 1..],
        _ => "",
    }
}

/// The default display name for a selected file: the original filename minus
/// its extension.
pub fn display_name_from_filename(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => &filename[..idx],
        _ => filename,
    }
}
