use crate::services::error::UploadError;
use std::path::Path;

/// Extension of `file_name` including the leading dot, or "" when it has none.
///
/// Follows `Path::extension`, so dot-files like `.env` have no extension.
pub fn file_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Checks the lower-cased extension of `file_name` against an allow-list.
///
/// Entries are compared verbatim, so they must already be lower case with a
/// leading dot (".jpg"). An empty list never matches.
pub fn is_allowed_extension<S: AsRef<str>>(allowed: &[S], file_name: &str) -> bool {
    let ext = file_extension(file_name).to_lowercase();

    allowed.iter().any(|a| a.as_ref() == ext)
}

/// Rejects names that would escape the upload directory once joined onto it.
pub fn validate_file_name(file_name: &str) -> Result<(), UploadError> {
    let reason = if file_name.is_empty() {
        Some("file name cannot be empty")
    } else if file_name == "." || file_name == ".." {
        Some("file name cannot be a relative directory")
    } else if file_name.contains('/') || file_name.contains('\\') {
        Some("file name cannot contain a path separator")
    } else if file_name.contains('\0') {
        Some("file name cannot contain NUL")
    } else {
        None
    };

    match reason {
        Some(reason) => {
            tracing::warn!("Rejected upload file name {:?}: {}", file_name, reason);
            Err(UploadError::InvalidFileName {
                name: file_name.to_string(),
                reason,
            })
        }
        None => Ok(()),
    }
}
