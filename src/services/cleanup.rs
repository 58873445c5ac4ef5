use crate::services::error::UploadError;
use std::io::ErrorKind;
use std::path::Path;

/// Deletes `<upload_dir>/<file_name>`.
///
/// A file that is already gone is reported as `NotFound`, so a second call
/// after a successful removal is distinguishable from a real failure.
pub async fn remove_uploaded_file(upload_dir: &Path, file_name: &str) -> Result<(), UploadError> {
    let path = upload_dir.join(file_name);

    match tokio::fs::remove_file(&path).await {
        Ok(()) => {
            tracing::info!("Removed uploaded file {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Err(UploadError::NotFound { path }),
        Err(source) => Err(UploadError::Remove { path, source }),
    }
}
