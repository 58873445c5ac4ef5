use crate::models::ChunkUploadRequest;
use crate::services::error::UploadError;
use std::path::Path;
use tokio::fs::{DirBuilder, OpenOptions};
use tokio::io::{AsyncRead, AsyncWriteExt};

/// rwxrwxr-x
#[cfg(unix)]
const DIR_MODE: u32 = 0o775;
/// rw-r--r--
#[cfg(unix)]
const FILE_MODE: u32 = 0o644;

/// Creates the upload directory and any missing parents.
pub async fn ensure_upload_dir(dir: &Path) -> Result<(), UploadError> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(DIR_MODE);

    builder
        .create(dir)
        .await
        .map_err(|source| UploadError::DirectoryCreation {
            path: dir.to_path_buf(),
            source,
        })
}

/// Appends the request's chunk to `<upload_directory>/<original_filename>`.
///
/// Returns the number of bytes copied. A failed copy leaves whatever bytes
/// already reached the file in place; retrying the same chunk appends again.
pub async fn append_chunk<R>(request: &mut ChunkUploadRequest<R>) -> Result<u64, UploadError>
where
    R: AsyncRead + Unpin + Send,
{
    ensure_upload_dir(&request.upload_directory).await?;

    let path = request.destination();

    let mut options = OpenOptions::new();
    options.append(true).create(true);
    #[cfg(unix)]
    options.mode(FILE_MODE);

    let mut file = options
        .open(&path)
        .await
        .map_err(|source| UploadError::FileOpen {
            path: path.clone(),
            source,
        })?;

    let written = tokio::io::copy(&mut request.chunk_data, &mut file)
        .await
        .map_err(|source| UploadError::ChunkWrite {
            path: path.clone(),
            source,
        })?;

    file.flush()
        .await
        .map_err(|source| UploadError::ChunkWrite {
            path: path.clone(),
            source,
        })?;

    // The chunk is already written; a failing sync only gets reported.
    if let Err(e) = file.sync_all().await {
        tracing::warn!("Error closing {}: {}", path.display(), e);
    }
    drop(file);

    tracing::debug!(
        "Appended {} bytes to {} (max range {}/{})",
        written,
        path.display(),
        request.max_range_so_far,
        request.declared_total_size
    );

    Ok(written)
}
