use crate::config::{FinalizePolicy, UniqueNameMode};
use crate::models::{ChunkOutcome, ChunkUploadRequest, FinalizedFile};
use crate::services::error::UploadError;
use crate::utils::size::pretty_byte_size;
use crate::utils::unique_name::{IdProvider, unique_name};
use crate::utils::validation::file_extension;

/// An upload is complete once the reported max range reaches the declared size.
///
/// This is a plain numeric comparison; missing or duplicated chunks are not
/// detected here.
pub fn is_complete(max_range_so_far: u64, declared_total_size: u64) -> bool {
    max_range_so_far >= declared_total_size
}

/// Decides, after a chunk was appended, whether the upload is done.
pub struct Finalizer<'a> {
    pub policy: FinalizePolicy,
    pub unique_name_mode: UniqueNameMode,
    pub ids: &'a dyn IdProvider,
}

impl Finalizer<'_> {
    pub async fn finalize<R>(
        &self,
        request: &ChunkUploadRequest<R>,
    ) -> Result<ChunkOutcome, UploadError> {
        if !is_complete(request.max_range_so_far, request.declared_total_size) {
            return Ok(ChunkOutcome::Pending);
        }

        let path = request.destination();

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|source| UploadError::Stat {
                path: path.clone(),
                source,
            })?;
        let bytes_on_disk = metadata.len();

        if self.policy == FinalizePolicy::VerifySize && bytes_on_disk != request.declared_total_size
        {
            return Err(UploadError::SizeMismatch {
                path,
                declared: request.declared_total_size,
                actual: bytes_on_disk,
            });
        }

        let file_unique_name = if request.generate_unique_name {
            match self.unique_name_mode {
                UniqueNameMode::Generated => unique_name(self.ids, &request.original_filename),
                UniqueNameMode::Original => request.original_filename.clone(),
            }
        } else {
            String::new()
        };

        Ok(ChunkOutcome::Complete(FinalizedFile {
            file_name: request.original_filename.clone(),
            file_unique_name,
            file_path: path,
            file_extension: file_extension(&request.original_filename),
            file_size: pretty_byte_size(bytes_on_disk),
            metadata_stripped: false,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::unique_name::UuidProvider;
    use std::path::Path;
    use tempfile::TempDir;

    fn request(dir: &Path, name: &str, max_range: u64, total: u64) -> ChunkUploadRequest<&'static [u8]> {
        ChunkUploadRequest {
            chunk_data: b"",
            original_filename: name.to_string(),
            declared_total_size: total,
            max_range_so_far: max_range,
            upload_directory: dir.to_path_buf(),
            generate_unique_name: true,
            strip_metadata: false,
        }
    }

    fn finalizer(policy: FinalizePolicy, mode: UniqueNameMode) -> Finalizer<'static> {
        Finalizer {
            policy,
            unique_name_mode: mode,
            ids: &UuidProvider,
        }
    }

    #[test]
    fn test_is_complete() {
        assert!(!is_complete(7, 13));
        assert!(is_complete(13, 13));
        assert!(is_complete(50, 13));
        assert!(is_complete(0, 0));
    }

    #[tokio::test]
    async fn test_pending_does_not_touch_file() {
        let temp_dir = TempDir::new().unwrap();

        // Nothing on disk: an incomplete upload is never stat'ed
        let outcome = finalizer(FinalizePolicy::VerifySize, UniqueNameMode::Generated)
            .finalize(&request(temp_dir.path(), "part.bin", 7, 13))
            .await
            .unwrap();

        assert_eq!(outcome, ChunkOutcome::Pending);
    }

    #[tokio::test]
    async fn test_complete_builds_metadata() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("photo.JPG"), vec![0u8; 1536]).unwrap();

        let file = finalizer(FinalizePolicy::MaxRange, UniqueNameMode::Generated)
            .finalize(&request(temp_dir.path(), "photo.JPG", 1536, 1536))
            .await
            .unwrap()
            .finalized()
            .unwrap();

        assert_eq!(file.file_name, "photo.JPG");
        assert_eq!(file.file_path, temp_dir.path().join("photo.JPG"));
        assert_eq!(file.file_extension, ".JPG");
        assert_eq!(file.file_size, "1.5KiB");
        assert!(file.file_unique_name.ends_with(".JPG"));
        assert_ne!(file.file_unique_name, "photo.JPG");
    }

    #[tokio::test]
    async fn test_original_unique_name_mode() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("doc.png"), b"abc").unwrap();

        let file = finalizer(FinalizePolicy::MaxRange, UniqueNameMode::Original)
            .finalize(&request(temp_dir.path(), "doc.png", 3, 3))
            .await
            .unwrap()
            .finalized()
            .unwrap();

        assert_eq!(file.file_unique_name, "doc.png");
    }

    #[tokio::test]
    async fn test_max_range_overshoot_still_finalizes() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("short"), b"abc").unwrap();

        let file = finalizer(FinalizePolicy::MaxRange, UniqueNameMode::Generated)
            .finalize(&request(temp_dir.path(), "short", 50, 17))
            .await
            .unwrap()
            .finalized()
            .unwrap();

        assert_eq!(file.file_size, "3.0B");
    }

    #[tokio::test]
    async fn test_verify_size_rejects_short_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("short"), b"abc").unwrap();

        let err = finalizer(FinalizePolicy::VerifySize, UniqueNameMode::Generated)
            .finalize(&request(temp_dir.path(), "short", 17, 17))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            UploadError::SizeMismatch {
                declared: 17,
                actual: 3,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_stat_error_for_missing_file() {
        let temp_dir = TempDir::new().unwrap();

        let err = finalizer(FinalizePolicy::MaxRange, UniqueNameMode::Generated)
            .finalize(&request(temp_dir.path(), "missing", 1, 1))
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::Stat { .. }));
    }
}
