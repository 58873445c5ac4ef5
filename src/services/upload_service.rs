use crate::config::UploadConfig;
use crate::models::{ChunkOutcome, ChunkUploadRequest};
use crate::services::chunk_writer::append_chunk;
use crate::services::cleanup::remove_uploaded_file;
use crate::services::error::UploadError;
use crate::services::finalizer::Finalizer;
use crate::services::metadata_stripper;
use crate::utils::keyed_mutex::KeyedMutex;
use crate::utils::size::pretty_byte_size;
use crate::utils::unique_name::{IdProvider, UuidProvider};
use crate::utils::validation::{is_allowed_extension, validate_file_name};
use dashmap::DashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncRead;

pub struct UploadService {
    config: UploadConfig,
    ids: Arc<dyn IdProvider>,
    locks: KeyedMutex,
    /// Destinations that already produced a `FinalizedFile`.
    finalized: DashSet<PathBuf>,
}

impl UploadService {
    pub fn new(config: UploadConfig) -> Self {
        Self::with_id_provider(config, Arc::new(UuidProvider))
    }

    pub fn with_id_provider(config: UploadConfig, ids: Arc<dyn IdProvider>) -> Self {
        Self {
            config,
            ids,
            locks: KeyedMutex::new(),
            finalized: DashSet::new(),
        }
    }

    /// Checks `file_name` against the configured extension allow-list.
    pub fn is_allowed(&self, file_name: &str) -> bool {
        is_allowed_extension(&self.config.allowed_extensions, file_name)
    }

    /// Appends one chunk and finalizes the upload if it is complete.
    ///
    /// Chunks for the same destination are serialized, so their bytes land in
    /// call order and only one call can ever observe completion. Writing to a
    /// destination that was already finalized fails with `AlreadyFinalized`
    /// and leaves the file untouched until it is removed.
    ///
    /// When the request asks for metadata stripping, the completed file is
    /// stripped before it is marked finalized. A failed strip keeps the file
    /// as uploaded and is reported through `metadata_stripped`.
    pub async fn store_chunk<R>(
        &self,
        request: ChunkUploadRequest<R>,
    ) -> Result<ChunkOutcome, UploadError>
    where
        R: AsyncRead + Unpin + Send,
    {
        validate_file_name(&request.original_filename)?;

        let path = request.destination();
        let result = {
            let _guard = self.locks.lock(&path).await;
            self.store_locked(request, path).await
        };
        self.locks.cleanup();

        result
    }

    async fn store_locked<R>(
        &self,
        mut request: ChunkUploadRequest<R>,
        path: PathBuf,
    ) -> Result<ChunkOutcome, UploadError>
    where
        R: AsyncRead + Unpin + Send,
    {
        if self.finalized.contains(&path) {
            tracing::warn!(
                "Rejecting chunk for {}: upload already finalized",
                path.display()
            );
            return Err(UploadError::AlreadyFinalized { path });
        }

        append_chunk(&mut request).await?;

        let finalizer = Finalizer {
            policy: self.config.finalize_policy,
            unique_name_mode: self.config.unique_name_mode,
            ids: self.ids.as_ref(),
        };
        let mut file = match finalizer.finalize(&request).await? {
            ChunkOutcome::Pending => return Ok(ChunkOutcome::Pending),
            ChunkOutcome::Complete(file) => file,
        };

        if request.strip_metadata {
            match metadata_stripper::strip_metadata(&file.file_path).await {
                Ok(()) => {
                    let metadata = tokio::fs::metadata(&file.file_path).await.map_err(
                        |source| UploadError::Stat {
                            path: file.file_path.clone(),
                            source,
                        },
                    )?;
                    file.file_size = pretty_byte_size(metadata.len());
                    file.metadata_stripped = true;
                }
                Err(e) => {
                    tracing::warn!(
                        "Keeping {} as uploaded, metadata strip failed: {}",
                        file.file_path.display(),
                        e
                    );
                }
            }
        }

        self.finalized.insert(path);
        tracing::info!(
            "Upload finalized: {} ({}, unique name: {:?}, stripped: {})",
            file.file_path.display(),
            file.file_size,
            file.file_unique_name,
            file.metadata_stripped
        );

        Ok(ChunkOutcome::Complete(file))
    }

    /// Removes a finalized or abandoned upload and forgets its finalized state.
    pub async fn remove_file(&self, upload_dir: &Path, file_name: &str) -> Result<(), UploadError> {
        validate_file_name(file_name)?;

        let path = upload_dir.join(file_name);
        let result = {
            let _guard = self.locks.lock(&path).await;
            let result = remove_uploaded_file(upload_dir, file_name).await;
            if matches!(result, Ok(()) | Err(UploadError::NotFound { .. })) {
                self.finalized.remove(&path);
            }
            result
        };
        self.locks.cleanup();

        if let Err(e) = &result {
            tracing::warn!("Cleanup of {} failed: {}", path.display(), e);
        }
        result
    }

    /// Strips image metadata from a finalized upload in place.
    pub async fn strip_metadata(&self, path: &Path) -> Result<(), UploadError> {
        let _guard = self.locks.lock(path).await;
        metadata_stripper::strip_metadata(path).await
    }
}
