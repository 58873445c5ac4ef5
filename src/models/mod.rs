use serde::Serialize;
use std::path::PathBuf;
use utoipa::ToSchema;

/// One chunk of an upload as handed over by the transport layer.
pub struct ChunkUploadRequest<R> {
    /// Bytes of this chunk only. Read to the end, never closed.
    pub chunk_data: R,
    pub original_filename: String,
    /// Total size of the whole file, fixed for the lifetime of the upload.
    pub declared_total_size: u64,
    /// Cumulative byte count the caller believes was sent, this chunk included.
    pub max_range_so_far: u64,
    pub upload_directory: PathBuf,
    pub generate_unique_name: bool,
    /// Re-encode the completed file without image metadata.
    pub strip_metadata: bool,
}

impl<R> ChunkUploadRequest<R> {
    /// Where the chunk lands: `<upload_directory>/<original_filename>`.
    pub fn destination(&self) -> PathBuf {
        self.upload_directory.join(&self.original_filename)
    }
}

/// Metadata of a completely assembled upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FinalizedFile {
    pub file_name: String,
    /// Empty unless a unique name was requested.
    pub file_unique_name: String,
    #[schema(value_type = String)]
    pub file_path: PathBuf,
    pub file_extension: String,
    /// Human-readable, e.g. "1.5KiB". Measured after stripping, if any.
    pub file_size: String,
    /// True once the file was re-encoded without metadata.
    pub metadata_stripped: bool,
}

/// Result of storing one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// More chunks are expected.
    Pending,
    Complete(FinalizedFile),
}

impl ChunkOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, ChunkOutcome::Complete(_))
    }

    pub fn finalized(self) -> Option<FinalizedFile> {
        match self {
            ChunkOutcome::Complete(file) => Some(file),
            ChunkOutcome::Pending => None,
        }
    }
}
