use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("failed to create upload directory {path}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to open {path} for appending: {source}")]
    FileOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write chunk to {path}: {source}")]
    ChunkWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to stat {path}: {source}")]
    Stat {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("failed to create output file for {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode image {path}: {source}")]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("invalid file name {name:?}: {reason}")]
    InvalidFileName { name: String, reason: &'static str },

    #[error("upload already finalized: {path}")]
    AlreadyFinalized { path: PathBuf },

    #[error("size mismatch for {path}: declared {declared} bytes, found {actual} on disk")]
    SizeMismatch {
        path: PathBuf,
        declared: u64,
        actual: u64,
    },

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
