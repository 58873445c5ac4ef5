use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// What `file_unique_name` carries when a caller asks for a unique name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UniqueNameMode {
    /// A freshly generated identifier plus the original extension.
    #[default]
    Generated,
    /// A copy of the original file name.
    Original,
}

impl FromStr for UniqueNameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generated" | "uuid" => Ok(Self::Generated),
            "original" => Ok(Self::Original),
            other => Err(format!("unknown unique name mode '{}'", other)),
        }
    }
}

/// When an upload counts as complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FinalizePolicy {
    /// Complete as soon as the reported max range reaches the declared size.
    #[default]
    MaxRange,
    /// Same trigger, but the bytes on disk must also equal the declared size.
    VerifySize,
}

impl FromStr for FinalizePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "max_range" | "max-range" => Ok(Self::MaxRange),
            "verify_size" | "verify-size" => Ok(Self::VerifySize),
            other => Err(format!("unknown finalize policy '{}'", other)),
        }
    }
}

/// Upload configuration
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory chunks are assembled in (default: "./uploads")
    pub upload_dir: PathBuf,

    /// Lower-cased extensions with leading dot that uploads may carry
    pub allowed_extensions: Vec<String>,

    /// Meaning of the unique name on finalized files (default: generated)
    pub unique_name_mode: UniqueNameMode,

    /// Completion rule for uploads (default: max_range)
    pub finalize_policy: FinalizePolicy,

    /// Maximum request body for a single chunk in bytes (default: 16 MB)
    pub max_chunk_size: usize,

    /// HTTP port (default: 3000)
    pub port: u16,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("./uploads"),
            allowed_extensions: vec![
                ".jpg".to_string(),
                ".jpeg".to_string(),
                ".png".to_string(),
                ".gif".to_string(),
                ".webp".to_string(),
            ],
            unique_name_mode: UniqueNameMode::default(),
            finalize_policy: FinalizePolicy::default(),
            max_chunk_size: 16 * 1024 * 1024, // 16 MB
            port: 3000,
        }
    }
}

impl UploadConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            allowed_extensions: env::var("ALLOWED_EXTENSIONS")
                .ok()
                .map(|v| parse_extensions(&v))
                .unwrap_or(default.allowed_extensions),

            unique_name_mode: env::var("UNIQUE_NAME_MODE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.unique_name_mode),

            finalize_policy: env::var("FINALIZE_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.finalize_policy),

            max_chunk_size: env::var("MAX_CHUNK_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_chunk_size),

            port: env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),
        }
    }

    /// Config rooted at an explicit directory, everything else default.
    pub fn with_upload_dir(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            ..Self::default()
        }
    }
}

/// Splits a comma separated list, normalizing each entry to ".ext" in lower case.
fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .map(|s| if s.starts_with('.') { s } else { format!(".{}", s) })
        .collect()
}
