use crate::services::error::UploadError;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, ImageError};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const JPEG_QUALITY: u8 = 100;

/// Re-encodes the image at `path` as a quality 100 JPEG, dropping EXIF and any
/// other metadata the plain pixel data does not carry.
///
/// The new file is written next to the original and renamed over it, so a
/// failed encode leaves the original untouched. The operation is destructive
/// once it succeeds: no backup is kept.
pub async fn strip_metadata(path: &Path) -> Result<(), UploadError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || strip_metadata_blocking(&path)).await?
}

pub fn strip_metadata_blocking(path: &Path) -> Result<(), UploadError> {
    if has_exif(path) {
        tracing::debug!("Found EXIF data in {}, stripping", path.display());
    }

    let decode_err = |source: ImageError| UploadError::Decode {
        path: path.to_path_buf(),
        source,
    };
    let img = image::io::Reader::open(path)
        .map_err(|e| decode_err(ImageError::IoError(e)))?
        .with_guessed_format()
        .map_err(|e| decode_err(ImageError::IoError(e)))?
        .decode()
        .map_err(decode_err)?;

    let create_err = |source: std::io::Error| UploadError::Create {
        path: path.to_path_buf(),
        source,
    };
    let tmp = NamedTempFile::new_in(parent_dir(path)).map_err(create_err)?;

    let encode_err = |source: ImageError| UploadError::Encode {
        path: path.to_path_buf(),
        source,
    };
    {
        let mut writer = BufWriter::new(tmp.as_file());
        // JPEG has no alpha channel
        let rgb = img.to_rgb8();
        JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY)
            .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
            .map_err(encode_err)?;
        writer
            .flush()
            .map_err(|e| encode_err(ImageError::IoError(e)))?;
    }

    // Keep the original's permissions rather than the temp file's 0600
    if let Ok(meta) = std::fs::metadata(path) {
        if let Err(e) = tmp.as_file().set_permissions(meta.permissions()) {
            tracing::warn!("Could not copy permissions onto {}: {}", path.display(), e);
        }
    }

    tmp.persist(path).map_err(|e| create_err(e.error))?;

    tracing::info!(
        "Stripped metadata from {} ({}x{})",
        path.display(),
        img.width(),
        img.height()
    );
    Ok(())
}

/// Whether the file carries an EXIF block kamadak-exif can read.
pub fn has_exif(path: &Path) -> bool {
    let Ok(file) = File::open(path) else {
        return false;
    };
    let mut reader = BufReader::new(file);
    exif::Reader::new()
        .read_from_container(&mut reader)
        .is_ok()
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
