//! Turns paths picked by the user into file blobs for the viewer core.
//!
//! This is the file-selection side of the boundary: the core itself never
//! touches the file system.

use crate::config::{FALLBACK_MEDIA_TYPE, SUPPORTED_IMAGE_EXTENSIONS};
use crate::decoder::FileBlob;
use crate::error::{AppError, Result};
use image::ImageFormat;
use std::fs;
use std::path::Path;

/// Returns true when the extension is one the viewer offers in its picker.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext_str| SUPPORTED_IMAGE_EXTENSIONS.contains(&ext_str.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Guesses the declared media type from the file extension. Extensions the
/// viewer does not offer are declared as opaque bytes.
pub fn media_type_for(path: &Path) -> &'static str {
    if !is_supported_image(path) {
        return FALLBACK_MEDIA_TYPE;
    }
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .unwrap_or(FALLBACK_MEDIA_TYPE)
}

/// Reads a file into a blob, keeping the path's file name as its identity.
pub fn load_blob(path: &Path) -> Result<FileBlob> {
    let bytes = fs::read(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(FileBlob::new(name, media_type_for(path), bytes))
}
