//! Unified error types for the image viewer.

use std::path::PathBuf;
use thiserror::Error;

/// Why a single file did not make it into the collection.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Declared media type is not an image; filtered before decoding.
    #[error("{file}: unsupported media type {media_type:?}")]
    UnsupportedMediaType { file: String, media_type: String },

    /// Claimed to be an image but the bytes could not be decoded.
    #[error("{file}: {source}")]
    Decode {
        file: String,
        #[source]
        source: image::ImageError,
    },

    /// The decode task ended without reporting a result.
    #[error("{file}: decode worker exited without a result")]
    WorkerLost { file: String },
}

/// Per-file failure reported alongside a batch ingest.
#[derive(Debug, Error)]
#[error("batch slot {slot}: {error}")]
pub struct DecodeFailure {
    /// Position of the file in the submitted batch.
    pub slot: usize,
    pub file: String,
    #[source]
    pub error: DecodeError,
}

/// Errors raised outside the viewer core (file loading, configuration).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to start decode pool: {0}")]
    DecodePool(#[from] rayon::ThreadPoolBuildError),
}

/// Type alias for Results in this application.
pub type Result<T> = std::result::Result<T, AppError>;
