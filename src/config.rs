//! Application configuration constants.

use crate::error::{AppError, Result};

/// Supported image file extensions when the front end picks files from disk.
pub const SUPPORTED_IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// Declared media types starting with this prefix are handed to the decoder.
pub const IMAGE_MEDIA_PREFIX: &str = "image/";

/// Media type used when nothing better can be guessed.
pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

pub const ZOOM_MIN_PERCENT: u32 = 50;
pub const ZOOM_MAX_PERCENT: u32 = 300;
pub const ZOOM_STEP_PERCENT: u32 = 20;
pub const ZOOM_DEFAULT_PERCENT: u32 = 100;

/// Worker threads in the decode pool unless overridden.
pub const DEFAULT_DECODE_THREADS: usize = 4;

/// Environment variable overriding the decode pool size.
pub const DECODE_THREADS_ENV: &str = "IMAGE_VIEWER_DECODE_THREADS";

/// Runtime settings for the viewer core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerConfig {
    pub decode_threads: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            decode_threads: DEFAULT_DECODE_THREADS,
        }
    }
}

impl ViewerConfig {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(DECODE_THREADS_ENV) {
            let threads = raw.trim().parse::<usize>().map_err(|e| {
                AppError::Config(format!("{DECODE_THREADS_ENV}={raw:?}: {e}"))
            })?;
            if threads == 0 {
                return Err(AppError::Config(format!(
                    "{DECODE_THREADS_ENV} must be at least 1"
                )));
            }
            config.decode_threads = threads;
        }

        Ok(config)
    }
}
