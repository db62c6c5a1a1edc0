//! Decoder adapter: raw file blobs in, displayable image handles out.
//!
//! Decoding is CPU-bound, so it runs on a dedicated rayon pool and each
//! result is pushed back to the async side through a channel. Completions
//! therefore arrive in whatever order the workers finish.

use crate::config::{IMAGE_MEDIA_PREFIX, ViewerConfig};
use crate::error::{DecodeError, Result};
use async_std::channel::Sender;
use image::{ImageReader, RgbaImage};
use log::{debug, error, warn};
use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

/// A user-selected file as handed over by the picker.
#[derive(Clone)]
pub struct FileBlob {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl FileBlob {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Whether the declared media type belongs to the image category.
    pub fn is_image(&self) -> bool {
        self.media_type
            .get(..IMAGE_MEDIA_PREFIX.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(IMAGE_MEDIA_PREFIX))
    }
}

impl fmt::Debug for FileBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileBlob")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Decoded RGBA8 pixels plus the name of the file they came from.
pub struct DecodedImage {
    pub name: String,
    pub pixels: RgbaImage,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Immutable, cheaply cloneable reference to a decoded image.
///
/// The pixel buffer is freed once the last handle is dropped, so removing an
/// entry from the collection releases it unless a snapshot still holds it.
#[derive(Clone)]
pub struct ImageHandle(Arc<DecodedImage>);

impl ImageHandle {
    pub fn new(image: DecodedImage) -> Self {
        Self(Arc::new(image))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.0.pixels
    }

    /// Display size at the given zoom factor, rounded to whole pixels.
    pub fn zoomed_size(&self, factor: f64) -> (u32, u32) {
        let scale = |v: u32| (f64::from(v) * factor).round().max(0.0) as u32;
        (scale(self.width()), scale(self.height()))
    }

    /// True when both handles refer to the same decoded image.
    pub fn ptr_eq(&self, other: &ImageHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageHandle({} {}x{})", self.name(), self.width(), self.height())
    }
}

/// Outcome of decoding a single blob.
pub type DecodeOutcome = std::result::Result<ImageHandle, DecodeError>;

/// Converts raw bytes into image data. Implementations block; the adapter
/// takes care of running them off the caller's thread.
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, blob: &FileBlob) -> DecodeOutcome;
}

/// Decoder backed by the `image` crate, format sniffed from the content.
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterDecoder;

impl ImageDecoder for RasterDecoder {
    fn decode(&self, blob: &FileBlob) -> DecodeOutcome {
        if !blob.is_image() {
            return Err(DecodeError::UnsupportedMediaType {
                file: blob.name.clone(),
                media_type: blob.media_type.clone(),
            });
        }

        let to_error = |source| DecodeError::Decode {
            file: blob.name.clone(),
            source,
        };

        let img = ImageReader::new(Cursor::new(blob.bytes.as_slice()))
            .with_guessed_format()
            .map_err(|e| to_error(image::ImageError::IoError(e)))?
            .decode()
            .map_err(to_error)?;

        Ok(ImageHandle::new(DecodedImage {
            name: blob.name.clone(),
            pixels: img.to_rgba8(),
        }))
    }
}

/// Runs decodes concurrently on a private thread pool.
pub struct DecoderAdapter {
    pool: rayon::ThreadPool,
    decoder: Arc<dyn ImageDecoder>,
}

impl DecoderAdapter {
    /// Creates an adapter using `decoder` with `threads` workers.
    pub fn new(decoder: Arc<dyn ImageDecoder>, threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("image-decode-{i}"))
            .panic_handler(|_| error!("Image decoder panicked; its batch slot will be reported as lost"))
            .build()?;

        Ok(Self { pool, decoder })
    }

    /// Creates the default raster decoder sized from the configuration.
    pub fn from_config(config: &ViewerConfig) -> Result<Self> {
        Self::new(Arc::new(RasterDecoder), config.decode_threads)
    }

    /// Decodes `blob` in the background and reports `(slot, outcome)` on
    /// `completions` when done.
    ///
    /// If the decoder panics the sender is dropped without a message.
    pub fn submit(&self, slot: usize, blob: FileBlob, completions: Sender<(usize, DecodeOutcome)>) {
        let decoder = Arc::clone(&self.decoder);
        self.pool.spawn(move || {
            let start = std::time::Instant::now();
            let outcome = decoder.decode(&blob);
            match &outcome {
                Ok(handle) => debug!(
                    "Decoded slot {} ({:?}) in {:?}",
                    slot,
                    handle,
                    start.elapsed()
                ),
                Err(e) => warn!("Decode failed for slot {}: {}", slot, e),
            }
            if completions.try_send((slot, outcome)).is_err() {
                debug!("Batch for slot {} no longer waiting; result dropped", slot);
            }
        });
    }
}
