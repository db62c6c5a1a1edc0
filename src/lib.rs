//! Core of a batch image viewer.
//!
//! Files are ingested in batches and decoded concurrently, then appended to
//! an ordered collection in the order they were picked. The collection is
//! browsed one image at a time with wraparound navigation and a clamped zoom
//! level. Presentation and file picking live outside this crate; see the
//! binary for a minimal terminal front end.

pub mod config;
pub mod controller;
pub mod decoder;
pub mod error;
pub mod file_utils;
pub mod services;
pub mod state;

pub use config::ViewerConfig;
pub use controller::{ViewController, ViewSnapshot};
pub use decoder::{DecoderAdapter, FileBlob, ImageDecoder, ImageHandle, RasterDecoder};
pub use error::{AppError, DecodeError, DecodeFailure};
pub use services::IngestReport;
pub use state::ZoomLevel;
