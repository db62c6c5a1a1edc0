//! View controller: turns user intents into store and decoder calls and
//! exposes the render-ready snapshot to whatever presents it.

use crate::config::ViewerConfig;
use crate::decoder::{DecoderAdapter, FileBlob, ImageHandle};
use crate::error::Result;
use crate::services::{IngestReport, IngestService};
use crate::state::{ImageStore, ZoomLevel};
use log::debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// What the presentation layer needs to draw one frame.
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    pub has_selection: bool,
    pub current_image: Option<ImageHandle>,
    /// Zero-based index of the shown image; 0 when nothing is shown.
    pub index: usize,
    pub total: usize,
    pub zoom: ZoomLevel,
    pub zoom_percent: u32,
}

impl ViewSnapshot {
    /// "Image 2 / 3", or `None` when nothing is shown.
    pub fn position_label(&self) -> Option<String> {
        self.has_selection
            .then(|| format!("Image {} / {}", self.index + 1, self.total))
    }
}

type Listener = Arc<dyn Fn(&ViewSnapshot) + Send + Sync>;

/// Entry point for user intents. Cloning shares the same store.
#[derive(Clone)]
pub struct ViewController {
    store: Arc<Mutex<ImageStore>>,
    ingest: IngestService,
    listeners: Arc<Mutex<Vec<Listener>>>,
}

impl ViewController {
    /// Creates a controller with an empty collection around `decoder`.
    pub fn new(decoder: DecoderAdapter) -> Self {
        let store = Arc::new(Mutex::new(ImageStore::new()));
        let ingest = IngestService::new(store.clone(), Arc::new(decoder));
        Self {
            store,
            ingest,
            listeners: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates a controller using the raster decoder sized by `config`.
    pub fn from_config(config: &ViewerConfig) -> Result<Self> {
        Ok(Self::new(DecoderAdapter::from_config(config)?))
    }

    fn store(&self) -> MutexGuard<'_, ImageStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a callback run with the new snapshot after every change.
    pub fn subscribe(&self, listener: impl Fn(&ViewSnapshot) + Send + Sync + 'static) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    /// Runs listeners without holding any lock, so they may call back into
    /// the controller.
    fn notify(&self) {
        let snapshot = self.snapshot();
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in &listeners {
            listener(&snapshot);
        }
    }

    /// Ingests one batch of files. Resolves once every decode has finished
    /// and the successful ones are visible.
    pub async fn ingest_batch(&self, blobs: Vec<FileBlob>) -> IngestReport {
        let report = self.ingest.ingest(blobs).await;
        if report.appended > 0 {
            self.notify();
        }
        report
    }

    pub fn next(&self) -> Option<usize> {
        let moved = self.store().select_next();
        if moved.is_some() {
            self.notify();
        }
        moved
    }

    pub fn previous(&self) -> Option<usize> {
        let moved = self.store().select_previous();
        if moved.is_some() {
            self.notify();
        }
        moved
    }

    /// Jumps to `index`; ignored when out of range.
    pub fn go_to(&self, index: usize) -> bool {
        let moved = self.store().select_index(index);
        if moved {
            self.notify();
        }
        moved
    }

    fn change_zoom(&self, f: impl FnOnce(ZoomLevel) -> ZoomLevel) -> Option<ZoomLevel> {
        let (before, after) = {
            let mut store = self.store();
            let before = store.selection().zoom;
            (before, store.update_zoom(f))
        };
        if let Some(zoom) = after {
            debug!("Zoom {} -> {}", before, zoom);
            if zoom != before {
                self.notify();
            }
        }
        after
    }

    pub fn zoom_in(&self) -> Option<ZoomLevel> {
        self.change_zoom(ZoomLevel::zoom_in)
    }

    pub fn zoom_out(&self) -> Option<ZoomLevel> {
        self.change_zoom(ZoomLevel::zoom_out)
    }

    pub fn reset_zoom(&self) -> Option<ZoomLevel> {
        self.change_zoom(|_| ZoomLevel::reset())
    }

    pub fn current_image(&self) -> Option<ImageHandle> {
        self.store().current_image().cloned()
    }

    /// Consistent view of the selection, taken under a single lock.
    pub fn snapshot(&self) -> ViewSnapshot {
        let store = self.store();
        let selection = store.selection();
        ViewSnapshot {
            has_selection: selection.index.is_some(),
            current_image: store.current_image().cloned(),
            index: selection.index.unwrap_or(0),
            total: store.len(),
            zoom: selection.zoom,
            zoom_percent: selection.zoom.percent(),
        }
    }
}
