//! State management for the image viewer.

use crate::decoder::ImageHandle;
use log::debug;

pub mod batch;
pub mod navigation;
pub mod zoom;

pub use batch::{BatchSettle, SettledBatch};
pub use navigation::Direction;
pub use zoom::ZoomLevel;

/// Which image is shown and how far it is zoomed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionState {
    /// `None` exactly when the collection is empty.
    pub index: Option<usize>,
    pub zoom: ZoomLevel,
}

/// Owns the ordered image collection and the current selection.
///
/// Mutated only by committed batches, navigation and zoom changes.
#[derive(Default)]
pub struct ImageStore {
    images: Vec<ImageHandle>,
    selection: SelectionState,
}

impl ImageStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn selection(&self) -> SelectionState {
        self.selection
    }

    /// Returns the image at the current index, if any.
    pub fn current_image(&self) -> Option<&ImageHandle> {
        self.selection.index.and_then(|i| self.images.get(i))
    }

    /// Appends a settled batch in order. Selects the first image when the
    /// store was empty; otherwise the selection is left alone.
    ///
    /// Returns the number of images appended.
    pub fn append_batch(&mut self, images: Vec<ImageHandle>) -> usize {
        let added = images.len();
        if added == 0 {
            return 0;
        }

        let was_empty = self.images.is_empty();
        self.images.extend(images);
        if was_empty {
            self.selection.index = Some(0);
        }
        self.clamp_selection();

        debug!(
            "Appended {} images (total {}, selection {:?})",
            added,
            self.images.len(),
            self.selection.index
        );
        added
    }

    fn navigate(&mut self, direction: Direction) -> Option<usize> {
        let Some(current) = self.selection.index else {
            debug!("No images available for navigation");
            return None;
        };

        let new_index = navigation::step(current, self.images.len(), direction);
        self.selection.index = Some(new_index);
        debug!("Navigated {:?}: {} -> {}", direction, current, new_index);
        Some(new_index)
    }

    /// Moves to the next image, wrapping to the first. No-op when empty.
    pub fn select_next(&mut self) -> Option<usize> {
        self.navigate(Direction::Next)
    }

    /// Moves to the previous image, wrapping to the last. No-op when empty.
    pub fn select_previous(&mut self) -> Option<usize> {
        self.navigate(Direction::Previous)
    }

    /// Jumps straight to `index`. Returns false if it is out of range.
    pub fn select_index(&mut self, index: usize) -> bool {
        if index >= self.images.len() {
            debug!(
                "Ignoring selection of index {} (total {})",
                index,
                self.images.len()
            );
            return false;
        }
        self.selection.index = Some(index);
        true
    }

    /// Applies `f` to the zoom level if an image is selected. Returns the
    /// new level, or `None` when there is nothing to zoom.
    pub fn update_zoom(&mut self, f: impl FnOnce(ZoomLevel) -> ZoomLevel) -> Option<ZoomLevel> {
        if self.selection.index.is_none() {
            debug!("Zoom requested with no image selected");
            return None;
        }
        self.selection.zoom = f(self.selection.zoom);
        Some(self.selection.zoom)
    }

    /// Keeps the index inside the collection after its length changes.
    fn clamp_selection(&mut self) {
        self.selection.index = match (self.selection.index, self.images.len()) {
            (_, 0) => None,
            (Some(i), len) => Some(i.min(len - 1)),
            (None, _) => Some(0),
        };
    }
}
