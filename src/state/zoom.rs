//! Zoom level kept as an integer percentage so repeated steps never drift.

use crate::config::{ZOOM_DEFAULT_PERCENT, ZOOM_MAX_PERCENT, ZOOM_MIN_PERCENT, ZOOM_STEP_PERCENT};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZoomLevel(u32);

impl ZoomLevel {
    pub const MIN: ZoomLevel = ZoomLevel(ZOOM_MIN_PERCENT);
    pub const MAX: ZoomLevel = ZoomLevel(ZOOM_MAX_PERCENT);
    pub const DEFAULT: ZoomLevel = ZoomLevel(ZOOM_DEFAULT_PERCENT);

    pub fn percent(self) -> u32 {
        self.0
    }

    /// Scale factor for rendering, e.g. 1.6 for 160%.
    pub fn factor(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// One step larger, clamped to the maximum.
    pub fn zoom_in(self) -> Self {
        ZoomLevel((self.0 + ZOOM_STEP_PERCENT).min(ZOOM_MAX_PERCENT))
    }

    /// One step smaller, clamped to the minimum.
    pub fn zoom_out(self) -> Self {
        ZoomLevel(self.0.saturating_sub(ZOOM_STEP_PERCENT).max(ZOOM_MIN_PERCENT))
    }

    pub fn reset() -> Self {
        Self::DEFAULT
    }

    pub fn label(self) -> String {
        self.to_string()
    }
}

impl Default for ZoomLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for ZoomLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
