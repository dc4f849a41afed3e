//! Live preview while the pointer is down
//!
//! The preview is advisory: each export supersedes the last and nothing waits
//! for it. The authoritative mask comes from the quiescence path.

use std::time::Instant;

use image::RgbaImage;
use tracing::{debug, warn};

use crate::raster::StrokeRaster;
use crate::schedule::FrameLoop;

/// Exporter of the stroke raster, paced by a [`FrameLoop`]
#[derive(Default)]
pub struct PreviewRenderer {
    latest: Option<RgbaImage>,
    export_count: u64,
    failure_count: u64,
}

impl PreviewRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// One frame. Returns the size of a fresh preview when one was exported.
    ///
    /// Nothing is exported unless `frames` is running and the raster changed
    /// since the last export. Export errors are logged and counted; the loop
    /// keeps running.
    pub fn tick<R: StrokeRaster + ?Sized>(
        &mut self,
        frames: &mut FrameLoop,
        now: Instant,
        raster: &mut R,
    ) -> Option<(u32, u32)> {
        if !raster.has_changes() || !frames.frame(now) {
            return None;
        }

        match raster.export() {
            Ok(image) => {
                raster.mark_exported();
                let size = image.dimensions();
                self.latest = Some(image);
                self.export_count += 1;
                debug!("Preview export #{} ({}x{})", self.export_count, size.0, size.1);
                Some(size)
            }
            Err(e) => {
                self.failure_count += 1;
                warn!("Preview export failed: {}", e);
                None
            }
        }
    }

    /// Most recent preview image
    pub fn latest(&self) -> Option<&RgbaImage> {
        self.latest.as_ref()
    }

    /// Drop the cached preview (after reset)
    pub fn invalidate(&mut self) {
        self.latest = None;
    }

    pub fn export_count(&self) -> u64 {
        self.export_count
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count
    }
}
