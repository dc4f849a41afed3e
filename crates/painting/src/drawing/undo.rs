//! Undo, redo, reset and restore for the drawing surface
//!
//! All of these redraw from the stroke log, so the sink always ends up
//! showing exactly the visible strokes.

use tracing::debug;

use crate::raster::{replay_commands, RenderCommand};
use crate::types::Stroke;

use super::{DrawingSurface, SurfaceUpdate};

impl DrawingSurface {
    /// Commands that redraw the visible strokes from scratch
    pub fn replay(&self) -> Vec<RenderCommand> {
        replay_commands(self.log.active(), self.brush_settings)
    }

    /// Hide the most recent stroke
    ///
    /// A stroke still in progress is committed first, so it is the one undone.
    pub fn undo(&mut self) -> SurfaceUpdate {
        if self.is_drawing() {
            self.finish_stroke();
        }

        let Some(event) = self.log.undo() else {
            debug!("Undo: nothing to undo");
            return SurfaceUpdate::default();
        };
        debug!("Undo: {} strokes remain", self.log.len());
        SurfaceUpdate::changed(self.replay(), event)
    }

    /// Re-show the most recently undone stroke
    pub fn redo(&mut self) -> SurfaceUpdate {
        if self.is_drawing() {
            // Committing would drop the redo tail
            return SurfaceUpdate::default();
        }

        let Some(event) = self.log.redo() else {
            debug!("Redo: nothing to redo");
            return SurfaceUpdate::default();
        };
        debug!("Redo: {} strokes visible", self.log.len());
        SurfaceUpdate::changed(self.replay(), event)
    }

    /// Drop every stroke, including the redo tail
    pub fn reset(&mut self) -> SurfaceUpdate {
        let _ = self.recorder.abort();
        self.brush.end_stroke();
        let event = self.log.clear();
        SurfaceUpdate::changed(vec![RenderCommand::Clear], event)
    }

    /// Replace the log with previously saved strokes and redraw them
    ///
    /// Widths above the current maximum are clamped, as with `set_width`.
    pub fn restore(&mut self, mut strokes: Vec<Stroke>) -> SurfaceUpdate {
        for stroke in strokes.iter_mut().filter(|s| s.width > self.max_width) {
            debug!("Restore: clamping width {} to {}", stroke.width, self.max_width);
            stroke.width = self.max_width;
        }
        let _ = self.recorder.abort();
        self.brush.end_stroke();
        let event = self.log.restore(strokes);
        debug!("Restore: {} strokes", self.log.len());
        SurfaceUpdate::changed(self.replay(), event)
    }
}
