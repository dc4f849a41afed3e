//! Pointer handling for the drawing surface

use glam::Vec2;
use tracing::{debug, warn};

use crate::brush::DabOutput;
use crate::geometry::is_inside_image;
use crate::log::StrokeStyle;
use crate::raster::RenderCommand;
use crate::types::{BlendMode, StrokePoint};

use super::{DrawingSurface, SurfaceUpdate};

impl DrawingSurface {
    /// Is a stroke in progress?
    pub fn is_drawing(&self) -> bool {
        self.recorder.is_recording()
    }

    /// Begin a stroke at `point` (drawing-surface space)
    ///
    /// Ignored while disabled or when the point is outside the image region.
    pub fn pointer_down(&mut self, point: Vec2) -> SurfaceUpdate {
        if !self.enabled || !is_inside_image(point, &self.input_region) {
            return SurfaceUpdate::default();
        }

        // A dangling stroke (missed pointer-up) is committed before the new one
        let mut update = if self.is_drawing() {
            self.finish_stroke()
        } else {
            SurfaceUpdate::default()
        };

        let style = StrokeStyle {
            tool: self.tool,
            color: self.color,
            width: self.width,
        };
        if let Err(e) = self
            .recorder
            .start(style, StrokePoint::new(point.x, point.y))
        {
            warn!("pointer_down: cannot start stroke: {}", e);
            return update;
        }

        debug!(
            "pointer_down: {:?} width={:.1} at ({:.1}, {:.1})",
            self.tool, self.width, point.x, point.y
        );

        self.brush.begin_stroke(self.width);
        let dabs = self.brush.stroke_to(point.x, point.y);
        update.commands.extend(self.dab_commands(dabs));
        update
    }

    /// Extend the stroke in progress. Points outside the image are dropped.
    pub fn pointer_move(&mut self, point: Vec2) -> SurfaceUpdate {
        if !self.is_drawing() || !is_inside_image(point, &self.input_region) {
            return SurfaceUpdate::default();
        }

        match self.recorder.add_point(StrokePoint::new(point.x, point.y)) {
            Ok(true) => {
                let dabs = self.brush.stroke_to(point.x, point.y);
                SurfaceUpdate::draw(self.dab_commands(dabs))
            }
            Ok(false) => SurfaceUpdate::default(),
            Err(e) => {
                warn!("pointer_move: {}", e);
                SurfaceUpdate::default()
            }
        }
    }

    /// Finish the stroke in progress
    pub fn pointer_up(&mut self) -> SurfaceUpdate {
        self.finish_stroke()
    }

    /// Leaving the surface finishes the stroke like a pointer-up
    pub fn pointer_leave(&mut self) -> SurfaceUpdate {
        self.finish_stroke()
    }

    pub(crate) fn finish_stroke(&mut self) -> SurfaceUpdate {
        let Ok(stroke) = self.recorder.finish() else {
            return SurfaceUpdate::default();
        };
        self.brush.end_stroke();

        debug!(
            "finish_stroke: {:?} with {} points",
            stroke.tool,
            stroke.points.len()
        );
        let event = self.log.commit(stroke);
        SurfaceUpdate::changed(Vec::new(), event)
    }

    fn dab_commands(&self, dabs: Vec<DabOutput>) -> Vec<RenderCommand> {
        let blend_mode = BlendMode::from(self.tool);
        dabs.into_iter()
            .map(|dab| RenderCommand::Dab {
                dab,
                color: self.color,
                blend_mode,
            })
            .collect()
    }
}
