//! Stamping brush dabs onto the tiled raster

use tracing::trace;

use super::TiledSurface;
use crate::brush::DabOutput;
use crate::types::BlendMode;

impl TiledSurface {
    /// Stamp one hard-edged circular dab
    ///
    /// A pixel is covered when its center falls inside the circle. Returns the
    /// touched rectangle as `(x, y, width, height)`, or None when the dab
    /// misses the surface entirely.
    pub fn apply_dab(
        &mut self,
        dab: &DabOutput,
        color: [f32; 4],
        blend_mode: BlendMode,
    ) -> Option<(u32, u32, u32, u32)> {
        let radius = dab.size / 2.0;
        if radius <= 0.0 || dab.opacity <= 0.0 {
            return None;
        }

        let (x0, x1) = clip_span(dab.x, radius, self.width());
        let (y0, y1) = clip_span(dab.y, radius, self.height());
        if x0 >= x1 || y0 >= y1 {
            return None;
        }

        let radius_sq = radius * radius;
        for py in y0..y1 {
            let dy = py as f32 + 0.5 - dab.y;
            for px in x0..x1 {
                let dx = px as f32 + 0.5 - dab.x;
                if dx * dx + dy * dy > radius_sq {
                    continue;
                }
                match blend_mode {
                    BlendMode::Normal => self.surface.blend_pixel(px, py, color, dab.opacity),
                    BlendMode::Erase => self.surface.erase_pixel(px, py, dab.opacity),
                }
            }
        }

        let (w, h) = (x1 - x0, y1 - y0);
        self.mark_region_dirty(x0, y0, w, h);
        trace!(
            "apply_dab: ({:.1}, {:.1}) d={:.1} {:?} touched {}x{} at ({}, {})",
            dab.x, dab.y, dab.size, blend_mode, w, h, x0, y0
        );
        Some((x0, y0, w, h))
    }
}

/// Pixel range `[start, end)` a circle can touch along one axis
fn clip_span(center: f32, radius: f32, limit: u32) -> (u32, u32) {
    let start = (center - radius).floor().max(0.0) as u32;
    let end = (center + radius).ceil().max(0.0) as u32;
    (start.min(limit), end.min(limit))
}
