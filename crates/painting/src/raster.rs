//! Render commands, render sinks and raster read-back
//!
//! The drawing state machine never touches pixels. It emits
//! [`RenderCommand`]s, and any [`RenderSink`] can execute them. Sinks that
//! can be read back also implement [`StrokeRaster`], which is what the
//! preview and mask stages consume.

use image::RgbaImage;
use thiserror::Error;
use tracing::debug;

use crate::brush::{BrushEngine, BrushSettings, DabOutput};
use crate::tiles::TiledSurface;
use crate::types::{BlendMode, Stroke};

/// Failure to read the stroke raster back (a CanvasExportFailure)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExportError {
    #[error("Surface has no pixels ({width}x{height})")]
    EmptySurface { width: u32, height: u32 },

    #[error("Surface buffer does not match {width}x{height}")]
    BufferMismatch { width: u32, height: u32 },

    #[error("Surface cannot be read back: {0}")]
    Unreadable(String),
}

/// A pure description of one drawing operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderCommand {
    /// Reset the sink to fully transparent
    Clear,
    /// Stamp one dab
    Dab {
        dab: DabOutput,
        color: [f32; 4],
        blend_mode: BlendMode,
    },
}

/// Anything that can execute render commands
pub trait RenderSink {
    fn execute(&mut self, command: &RenderCommand);

    /// Reallocate for a new drawing-surface size. Contents are discarded.
    fn resize(&mut self, width: u32, height: u32);

    fn execute_all(&mut self, commands: &[RenderCommand]) {
        for command in commands {
            self.execute(command);
        }
    }
}

/// A raster of the current strokes that can be exported
pub trait StrokeRaster {
    /// Raster size in drawing-surface pixels
    fn dimensions(&self) -> (u32, u32);

    /// Read the raster back as straight-alpha RGBA
    fn export(&self) -> Result<RgbaImage, ExportError>;

    /// Whether pixels changed since the last [`mark_exported`](Self::mark_exported)
    fn has_changes(&self) -> bool {
        true
    }

    /// Acknowledge the changes seen by a preview export
    fn mark_exported(&mut self) {}
}

impl RenderSink for TiledSurface {
    fn execute(&mut self, command: &RenderCommand) {
        match *command {
            RenderCommand::Clear => self.clear(),
            RenderCommand::Dab {
                dab,
                color,
                blend_mode,
            } => {
                self.apply_dab(&dab, color, blend_mode);
            }
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        *self = TiledSurface::new(width, height, self.tile_size());
        self.clear();
    }
}

impl StrokeRaster for TiledSurface {
    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn export(&self) -> Result<RgbaImage, ExportError> {
        let (width, height) = self.dimensions();
        if width == 0 || height == 0 {
            return Err(ExportError::EmptySurface { width, height });
        }
        self.surface()
            .to_rgba8()
            .ok_or(ExportError::BufferMismatch { width, height })
    }

    fn has_changes(&self) -> bool {
        self.has_dirty_tiles()
    }

    fn mark_exported(&mut self) {
        self.take_dirty_tiles();
    }
}

/// Render commands that draw one stroke
pub fn stroke_commands(stroke: &Stroke, settings: BrushSettings) -> Vec<RenderCommand> {
    let mut brush = BrushEngine::new(settings);
    brush.begin_stroke(stroke.width);

    let blend_mode = BlendMode::from(stroke.tool);
    let commands: Vec<RenderCommand> = stroke
        .points
        .iter()
        .flat_map(|p| brush.stroke_to(p.x, p.y))
        .map(|dab| RenderCommand::Dab {
            dab,
            color: stroke.color,
            blend_mode,
        })
        .collect();

    brush.end_stroke();
    commands
}

/// Commands that redraw a stroke list from scratch, in order
pub fn replay_commands(strokes: &[Stroke], settings: BrushSettings) -> Vec<RenderCommand> {
    let mut commands = vec![RenderCommand::Clear];
    for stroke in strokes {
        commands.extend(stroke_commands(stroke, settings));
    }
    commands
}

/// Rasterize a stroke list onto a fresh transparent surface
pub fn rasterize_strokes(
    strokes: &[Stroke],
    width: u32,
    height: u32,
    settings: BrushSettings,
) -> TiledSurface {
    let mut surface = TiledSurface::with_default_tile_size(width, height);
    let commands = replay_commands(strokes, settings);
    debug!(
        "rasterize_strokes: {} strokes -> {} commands on {}x{}",
        strokes.len(),
        commands.len(),
        width,
        height
    );
    surface.execute_all(&commands);
    surface
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{StrokePoint, Tool};

    fn line(tool: Tool, from: (f32, f32), to: (f32, f32), width: f32) -> Stroke {
        Stroke {
            points: vec![StrokePoint::new(from.0, from.1), StrokePoint::new(to.0, to.1)],
            tool,
            color: [1.0, 1.0, 1.0, 1.0],
            width,
        }
    }

    fn alpha(image: &RgbaImage, x: u32, y: u32) -> u8 {
        image.get_pixel(x, y).0[3]
    }

    #[test]
    fn test_stroke_commands_cover_the_line() {
        let stroke = line(Tool::Pen, (10.0, 10.0), (50.0, 10.0), 8.0);
        let commands = stroke_commands(&stroke, BrushSettings::default());
        assert!(commands.len() > 10);
        assert!(commands.iter().all(|c| matches!(
            c,
            RenderCommand::Dab {
                blend_mode: BlendMode::Normal,
                ..
            }
        )));
    }

    #[test]
    fn test_rasterize_pen_then_eraser() {
        let strokes = vec![
            line(Tool::Pen, (10.0, 32.0), (54.0, 32.0), 10.0),
            line(Tool::Eraser, (32.0, 20.0), (32.0, 44.0), 6.0),
        ];
        let surface = rasterize_strokes(&strokes, 64, 64, BrushSettings::default());
        let image = surface.export().unwrap();

        assert_eq!(alpha(&image, 15, 32), 255);
        assert_eq!(alpha(&image, 50, 32), 255);
        // Erased crossing
        assert_eq!(alpha(&image, 32, 32), 0);
        // Untouched background
        assert_eq!(alpha(&image, 5, 5), 0);
    }

    #[test]
    fn test_eraser_order_matters() {
        let pen = line(Tool::Pen, (10.0, 32.0), (54.0, 32.0), 10.0);
        let eraser = line(Tool::Eraser, (32.0, 20.0), (32.0, 44.0), 6.0);

        let erased_after = rasterize_strokes(&[pen.clone(), eraser.clone()], 64, 64, BrushSettings::default());
        let erased_before = rasterize_strokes(&[eraser, pen], 64, 64, BrushSettings::default());

        assert_eq!(alpha(&erased_after.export().unwrap(), 32, 32), 0);
        assert_eq!(alpha(&erased_before.export().unwrap(), 32, 32), 255);
    }

    #[test]
    fn test_single_point_stroke_is_a_dot() {
        let stroke = Stroke {
            points: vec![StrokePoint::new(20.0, 20.0)],
            tool: Tool::Pen,
            color: [1.0; 4],
            width: 6.0,
        };
        let image = rasterize_strokes(&[stroke], 40, 40, BrushSettings::default())
            .export()
            .unwrap();
        assert_eq!(alpha(&image, 20, 20), 255);
        assert_eq!(alpha(&image, 30, 20), 0);
    }

    #[test]
    fn test_export_empty_surface_fails() {
        let surface = TiledSurface::with_default_tile_size(0, 10);
        assert_eq!(
            surface.export(),
            Err(ExportError::EmptySurface {
                width: 0,
                height: 10
            })
        );
    }

    #[test]
    fn test_change_tracking() {
        let mut surface = TiledSurface::with_default_tile_size(32, 32);
        assert!(!surface.has_changes());

        surface.execute_all(&stroke_commands(
            &line(Tool::Pen, (4.0, 4.0), (20.0, 4.0), 4.0),
            BrushSettings::default(),
        ));
        assert!(surface.has_changes());

        surface.mark_exported();
        assert!(!surface.has_changes());
    }

    #[test]
    fn test_resize_discards_contents() {
        let mut surface = rasterize_strokes(
            &[line(Tool::Pen, (4.0, 4.0), (20.0, 4.0), 4.0)],
            32,
            32,
            BrushSettings::default(),
        );
        surface.resize(48, 16);

        assert_eq!(surface.dimensions(), (48, 16));
        let image = surface.export().unwrap();
        assert!(image.pixels().all(|p| p.0[3] == 0));
    }
}
