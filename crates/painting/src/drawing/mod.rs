//! Drawing surface: the pointer-driven state machine over the stroke log
//!
//! This module connects:
//! - Pointer input (gated to the image region)
//! - Tool state (pen/eraser, width, color)
//! - Stroke recording and the undo/redo log
//!
//! It emits [`RenderCommand`]s describing what to draw and never owns a
//! raster itself, so any [`RenderSink`](crate::RenderSink) can follow it.

mod stroke;
mod undo;

use maskpaint_config::{EditorConfig, MAX_STROKE_WIDTH};

use crate::brush::{BrushEngine, BrushSettings};
use crate::geometry::RenderRect;
use crate::log::{StrokeLog, StrokeLogEvent, StrokeRecorder};
use crate::raster::RenderCommand;
use crate::types::Tool;

/// What a surface operation produced
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SurfaceUpdate {
    /// Commands to forward to the render sink, in order
    pub commands: Vec<RenderCommand>,
    /// Set when the visible stroke set changed
    pub event: Option<StrokeLogEvent>,
}

impl SurfaceUpdate {
    pub(crate) fn draw(commands: Vec<RenderCommand>) -> Self {
        Self {
            commands,
            event: None,
        }
    }

    pub(crate) fn changed(commands: Vec<RenderCommand>, event: StrokeLogEvent) -> Self {
        Self {
            commands,
            event: Some(event),
        }
    }

    /// Whether this update counts as "paths changed"
    pub fn paths_changed(&self) -> bool {
        self.event.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.event.is_none()
    }
}

/// Pointer-driven stroke editor
pub struct DrawingSurface {
    pub(crate) log: StrokeLog,
    pub(crate) recorder: StrokeRecorder,
    pub(crate) brush: BrushEngine,
    pub(crate) brush_settings: BrushSettings,
    pub(crate) tool: Tool,
    pub(crate) width: f32,
    pub(crate) max_width: f32,
    pub(crate) color: [f32; 4],
    /// Region accepting new strokes, in drawing-surface space
    pub(crate) input_region: RenderRect,
    /// False while the source image failed to load
    pub(crate) enabled: bool,
}

impl DrawingSurface {
    /// Create a surface accepting input anywhere in `input_region`
    pub fn new(input_region: RenderRect) -> Self {
        Self::with_config(input_region, &EditorConfig::default())
    }

    pub fn with_config(input_region: RenderRect, config: &EditorConfig) -> Self {
        let max_width = if config.max_width > 0.0 {
            config.max_width
        } else {
            MAX_STROKE_WIDTH
        };
        let brush_settings = BrushSettings::default();
        Self {
            log: StrokeLog::new(),
            recorder: StrokeRecorder::new(),
            brush: BrushEngine::new(brush_settings),
            brush_settings,
            tool: Tool::Pen,
            width: config.default_width.clamp(0.0, max_width),
            max_width,
            color: config.pen_color,
            input_region,
            enabled: true,
        }
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Set stroke width, clamped to `[0, max_width]`. Applies to the next stroke.
    pub fn set_width(&mut self, width: f32) {
        self.width = if width.is_finite() {
            width.clamp(0.0, self.max_width)
        } else {
            0.0
        };
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn set_color(&mut self, color: [f32; 4]) {
        self.color = color;
    }

    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    pub fn set_input_region(&mut self, region: RenderRect) {
        self.input_region = region;
    }

    pub fn input_region(&self) -> RenderRect {
        self.input_region
    }

    /// Enable or disable pointer input (disabled while no valid image)
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Get reference to stroke log
    pub fn log(&self) -> &StrokeLog {
        &self.log
    }

    pub fn brush_settings(&self) -> BrushSettings {
        self.brush_settings
    }
}
