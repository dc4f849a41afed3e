//! Brush engine for dab generation
//!
//! Free-hand strokes are recorded as polylines. The brush engine walks each
//! segment and places circular dabs at a fixed spacing so that fast pointer
//! motion still produces a continuous line.

use glam::Vec2;
use tracing::debug;

use crate::constants::{DAB_SPACING, MIN_DAB_SPACING};

/// Brush parameters shared by every stroke of a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushSettings {
    pub opacity: f32,
    /// Dab spacing as a fraction of the stroke diameter
    pub spacing: f32,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            spacing: DAB_SPACING,
        }
    }
}

/// One circular stamp in drawing-surface pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DabOutput {
    pub x: f32,
    pub y: f32,
    /// Diameter
    pub size: f32,
    pub opacity: f32,
}

/// Places dabs along a polyline at a fixed spacing
///
/// The distance left to the next dab carries over between segments, so
/// many short pointer moves space dabs the same as one long move.
pub struct BrushEngine {
    settings: BrushSettings,
    width: f32,
    last: Option<Vec2>,
    until_next: f32,
}

impl Default for BrushEngine {
    fn default() -> Self {
        Self::new(BrushSettings::default())
    }
}

impl BrushEngine {
    pub fn new(settings: BrushSettings) -> Self {
        Self {
            settings,
            width: 0.0,
            last: None,
            until_next: 0.0,
        }
    }

    /// Start a new stroke with the given diameter
    pub fn begin_stroke(&mut self, width: f32) {
        self.width = width.max(0.0);
        self.end_stroke();
    }

    fn spacing(&self) -> f32 {
        (self.width * self.settings.spacing).max(MIN_DAB_SPACING)
    }

    fn dab_at(&self, at: Vec2) -> DabOutput {
        DabOutput {
            x: at.x,
            y: at.y,
            size: self.width,
            opacity: self.settings.opacity,
        }
    }

    /// Extend the stroke to `(x, y)` and return the dabs it produces
    ///
    /// The first point of a stroke always yields exactly one dab.
    pub fn stroke_to(&mut self, x: f32, y: f32) -> Vec<DabOutput> {
        if self.width <= 0.0 {
            return Vec::new();
        }

        let to = Vec2::new(x, y);
        let Some(from) = self.last else {
            self.last = Some(to);
            self.until_next = self.spacing();
            return vec![self.dab_at(to)];
        };

        let segment = to - from;
        let length = segment.length();
        if length < 0.001 {
            return Vec::new();
        }

        let spacing = self.spacing();
        let mut along = self.until_next;
        let mut dabs = Vec::new();
        while along <= length {
            dabs.push(self.dab_at(from + segment * (along / length)));
            along += spacing;
        }
        self.until_next = along - length;
        self.last = Some(to);

        if !dabs.is_empty() {
            debug!(
                "BrushEngine::stroke_to: {} dabs over {:.1}px ending at ({:.1}, {:.1})",
                dabs.len(),
                length,
                x,
                y
            );
        }
        dabs
    }

    pub fn end_stroke(&mut self) {
        self.last = None;
        self.until_next = 0.0;
    }
}
