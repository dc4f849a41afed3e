//! Stroke recorder for building one stroke from pointer samples.

use crate::types::{Stroke, StrokePoint, Tool};

/// Error type for stroke recording operations.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RecorderError {
    #[error("Stroke not started - call start() first")]
    NotStarted,
    #[error("Stroke already started - call finish() or abort() first")]
    AlreadyStarted,
    #[error("Non-finite point ({x}, {y})")]
    InvalidPoint { x: f32, y: f32 },
}

/// Tool state captured when a stroke starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub tool: Tool,
    pub color: [f32; 4],
    pub width: f32,
}

/// Accumulates the points of the stroke in progress.
///
/// Consecutive duplicate points are dropped. A stroke with a single point is
/// valid and renders as a dot.
#[derive(Debug, Default)]
pub struct StrokeRecorder {
    current: Option<Stroke>,
}

impl StrokeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if currently recording a stroke.
    pub fn is_recording(&self) -> bool {
        self.current.is_some()
    }

    /// Start recording a new stroke at `point`.
    pub fn start(&mut self, style: StrokeStyle, point: StrokePoint) -> Result<(), RecorderError> {
        if self.current.is_some() {
            return Err(RecorderError::AlreadyStarted);
        }
        check_point(point)?;

        self.current = Some(Stroke {
            points: vec![point],
            tool: style.tool,
            color: style.color,
            width: style.width,
        });
        Ok(())
    }

    /// Append a point. Returns false when it duplicated the previous one.
    pub fn add_point(&mut self, point: StrokePoint) -> Result<bool, RecorderError> {
        let stroke = self.current.as_mut().ok_or(RecorderError::NotStarted)?;
        check_point(point)?;

        if stroke.points.last() == Some(&point) {
            return Ok(false);
        }
        stroke.points.push(point);
        Ok(true)
    }

    /// Finish the stroke and hand it over for committing.
    pub fn finish(&mut self) -> Result<Stroke, RecorderError> {
        self.current.take().ok_or(RecorderError::NotStarted)
    }

    /// Drop the stroke in progress.
    pub fn abort(&mut self) -> Result<(), RecorderError> {
        self.current
            .take()
            .map(|_| ())
            .ok_or(RecorderError::NotStarted)
    }

    /// Stroke in progress, if any
    pub fn current(&self) -> Option<&Stroke> {
        self.current.as_ref()
    }

    pub fn current_point_count(&self) -> usize {
        self.current.as_ref().map_or(0, |s| s.points.len())
    }
}

fn check_point(point: StrokePoint) -> Result<(), RecorderError> {
    if point.is_finite() {
        Ok(())
    } else {
        Err(RecorderError::InvalidPoint {
            x: point.x,
            y: point.y,
        })
    }
}
