//! Vector stroke types, the persisted form of an editing session.

use serde::{Deserialize, Serialize};

use crate::IpcError;

/// Drawing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Pen,
    /// Removes previously drawn coverage under its path
    Eraser,
}

/// A point in drawing-surface space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f32,
    pub y: f32,
}

impl StrokePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f32; 2]> for StrokePoint {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

/// A committed free-hand stroke.
///
/// Points are in drawing-surface space (the fixed-size editing canvas), not in
/// source-image space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<StrokePoint>,
    pub tool: Tool,
    /// RGBA, 0.0-1.0
    pub color: [f32; 4],
    /// Diameter in drawing-surface pixels
    pub width: f32,
}

impl Stroke {
    pub fn is_eraser(&self) -> bool {
        self.tool == Tool::Eraser
    }
}

/// Check a batch of strokes received from a host before replaying them.
pub fn validate_strokes(strokes: &[Stroke]) -> Result<(), IpcError> {
    for (index, stroke) in strokes.iter().enumerate() {
        if stroke.points.is_empty() {
            return Err(IpcError::InvalidStroke {
                index,
                reason: "stroke has no points".into(),
            });
        }
        if let Some(point) = stroke.points.iter().find(|p| !p.is_finite()) {
            return Err(IpcError::InvalidStroke {
                index,
                reason: format!("non-finite point ({}, {})", point.x, point.y),
            });
        }
        if stroke.color.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(IpcError::InvalidStroke {
                index,
                reason: format!("color {:?} outside 0.0-1.0", stroke.color),
            });
        }
        if !stroke.width.is_finite() || stroke.width < 0.0 {
            return Err(IpcError::InvalidStroke {
                index,
                reason: format!("invalid width {}", stroke.width),
            });
        }
    }
    Ok(())
}

/// Parse a persisted stroke list.
pub fn strokes_from_json(json: &str) -> Result<Vec<Stroke>, IpcError> {
    let strokes: Vec<Stroke> = serde_json::from_str(json)?;
    validate_strokes(&strokes)?;
    Ok(strokes)
}

/// Serialize a stroke list for persistence.
pub fn strokes_to_json(strokes: &[Stroke]) -> Result<String, IpcError> {
    Ok(serde_json::to_string(strokes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pen(points: &[[f32; 2]]) -> Stroke {
        Stroke {
            points: points.iter().copied().map(StrokePoint::from).collect(),
            tool: Tool::Pen,
            color: [1.0, 1.0, 1.0, 1.0],
            width: 12.0,
        }
    }

    #[test]
    fn test_tool_wire_names() {
        assert_eq!(serde_json::to_string(&Tool::Pen).unwrap(), "\"pen\"");
        assert_eq!(serde_json::to_string(&Tool::Eraser).unwrap(), "\"eraser\"");
    }

    #[test]
    fn test_strokes_json_preserves_order_and_fields() {
        let mut eraser = pen(&[[5.0, 5.0]]);
        eraser.tool = Tool::Eraser;
        eraser.width = 30.0;
        let strokes = vec![pen(&[[1.0, 2.0], [3.5, 4.25]]), eraser];

        let json = strokes_to_json(&strokes).unwrap();
        let restored = strokes_from_json(&json).unwrap();
        assert_eq!(restored, strokes);
    }

    #[test]
    fn test_reject_empty_stroke() {
        let json = r#"[{"points": [], "tool": "pen", "color": [1,1,1,1], "width": 4}]"#;
        match strokes_from_json(json) {
            Err(IpcError::InvalidStroke { index, .. }) => assert_eq!(index, 0),
            other => panic!("Expected InvalidStroke, got {:?}", other),
        }
    }

    #[test]
    fn test_reject_bad_color() {
        let mut nan = pen(&[[0.0, 0.0]]);
        nan.color[1] = f32::NAN;
        let mut bright = pen(&[[0.0, 0.0]]);
        bright.color = [2.0, 1.0, 1.0, 1.0];

        assert!(matches!(
            validate_strokes(&[nan]),
            Err(IpcError::InvalidStroke { index: 0, .. })
        ));
        assert!(validate_strokes(&[pen(&[[1.0, 1.0]]), bright]).is_err());
    }

    #[test]
    fn test_reject_negative_width() {
        let mut stroke = pen(&[[0.0, 0.0]]);
        stroke.width = -1.0;
        assert!(validate_strokes(&[pen(&[[1.0, 1.0]]), stroke]).is_err());
    }
}
