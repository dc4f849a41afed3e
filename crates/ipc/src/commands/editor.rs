//! Editor command types sent by the host UI.

use serde::{Deserialize, Serialize};

use crate::types::{Stroke, Tool};

/// Commands for driving a mask editing session.
///
/// Pointer coordinates are in drawing-surface space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EditorCommand {
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp,
    /// Pointer left the drawing surface
    PointerLeave,
    SetTool { tool: Tool },
    /// Set stroke width in pixels (clamped by the editor)
    SetWidth { width: f32 },
    Undo,
    Redo,
    /// Clear all strokes
    Reset,
    /// Resume a previously saved session
    LoadStrokes { strokes: Vec<Stroke> },
    /// Drawing container resized
    Resize { width: u32, height: u32 },
    /// Tab visibility changed
    SetVisible { visible: bool },
    /// User confirmed the mask
    Confirm,
}

impl EditorCommand {
    /// Whether the command can change the stroke set
    pub fn mutates_paths(&self) -> bool {
        matches!(
            self,
            Self::PointerUp
                | Self::PointerLeave
                | Self::Undo
                | Self::Redo
                | Self::Reset
                | Self::LoadStrokes { .. }
        )
    }
}
