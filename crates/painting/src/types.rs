use serde::{Deserialize, Serialize};

pub use maskpaint_ipc::{Stroke, StrokePoint, Tool};

/// How a dab combines with the raster under it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    Normal,
    /// Destination-out
    Erase,
}

impl From<Tool> for BlendMode {
    fn from(tool: Tool) -> Self {
        match tool {
            Tool::Pen => BlendMode::Normal,
            Tool::Eraser => BlendMode::Erase,
        }
    }
}

/// Pixel dimensions of an image or container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_vec2(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width as f32, self.height as f32)
    }
}

impl From<(u32, u32)> for ImageDimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}
