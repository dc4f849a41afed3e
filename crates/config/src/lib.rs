//! Shared configuration for maskpaint
//!
//! This crate provides the single source of truth for the editor's drawing
//! container, the preview/mask cadences and the upload size budget, shared by
//! the painting core and the headless binary.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default drawing container width in pixels
pub const DEFAULT_CONTAINER_WIDTH: u32 = 512;

/// Default drawing container height in pixels
pub const DEFAULT_CONTAINER_HEIGHT: u32 = 512;

/// Minimum time between two preview exports while the pointer is down
pub const DEFAULT_PREVIEW_THROTTLE_MS: u64 = 30;

/// Quiet period after the last path change before the mask is regenerated
pub const DEFAULT_QUIESCENCE_MS: u64 = 200;

/// Hard cap enforced by the upload endpoint
pub const HARD_SIZE_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Working budget, leaves headroom under [`HARD_SIZE_LIMIT_BYTES`]
pub const DEFAULT_SIZE_LIMIT_BYTES: usize = 9 * 1024 * 1024;

/// Encoder quality for the first attempt (0.0-1.0)
pub const DEFAULT_INITIAL_QUALITY: f32 = 0.8;

/// Encoder quality for the single downscaled retry (0.0-1.0)
pub const DEFAULT_RETRY_QUALITY: f32 = 0.7;

/// Stroke width limit in drawing-surface pixels
pub const MAX_STROKE_WIDTH: f32 = 50.0;

/// Stroke width the editor starts with
pub const DEFAULT_STROKE_WIDTH: f32 = 20.0;

/// What mask generation does when the source image geometry is not known yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeometryPolicy {
    /// Treat the whole drawing surface as the image region
    #[default]
    FullSurface,
    /// Refuse to generate a mask until the image has loaded
    Abort,
}

impl GeometryPolicy {
    /// Parse from a config string (`full-surface` or `abort`)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "full-surface" | "full_surface" | "fullsurface" => Some(Self::FullSurface),
            "abort" => Some(Self::Abort),
            _ => None,
        }
    }
}

/// Editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Drawing container width in logical pixels
    pub container_width: u32,
    /// Drawing container height in logical pixels
    pub container_height: u32,
    pub preview_throttle_ms: u64,
    pub quiescence_ms: u64,
    /// Byte budget the compressed mask must fit in
    pub size_limit_bytes: usize,
    pub initial_quality: f32,
    pub retry_quality: f32,
    pub default_width: f32,
    pub max_width: f32,
    /// Pen color (RGBA, 0.0-1.0)
    pub pen_color: [f32; 4],
    pub geometry_policy: GeometryPolicy,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            container_width: DEFAULT_CONTAINER_WIDTH,
            container_height: DEFAULT_CONTAINER_HEIGHT,
            preview_throttle_ms: DEFAULT_PREVIEW_THROTTLE_MS,
            quiescence_ms: DEFAULT_QUIESCENCE_MS,
            size_limit_bytes: DEFAULT_SIZE_LIMIT_BYTES,
            initial_quality: DEFAULT_INITIAL_QUALITY,
            retry_quality: DEFAULT_RETRY_QUALITY,
            default_width: DEFAULT_STROKE_WIDTH,
            max_width: MAX_STROKE_WIDTH,
            pen_color: [1.0, 1.0, 1.0, 1.0],
            geometry_policy: GeometryPolicy::default(),
        }
    }
}

impl EditorConfig {
    /// Create a config for the given container dimensions
    pub fn new(container_width: u32, container_height: u32) -> Self {
        Self {
            container_width,
            container_height,
            ..Self::default()
        }
    }

    /// Defaults with overrides from `MASKPAINT_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply overrides from a key lookup. Malformed values are skipped.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("MASKPAINT_CONTAINER") {
            match parse_dimensions(&value) {
                Some((w, h)) => {
                    self.container_width = w;
                    self.container_height = h;
                }
                None => warn!("Ignoring MASKPAINT_CONTAINER={value:?}, expected WxH"),
            }
        }
        if let Some(value) = lookup("MASKPAINT_PREVIEW_MS") {
            match value.trim().parse() {
                Ok(ms) => self.preview_throttle_ms = ms,
                Err(_) => warn!("Ignoring MASKPAINT_PREVIEW_MS={value:?}"),
            }
        }
        if let Some(value) = lookup("MASKPAINT_QUIESCENCE_MS") {
            match value.trim().parse() {
                Ok(ms) => self.quiescence_ms = ms,
                Err(_) => warn!("Ignoring MASKPAINT_QUIESCENCE_MS={value:?}"),
            }
        }
        if let Some(value) = lookup("MASKPAINT_SIZE_LIMIT") {
            match value.trim().parse() {
                Ok(limit) => self.size_limit_bytes = limit,
                Err(_) => warn!("Ignoring MASKPAINT_SIZE_LIMIT={value:?}"),
            }
        }
        if let Some(value) = lookup("MASKPAINT_GEOMETRY_POLICY") {
            match GeometryPolicy::parse(&value) {
                Some(policy) => self.geometry_policy = policy,
                None => warn!("Ignoring MASKPAINT_GEOMETRY_POLICY={value:?}"),
            }
        }
    }

    /// Preview throttle as a Duration
    pub fn preview_throttle(&self) -> Duration {
        Duration::from_millis(self.preview_throttle_ms)
    }

    /// Quiescence delay as a Duration
    pub fn quiescence_delay(&self) -> Duration {
        Duration::from_millis(self.quiescence_ms)
    }
}

/// Parse `WxH` (also accepts `x` as `X` or `*`)
fn parse_dimensions(value: &str) -> Option<(u32, u32)> {
    let value = value.trim();
    let (w, h) = value.split_once(['x', 'X', '*'])?;
    let w = w.trim().parse().ok()?;
    let h = h.trim().parse().ok()?;
    if w == 0 || h == 0 {
        return None;
    }
    Some((w, h))
}
