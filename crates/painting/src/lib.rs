//! Maskpaint painting system - free-hand mask authoring
//!
//! This crate turns pointer input over a letterboxed source image into a
//! binary mask in source-image space:
//! - [`geometry`] - Letterbox placement and coordinate mapping
//! - [`log`] - Stroke log with undo/redo and the stroke recorder
//! - [`drawing`] - Pointer-driven state machine emitting render commands
//! - [`brush`] - Brush engine for dab generation
//! - [`surface`] / [`tiles`] - CPU raster with dirty tracking
//! - [`raster`] - Render commands, sinks and raster export
//! - [`schedule`] - Preview throttle and quiescence debounce
//! - [`preview`] - Live preview exports while drawing
//! - [`mask`] - Mask rasterization and binarization
//! - [`compress`] - Size-budgeted JPEG encoding
//! - [`loader`] - Source image loaders
//! - [`session`] - Orchestration of one editing session

pub mod brush;
pub mod compress;
pub mod constants;
pub mod drawing;
pub mod geometry;
pub mod loader;
pub mod log;
pub mod mask;
pub mod preview;
pub mod raster;
pub mod schedule;
pub mod session;
pub mod surface;
pub mod tiles;
pub mod types;

pub use brush::*;
pub use compress::*;
pub use constants::*;
pub use drawing::*;
pub use geometry::*;
pub use loader::*;
pub use log::*;
pub use mask::*;
pub use preview::*;
pub use raster::*;
pub use schedule::*;
pub use session::*;
pub use surface::*;
pub use tiles::*;
pub use types::*;
