//! Stroke log: the undo/redo substrate of an editing session.
//!
//! This module provides:
//! - [`StrokeLog`] - ordered stroke storage with an undo/redo cursor
//! - [`StrokeLogEvent`] - change notifications ("paths changed")
//! - [`StrokeRecorder`] - helper for building a stroke from pointer samples
//!
//! Eraser strokes are ordinary entries tagged [`Tool::Eraser`](crate::Tool);
//! nothing is ever deleted from the log to erase, so replaying the visible
//! strokes in order always reproduces the raster.

mod events;
mod recorder;
mod storage;

pub use events::StrokeLogEvent;
pub use recorder::{RecorderError, StrokeRecorder, StrokeStyle};
pub use storage::StrokeLog;
