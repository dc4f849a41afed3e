//! Event messages from the editor back to the host UI.

use serde::{Deserialize, Serialize};

use crate::types::{SaveResult, SaveWarning};

/// Messages from the editor to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EditorEvent {
    /// Stroke set changed (commit, undo, redo, reset, restore)
    PathsChanged {
        stroke_count: usize,
        can_undo: bool,
        can_redo: bool,
    },

    /// A new live preview is available
    PreviewUpdated { width: u32, height: u32 },

    /// The authoritative mask was regenerated
    MaskUpdated { width: u32, height: u32 },

    /// Source image finished loading
    ImageLoaded { width: u32, height: u32 },

    /// Source image failed to load; drawing is disabled
    ImageFailed { message: String },

    /// Save completed (always sent exactly once per confirm)
    Saved(SaveResult),

    /// Recovered, non-fatal problem
    Warning(SaveWarning),
}
