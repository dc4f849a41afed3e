//! Save payloads delivered to the host's completion callback.

use serde::{Deserialize, Serialize};

use super::Stroke;

/// Kinds of recovered failures surfaced alongside a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// The stroke raster could not be read back; only vectors were kept
    CanvasExport,
    /// The source image geometry was not known and the policy refused
    GeometryUnresolved,
    /// The mask could not be persisted remotely
    Upload,
    /// The compressed mask is still over budget after the retry
    SizeBudgetExceeded,
    /// The source image failed to load; only vectors were kept
    ImageLoad,
}

/// A non-fatal problem that occurred while saving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveWarning {
    pub kind: WarningKind,
    pub message: String,
}

impl SaveWarning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Result of a confirmed save (`onSave(maskDataUrl, strokes, uploadedMaskUrl?)`).
///
/// `mask_data_url` is empty when only the vector data could be kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveResult {
    pub mask_data_url: String,
    pub strokes: Vec<Stroke>,
    pub uploaded_mask_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<SaveWarning>,
}

impl SaveResult {
    /// Whether a mask image is attached
    pub fn has_mask(&self) -> bool {
        !self.mask_data_url.is_empty()
    }

    pub fn has_warning(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }
}
