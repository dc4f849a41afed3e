//! Events emitted by the stroke log.

/// Stroke log changes. Every variant means "the visible paths changed".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrokeLogEvent {
    /// A stroke was appended; any redo tail was discarded.
    Committed { index: usize },
    /// The most recent visible stroke was hidden.
    Undone { remaining: usize },
    /// A previously undone stroke became visible again.
    Redone { visible: usize },
    /// All strokes were removed.
    Cleared,
    /// The log was replaced by a previously saved stroke list.
    Restored { count: usize },
}
