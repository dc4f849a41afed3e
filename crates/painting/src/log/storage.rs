//! Append-only stroke storage with an undo/redo cursor.

use crate::types::Stroke;

use super::events::StrokeLogEvent;

/// Ordered log of committed strokes.
///
/// Strokes before the cursor are visible; strokes after it form the redo
/// tail. Committing a new stroke drops the redo tail, so the tail is only
/// non-empty right after one or more undos.
#[derive(Default)]
pub struct StrokeLog {
    strokes: Vec<Stroke>,
    cursor: usize,
    /// Listeners notified of every change
    #[allow(clippy::type_complexity)]
    event_listeners: Vec<Box<dyn Fn(&StrokeLogEvent)>>,
}

impl std::fmt::Debug for StrokeLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrokeLog")
            .field("stroke_count", &self.strokes.len())
            .field("cursor", &self.cursor)
            .field("listener_count", &self.event_listeners.len())
            .finish()
    }
}

impl StrokeLog {
    /// Create a new empty stroke log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finished stroke, discarding any redo tail.
    pub fn commit(&mut self, stroke: Stroke) -> StrokeLogEvent {
        self.strokes.truncate(self.cursor);
        self.strokes.push(stroke);
        self.cursor = self.strokes.len();
        self.emit(StrokeLogEvent::Committed {
            index: self.cursor - 1,
        })
    }

    /// Hide the most recent visible stroke.
    pub fn undo(&mut self) -> Option<StrokeLogEvent> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.emit(StrokeLogEvent::Undone {
            remaining: self.cursor,
        }))
    }

    /// Re-show the next stroke of the redo tail.
    pub fn redo(&mut self) -> Option<StrokeLogEvent> {
        if self.cursor >= self.strokes.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.emit(StrokeLogEvent::Redone {
            visible: self.cursor,
        }))
    }

    /// Remove everything, including the redo tail.
    pub fn clear(&mut self) -> StrokeLogEvent {
        self.strokes.clear();
        self.cursor = 0;
        self.emit(StrokeLogEvent::Cleared)
    }

    /// Replace the log with a saved stroke list; all of it is visible.
    pub fn restore(&mut self, strokes: Vec<Stroke>) -> StrokeLogEvent {
        self.strokes = strokes;
        self.cursor = self.strokes.len();
        self.emit(StrokeLogEvent::Restored {
            count: self.cursor,
        })
    }

    /// Visible strokes in drawing order.
    pub fn active(&self) -> &[Stroke] {
        &self.strokes[..self.cursor]
    }

    /// Undone strokes that `redo` would bring back, oldest first.
    pub fn redo_tail(&self) -> &[Stroke] {
        &self.strokes[self.cursor..]
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.strokes.len()
    }

    /// Number of visible strokes.
    pub fn len(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// Register a listener for log changes.
    pub fn add_event_listener<F>(&mut self, listener: F)
    where
        F: Fn(&StrokeLogEvent) + 'static,
    {
        self.event_listeners.push(Box::new(listener));
    }

    fn emit(&self, event: StrokeLogEvent) -> StrokeLogEvent {
        for listener in &self.event_listeners {
            listener(&event);
        }
        event
    }
}
