//! Command types for IPC messages.

mod editor;

pub use editor::*;
