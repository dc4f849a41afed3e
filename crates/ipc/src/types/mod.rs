//! Type definitions for IPC messages.

mod save;
mod stroke;

pub use save::*;
pub use stroke::*;
