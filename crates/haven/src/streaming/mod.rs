//! Chunk streaming around a moving observer.

pub mod manager;
pub mod window;

pub use manager::{StreamState, StreamUpdate, StreamingManager, StreamingStats};
pub use window::{VisibilityWindow, WindowDiff};
