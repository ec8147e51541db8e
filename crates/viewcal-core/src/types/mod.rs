//! Data model shared across the workspace.
//!
//! Measurements flow in, screen and mesh descriptions flow out.

mod measurement;
mod screen;

pub use measurement::*;
pub use screen::*;
