//! Closed-form stages of a screen calibration: normalization, screen plane
//! fitting, distortion mesh generation and verification.

mod mesh;
mod normalize;
mod plane_fit;
mod screen;
mod verify;

pub use mesh::*;
pub use normalize::*;
pub use plane_fit::*;
pub use screen::*;
pub use verify::*;
