//! Core math and data model for `viewcal`.
//!
//! This crate provides the building blocks shared by every other crate in
//! the workspace:
//!
//! - linear algebra type aliases (`Real`, `Vec2`, `Pt3`, and friends) and the
//!   eye-space geometry primitives (`rotation_about_y`, `project_onto_plane`),
//! - the screen plane type with named coefficient accessors,
//! - inclusive range constraints with a first-class "unbounded" state,
//! - measurement, screen and mesh description types,
//! - the run-wide [`Config`] and the [`CalibrationError`] kinds.
//!
//! Eye-space conventions: the eye sits at the origin looking down −Z with +Y
//! up. Angle space and device space are related by
//! `atan-X ≡ −Z` and `atan-Y ≡ −X`, which is what [`rotation_about_y`]
//! encodes.
//!
//! # Example
//!
//! ```
//! use viewcal_core::{project_onto_plane, Pt3, ScreenPlane, Vec3};
//!
//! // Screen plane z = -2, normal pointing away from the eye.
//! let plane = ScreenPlane::from_normal_and_offset(Vec3::new(0.0, 0.0, -1.0), -2.0);
//! let hit = project_onto_plane(&Pt3::new(0.1, 0.2, -1.0), &plane).unwrap();
//! assert!((hit.z + 2.0).abs() < 1e-12);
//! ```

/// View angle ↔ eye-space ray conversions.
mod angles;
/// Inclusive range constraints.
mod bounds;
/// Run-wide configuration.
mod config;
mod error;
/// Linear algebra type aliases and geometry primitives.
mod math;
mod plane;
/// Deterministic synthetic data generation helpers.
///
/// Used by workspace tests to build measurement sets from a known screen.
pub mod synthetic;
/// Measurement, screen and mesh description types.
mod types;

pub use angles::*;
pub use bounds::*;
pub use config::*;
pub use error::*;
pub use math::*;
pub use plane::*;
pub use types::*;
