//! Per-screen calibration pipeline.
//!
//! [`calibrate_screen`] runs the stages of `viewcal-linear` in order for one
//! measurement set; [`calibrate_screens`] runs independent sets in parallel.
//! [`document::DisplayDocument`] turns the results into the display
//! configuration JSON.

mod calibration;
pub mod document;

pub use calibration::*;
