//! Pose detection types and the keypoint extraction adapter

pub mod detector;
pub mod estimate;
pub mod landmark;

pub use detector::*;
pub use estimate::*;
pub use landmark::*;
