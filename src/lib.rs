//! Golf swing overlay tool
//!
//! Loads two photographs of a swing, the P-1 address position and the P-7
//! impact position, stacks them with opacity and blend control, and aligns
//! the target to the reference by matching shoulder keypoints from a pose
//! detector. Lines, angles and text can be drawn over the result before it
//! is flattened to a PNG. Sessions round-trip through the JSON layout used
//! by the browser build of this tool.

pub mod align;
pub mod cli;
pub mod config;
pub mod domain;
pub mod photo;
pub mod pose;
pub mod render;
pub mod session;
pub mod viewer;
