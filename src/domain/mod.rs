//! Pure domain types with minimal dependencies
//!
//! Geometry, view transforms and annotations live here so the solver and the
//! renderer can share them without depending on each other.

pub mod annotation;
pub mod geometry;
pub mod transform;

pub use annotation::*;
pub use geometry::*;
pub use transform::*;
