//! Shoulder-based auto-alignment of the two photos

pub mod applier;
pub mod error;
pub mod solver;
pub mod workflow;

pub use applier::apply;
pub use error::AlignError;
pub use solver::{solve, SimilarityTransform};
pub use workflow::auto_align;
