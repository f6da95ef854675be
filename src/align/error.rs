//! Error taxonomy for the auto-align workflow

use thiserror::Error;

use crate::domain::geometry::DegenerateInput;
use crate::photo::PhotoSlot;
use crate::pose::landmark::Landmark;

/// Everything that can stop an auto-align attempt.
///
/// Whatever the failure, the attempt is all-or-nothing: nothing is written
/// back to the target transform until every step has succeeded.
#[derive(Debug, Error)]
pub enum AlignError {
    /// The pose back end is missing or failed to initialize
    #[error("pose detector unavailable: {reason}")]
    DetectorUnavailable { reason: String },

    /// The back end ran but found no subject in the named photo
    #[error("no pose detected in {slot}")]
    NoPoseDetected { slot: PhotoSlot },

    /// A required landmark could not be resolved in the named photo
    #[error("pose in {slot} is missing the {landmark} keypoint")]
    InsufficientKeypoints { slot: PhotoSlot, landmark: Landmark },

    /// Zero-length span in the solver math. Valid keypoints never produce
    /// this, but malformed input must not take the process down.
    #[error(transparent)]
    Degenerate(#[from] DegenerateInput),

    /// Any other failure inside the workflow
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl AlignError {
    /// Shorthand for the unavailable-detector case
    pub fn unavailable(reason: impl Into<String>) -> Self {
        AlignError::DetectorUnavailable {
            reason: reason.into(),
        }
    }
}
