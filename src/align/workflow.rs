//! The auto-align workflow: detect, solve, apply

use crate::align::applier;
use crate::align::error::AlignError;
use crate::align::solver::{self, SimilarityTransform};
use crate::domain::transform::ImageTransformState;
use crate::photo::{Photo, PhotoSlot};
use crate::pose::detector::PoseDetector;
use crate::pose::estimate::PoseEstimate;

fn first_pose(
    detector: &mut dyn PoseDetector,
    photo: &Photo,
    slot: PhotoSlot,
) -> Result<PoseEstimate, AlignError> {
    let poses = detector.estimate(photo).map_err(AlignError::Failed)?;
    log::debug!("{slot}: detector returned {} pose(s)", poses.len());
    // Detectors order poses most confident first
    poses
        .into_iter()
        .next()
        .ok_or(AlignError::NoPoseDetected { slot })
}

/// Detect poses in both photos, solve the similarity transform, and apply it
/// to the target's view state.
///
/// All-or-nothing: `target_state` is written only after both detections and
/// the solve have succeeded, so a failed attempt leaves the overlay exactly
/// as it was. Taking the detector and the target state by exclusive borrow
/// makes a second in-flight attempt unrepresentable.
pub fn auto_align(
    detector: &mut dyn PoseDetector,
    reference: &Photo,
    target: &Photo,
    reference_state: &ImageTransformState,
    target_state: &mut ImageTransformState,
) -> Result<SimilarityTransform, AlignError> {
    let reference_pose = first_pose(detector, reference, PhotoSlot::Reference)?;
    let target_pose = first_pose(detector, target, PhotoSlot::Target)?;

    let transform = solver::solve(
        &reference_pose,
        &target_pose,
        reference.dimensions(),
        target.dimensions(),
    )?;
    applier::apply(&transform, reference_state, target_state);

    log::info!(
        "auto-aligned: scale x{:.3}, residual rotation {:.1} degrees (reported only)",
        transform.scale,
        transform.rotation_degrees(),
    );
    Ok(transform)
}
