//! Similarity solve between two shoulder pairs

use crate::align::error::AlignError;
use crate::domain::geometry::{self, DegenerateInput, Point};
use crate::photo::PhotoSlot;
use crate::pose::estimate::{to_pixel_frame, PoseEstimate};
use crate::pose::landmark::Landmark;

/// The similarity mapping that brings the target photo's shoulder frame onto
/// the reference's.
///
/// `scale` and the two anchors drive the applier. `rotation` is reported for
/// display but deliberately never applied: rotating a photo of a tilted
/// golfer reads as a worse comparison than leaving both uprights alone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimilarityTransform {
    /// Uniform scale factor for the target photo
    pub scale: f64,
    /// Residual rotation in radians, positive turning the target shoulder
    /// line clockwise on screen (y grows downward)
    pub rotation: f64,
    /// Shoulder midpoint of the reference photo, image-pixel frame
    pub anchor_reference: Point,
    /// Shoulder midpoint of the target photo, image-pixel frame
    pub anchor_target: Point,
}

impl SimilarityTransform {
    /// Residual rotation in degrees
    pub fn rotation_degrees(&self) -> f64 {
        self.rotation.to_degrees()
    }
}

fn shoulder_pair(
    pose: &PoseEstimate,
    slot: PhotoSlot,
    natural: (u32, u32),
) -> Result<(Point, Point), AlignError> {
    let resolve = |landmark: Landmark| -> Result<Point, AlignError> {
        let p = pose
            .extract(landmark)
            .ok_or(AlignError::InsufficientKeypoints { slot, landmark })?;
        Ok(to_pixel_frame(p, natural.0, natural.1))
    };
    Ok((
        resolve(Landmark::LeftShoulder)?,
        resolve(Landmark::RightShoulder)?,
    ))
}

/// Solve the similarity transform from two poses.
///
/// Shoulder keypoints are resolved per photo, converted to the image-pixel
/// frame using that photo's natural size, and reduced to a scale, a residual
/// rotation and the two shoulder midpoints. Fails when a shoulder is missing
/// or either shoulder span has zero length.
pub fn solve(
    reference: &PoseEstimate,
    target: &PoseEstimate,
    reference_natural: (u32, u32),
    target_natural: (u32, u32),
) -> Result<SimilarityTransform, AlignError> {
    let (ref_left, ref_right) = shoulder_pair(reference, PhotoSlot::Reference, reference_natural)?;
    let (tgt_left, tgt_right) = shoulder_pair(target, PhotoSlot::Target, target_natural)?;

    let reference_span = geometry::distance(ref_left, ref_right);
    let target_span = geometry::distance(tgt_left, tgt_right);
    if target_span == 0.0 {
        return Err(DegenerateInput("target shoulder span has zero length").into());
    }
    if reference_span == 0.0 {
        return Err(DegenerateInput("reference shoulder span has zero length").into());
    }

    let rotation = (ref_right.y - ref_left.y).atan2(ref_right.x - ref_left.x)
        - (tgt_right.y - tgt_left.y).atan2(tgt_right.x - tgt_left.x);

    let transform = SimilarityTransform {
        scale: reference_span / target_span,
        rotation,
        anchor_reference: geometry::midpoint(ref_left, ref_right),
        anchor_target: geometry::midpoint(tgt_left, tgt_right),
    };
    log::debug!(
        "solved similarity: scale={:.4} rotation={:.2}deg anchors=({:.1},{:.1})->({:.1},{:.1})",
        transform.scale,
        transform.rotation_degrees(),
        transform.anchor_target.x,
        transform.anchor_target.y,
        transform.anchor_reference.x,
        transform.anchor_reference.y,
    );
    Ok(transform)
}
