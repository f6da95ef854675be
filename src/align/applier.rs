//! Applies a solved similarity transform to the target view state

use crate::align::solver::SimilarityTransform;
use crate::domain::transform::ImageTransformState;

/// Mutate `target` so its anchor lands exactly on the reference anchor in
/// view space.
///
/// The scale factor is folded in first; the offset correction is then the
/// gap between where the target anchor sits under the new scale and old
/// offset, and where the reference anchor sits. Order matters: correcting
/// the offset against the pre-scale anchor position would leave the anchor
/// displaced by the scale change. The reference state is never touched, and
/// the mirror flag on the target is left alone.
pub fn apply(
    transform: &SimilarityTransform,
    reference: &ImageTransformState,
    target: &mut ImageTransformState,
) {
    target.scale *= transform.scale;

    let current = target.to_view(transform.anchor_target);
    let desired = reference.to_view(transform.anchor_reference);
    target.offset_x += desired.x - current.x;
    target.offset_y += desired.y - current.y;

    log::debug!(
        "applied alignment: scale={:.4} offset=({:.1},{:.1})",
        target.scale,
        target.offset_x,
        target.offset_y,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::Point;

    fn transform() -> SimilarityTransform {
        SimilarityTransform {
            scale: 2.0,
            rotation: 0.0,
            anchor_reference: Point::new(200.0, 200.0),
            anchor_target: Point::new(100.0, 100.0),
        }
    }

    #[test]
    fn test_scale_then_offset_order() {
        let reference = ImageTransformState {
            scale: 1.0,
            offset_x: 500.0,
            offset_y: 300.0,
            mirrored: false,
        };
        let mut target = ImageTransformState::default();

        apply(&transform(), &reference, &mut target);

        assert_eq!(target.scale, 2.0);
        assert_eq!(target.offset_x, 500.0);
        assert_eq!(target.offset_y, 300.0);
    }

    #[test]
    fn test_anchors_coincide_in_view_space() {
        let t = SimilarityTransform {
            scale: 0.75,
            rotation: 0.1,
            anchor_reference: Point::new(312.5, 118.25),
            anchor_target: Point::new(74.0, 260.0),
        };
        let reference = ImageTransformState {
            scale: 1.3,
            offset_x: -42.0,
            offset_y: 17.5,
            mirrored: false,
        };
        let mut target = ImageTransformState {
            scale: 0.9,
            offset_x: 61.0,
            offset_y: -8.0,
            mirrored: false,
        };

        apply(&t, &reference, &mut target);

        let got = target.to_view(t.anchor_target);
        let want = reference.to_view(t.anchor_reference);
        assert!((got.x - want.x).abs() < 1e-9);
        assert!((got.y - want.y).abs() < 1e-9);
    }

    #[test]
    fn test_reapplying_keeps_the_anchor_in_place() {
        let reference = ImageTransformState {
            scale: 1.0,
            offset_x: 500.0,
            offset_y: 300.0,
            mirrored: false,
        };
        let mut target = ImageTransformState::default();
        let t = transform();

        apply(&t, &reference, &mut target);
        let first = target.to_view(t.anchor_target);
        apply(&t, &reference, &mut target);
        let second = target.to_view(t.anchor_target);

        assert!((first.x - second.x).abs() < 1e-9);
        assert!((first.y - second.y).abs() < 1e-9);
    }

    #[test]
    fn test_mirror_flag_is_preserved() {
        let reference = ImageTransformState::default();
        let mut target = ImageTransformState {
            mirrored: true,
            ..Default::default()
        };
        apply(&transform(), &reference, &mut target);
        assert!(target.mirrored);
    }
}
