//! Per-photo view transform state

use crate::domain::geometry::Point;

/// View transform of one loaded photo.
///
/// An image pixel `(px, py)` lands in view space at
/// `(px * scale + offset_x, py * scale + offset_y)`. `mirrored` is a
/// rendering-time horizontal flip about the image's own center; it is never
/// folded into the offset, so toggling it does not move the image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageTransformState {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub mirrored: bool,
}

impl Default for ImageTransformState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            mirrored: false,
        }
    }
}

impl ImageTransformState {
    /// Map an image-pixel point to view space. Mirroring is not applied
    /// here; it only affects how the raster is painted.
    pub fn to_view(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale + self.offset_x,
            p.y * self.scale + self.offset_y,
        )
    }

    /// Center an image of `natural` size in a viewer of `viewer` size at
    /// scale 1. Mirroring is left as it was.
    pub fn fit(&mut self, natural: (u32, u32), viewer: (u32, u32)) {
        self.scale = 1.0;
        self.offset_x = (viewer.0 as f64 - natural.0 as f64) / 2.0;
        self.offset_y = (viewer.1 as f64 - natural.1 as f64) / 2.0;
    }

    /// Back to the identity transform with mirroring cleared
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Set the absolute zoom factor, keeping the current offset. Non-positive
    /// values would break the view mapping and are ignored.
    pub fn set_scale(&mut self, scale: f64) {
        if scale > 0.0 {
            self.scale = scale;
        } else {
            log::warn!("ignoring non-positive zoom factor {scale}");
        }
    }

    /// Translate by a view-space delta
    pub fn drag_by(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_view() {
        let state = ImageTransformState {
            scale: 2.0,
            offset_x: 10.0,
            offset_y: -4.0,
            mirrored: false,
        };
        assert_eq!(
            state.to_view(Point::new(3.0, 5.0)),
            Point::new(16.0, 6.0)
        );
    }

    #[test]
    fn test_fit_centers_at_unit_scale() {
        let mut state = ImageTransformState {
            scale: 3.0,
            offset_x: 99.0,
            offset_y: 99.0,
            mirrored: true,
        };
        state.fit((800, 600), (1280, 720));
        assert_eq!(state.scale, 1.0);
        assert_eq!(state.offset_x, 240.0);
        assert_eq!(state.offset_y, 60.0);
        // fit adjusts placement only
        assert!(state.mirrored);
    }

    #[test]
    fn test_reset_clears_mirroring() {
        let mut state = ImageTransformState {
            scale: 0.5,
            offset_x: 1.0,
            offset_y: 2.0,
            mirrored: true,
        };
        state.reset();
        assert_eq!(state, ImageTransformState::default());
    }

    #[test]
    fn test_set_scale_rejects_non_positive() {
        let mut state = ImageTransformState::default();
        state.set_scale(0.0);
        assert_eq!(state.scale, 1.0);
        state.set_scale(-2.0);
        assert_eq!(state.scale, 1.0);
        state.set_scale(1.4);
        assert_eq!(state.scale, 1.4);
    }

    #[test]
    fn test_drag_accumulates() {
        let mut state = ImageTransformState::default();
        state.drag_by(5.0, -3.0);
        state.drag_by(2.0, 1.0);
        assert_eq!(state.offset_x, 7.0);
        assert_eq!(state.offset_y, -2.0);
    }
}
