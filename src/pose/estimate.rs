//! Wire-format pose records and keypoint extraction
//!
//! Pose back ends disagree on their output schema: a keypoint may carry its
//! name in a `name` or a `part` field, coordinates may be plain numbers or
//! wrapped in `{ "value": … }` objects, and positions may be normalized to
//! the unit square or already in pixels. Everything schema-specific stays in
//! this module; the rest of the crate only ever sees `Point`s in the
//! image-pixel frame.

use serde::Deserialize;

use crate::domain::geometry::Point;
use crate::pose::landmark::Landmark;

/// A coordinate that is either a bare number or a `{ "value": … }` wrapper
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Coordinate {
    Plain(f64),
    Wrapped { value: f64 },
}

impl Coordinate {
    /// The numeric value regardless of wrapping
    pub fn value(self) -> f64 {
        match self {
            Coordinate::Plain(v) => v,
            Coordinate::Wrapped { value } => value,
        }
    }
}

/// One keypoint as reported by the detector. Every field is optional because
/// no back end guarantees all of them; unknown fields are ignored.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawKeypoint {
    pub name: Option<String>,
    pub part: Option<String>,
    pub x: Option<Coordinate>,
    pub y: Option<Coordinate>,
    pub score: Option<f64>,
}

impl RawKeypoint {
    fn named(&self, alias: &str) -> bool {
        self.name.as_deref() == Some(alias) || self.part.as_deref() == Some(alias)
    }

    fn point(&self) -> Option<Point> {
        Some(Point::new(self.x?.value(), self.y?.value()))
    }
}

/// One detected subject. Back ends either wrap the keypoints in an object
/// with an optional confidence score, or emit the bare keypoint array.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum PoseEstimate {
    Keyed {
        keypoints: Vec<RawKeypoint>,
        #[serde(default)]
        score: Option<f64>,
    },
    Bare(Vec<RawKeypoint>),
}

impl PoseEstimate {
    /// The keypoint list regardless of wrapping
    pub fn keypoints(&self) -> &[RawKeypoint] {
        match self {
            PoseEstimate::Keyed { keypoints, .. } => keypoints,
            PoseEstimate::Bare(keypoints) => keypoints,
        }
    }

    /// Resolve a logical landmark against this pose.
    ///
    /// Aliases are tried in order; for each, the first keypoint carrying that
    /// name wins, but only if it yields a complete `{x, y}` pair. A keypoint
    /// that matches by name yet lacks a coordinate falls through to the next
    /// alias. Returns `None` when no alias resolves.
    pub fn extract(&self, landmark: Landmark) -> Option<Point> {
        landmark.aliases().iter().find_map(|alias| {
            self.keypoints()
                .iter()
                .find(|kp| kp.named(alias))
                .and_then(RawKeypoint::point)
        })
    }
}

/// Convert a possibly-normalized point to the image-pixel frame.
///
/// When both coordinates are at most 1.0 the point is taken as normalized to
/// the unit square and scaled by the natural image size; otherwise it passes
/// through untouched. A genuine pixel coordinate inside the top-left 1×1
/// square would be misread, which real photographs never produce.
pub fn to_pixel_frame(p: Point, natural_width: u32, natural_height: u32) -> Point {
    if p.x <= 1.0 && p.y <= 1.0 {
        Point::new(p.x * natural_width as f64, p.y * natural_height as f64)
    } else {
        p
    }
}
