//! Geometric primitives shared by the solver, the viewer and the renderer

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A 2D point. The coordinate frame (image pixels, normalized unit square or
/// view space) depends on the producer; functions taking a `Point` document
/// the frame they expect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A direction was required but the input vector has zero length
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("degenerate geometry: {0}")]
pub struct DegenerateInput(pub &'static str);

/// Euclidean distance between two points in the same frame
pub fn distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Midpoint of the segment from `a` to `b`
pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Angle at vertex `b` between the rays toward `a` and `c`, in degrees.
///
/// Always in `[0, 180]`; the cosine is clamped before `acos` so rounding on
/// near-parallel rays cannot leave the domain. Fails when `b` coincides with
/// `a` or `c`, where the angle is undefined.
pub fn angle_at_vertex(a: Point, b: Point, c: Point) -> Result<f64, DegenerateInput> {
    let (ux, uy) = (a.x - b.x, a.y - b.y);
    let (vx, vy) = (c.x - b.x, c.y - b.y);
    let mu = ux.hypot(uy);
    let mv = vx.hypot(vy);
    if mu == 0.0 || mv == 0.0 {
        return Err(DegenerateInput("angle vertex coincides with an endpoint"));
    }
    let cos = ((ux * vx + uy * vy) / (mu * mv)).clamp(-1.0, 1.0);
    Ok(cos.acos().to_degrees())
}
