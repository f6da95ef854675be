//! Guides, grid and annotation drawing for the composite
//!
//! Strokes are rasterized with tiny-skia directly on the compositor pixmap.
//! Text goes through imageproc after the pixmap is converted back to an
//! `RgbaImage`, since tiny-skia has no text support.

use std::fs;
use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use tiny_skia::{LineCap, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::config::{OverlayStyle, StrokeColor};
use crate::domain::annotation::Annotation;
use crate::domain::geometry::Point;

/// Grid divisions per axis
pub const GRID_DIVISIONS: u32 = 12;

/// Offset of the degree label from an angle vertex, in view pixels
const ANGLE_LABEL_OFFSET: (f64, f64) = (8.0, -8.0);

/// Fonts probed when the config does not name one
const FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Load the label font: the configured file if set, otherwise the first
/// system font that parses. Returns None when nothing is usable, in which
/// case labels are skipped.
pub fn load_font(style: &OverlayStyle) -> Option<FontArc> {
    if let Some(path) = &style.font_path {
        match try_load_font(path) {
            Some(font) => return Some(font),
            None => log::warn!("configured font {} is unusable", path.display()),
        }
    }
    for path in FONT_PATHS {
        if let Some(font) = try_load_font(Path::new(path)) {
            log::debug!("using label font {path}");
            return Some(font);
        }
    }
    log::warn!("no usable label font found; text will not be rendered");
    None
}

fn try_load_font(path: &Path) -> Option<FontArc> {
    let data = fs::read(path).ok()?;
    FontArc::try_from_vec(data).ok()
}

fn stroke_for(width: f32) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Round,
        ..Default::default()
    }
}

fn paint_for(color: StrokeColor) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.to_skia());
    paint.anti_alias = true;
    paint
}

fn stroke_segments(pixmap: &mut Pixmap, segments: &[(Point, Point)], color: StrokeColor, width: f32) {
    let mut pb = PathBuilder::new();
    for (a, b) in segments {
        pb.move_to(a.x as f32, a.y as f32);
        pb.line_to(b.x as f32, b.y as f32);
    }
    let Some(path) = pb.finish() else {
        return;
    };
    pixmap.stroke_path(
        &path,
        &paint_for(color),
        &stroke_for(width),
        Transform::identity(),
        None,
    );
}

/// Draw the alignment grid across the whole canvas
pub fn draw_grid(pixmap: &mut Pixmap, style: &OverlayStyle) {
    let w = pixmap.width() as f64;
    let h = pixmap.height() as f64;
    let mut segments = Vec::with_capacity(2 * (GRID_DIVISIONS as usize + 1));
    for i in 0..=GRID_DIVISIONS {
        let x = w * f64::from(i) / f64::from(GRID_DIVISIONS);
        segments.push((Point::new(x, 0.0), Point::new(x, h)));
    }
    for i in 0..=GRID_DIVISIONS {
        let y = h * f64::from(i) / f64::from(GRID_DIVISIONS);
        segments.push((Point::new(0.0, y), Point::new(w, y)));
    }
    stroke_segments(pixmap, &segments, style.grid_color, style.grid_width);
}

/// Draw the center guide cross
pub fn draw_guides(pixmap: &mut Pixmap, style: &OverlayStyle) {
    let w = pixmap.width() as f64;
    let h = pixmap.height() as f64;
    let segments = [
        (Point::new(w / 2.0, 0.0), Point::new(w / 2.0, h)),
        (Point::new(0.0, h / 2.0), Point::new(w, h / 2.0)),
    ];
    stroke_segments(pixmap, &segments, style.guide_color, style.guide_width);
}

/// Draw the stroked parts of the annotations: lines and angle rays
pub fn draw_annotation_strokes(pixmap: &mut Pixmap, annotations: &[Annotation], style: &OverlayStyle) {
    for annotation in annotations {
        match annotation {
            Annotation::Line { a, b } => {
                stroke_segments(pixmap, &[(*a, *b)], style.line_color, style.line_width);
            }
            Annotation::Angle { a, b, c, .. } => {
                stroke_segments(
                    pixmap,
                    &[(*b, *a), (*b, *c)],
                    style.angle_color,
                    style.angle_width,
                );
            }
            Annotation::Text { .. } => {}
        }
    }
}

/// Draw the text parts of the annotations: degree labels and text notes.
/// Without a font this is a no-op.
pub fn draw_annotation_labels(
    img: &mut RgbaImage,
    annotations: &[Annotation],
    style: &OverlayStyle,
    font: Option<&FontArc>,
) {
    let Some(font) = font else {
        return;
    };
    for annotation in annotations {
        match annotation {
            Annotation::Line { .. } => {}
            Annotation::Angle { b, angle, .. } => {
                let label = format!("{angle:.1}°");
                draw_label(
                    img,
                    &label,
                    Point::new(b.x + ANGLE_LABEL_OFFSET.0, b.y + ANGLE_LABEL_OFFSET.1),
                    style.angle_color,
                    style.angle_label_size,
                    font,
                );
            }
            Annotation::Text { x, y, text } => {
                draw_label(
                    img,
                    text,
                    Point::new(*x, *y),
                    style.text_color,
                    style.text_size,
                    font,
                );
            }
        }
    }
}

fn draw_label(
    img: &mut RgbaImage,
    text: &str,
    baseline: Point,
    color: StrokeColor,
    size: f32,
    font: &FontArc,
) {
    // The anchor is the text baseline; draw_text_mut wants the glyph box top
    let x = baseline.x.round() as i32;
    let y = (baseline.y - f64::from(size) * 0.8).round() as i32;
    draw_text_mut(
        img,
        Rgba(color.to_rgba_u8()),
        x,
        y,
        PxScale::from(size),
        font,
        text,
    );
}
