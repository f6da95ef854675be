//! Flattens the photo layers and the overlay into one raster

use std::fmt;

use ab_glyph::FontArc;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tiny_skia::{
    Color, FillRule, FilterQuality, IntSize, Mask, PathBuilder, Pixmap, PixmapPaint, Rect,
    Transform,
};

use crate::config::OverlayStyle;
use crate::domain::annotation::Annotation;
use crate::domain::transform::ImageTransformState;
use crate::photo::Photo;
use crate::render::overlay;

/// Blend mode applied to the target layer, using the CSS names so session
/// and config files read naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl BlendMode {
    /// All modes, in the order the blend picker lists them
    pub fn all() -> &'static [BlendMode] {
        &[
            BlendMode::Normal,
            BlendMode::Multiply,
            BlendMode::Screen,
            BlendMode::Overlay,
            BlendMode::Darken,
            BlendMode::Lighten,
            BlendMode::ColorDodge,
            BlendMode::ColorBurn,
            BlendMode::HardLight,
            BlendMode::SoftLight,
            BlendMode::Difference,
            BlendMode::Exclusion,
            BlendMode::Hue,
            BlendMode::Saturation,
            BlendMode::Color,
            BlendMode::Luminosity,
        ]
    }

    /// The CSS name of this mode
    pub fn name(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::Darken => "darken",
            BlendMode::Lighten => "lighten",
            BlendMode::ColorDodge => "color-dodge",
            BlendMode::ColorBurn => "color-burn",
            BlendMode::HardLight => "hard-light",
            BlendMode::SoftLight => "soft-light",
            BlendMode::Difference => "difference",
            BlendMode::Exclusion => "exclusion",
            BlendMode::Hue => "hue",
            BlendMode::Saturation => "saturation",
            BlendMode::Color => "color",
            BlendMode::Luminosity => "luminosity",
        }
    }

    /// Look a mode up by its CSS name
    pub fn from_name(name: &str) -> Option<BlendMode> {
        BlendMode::all().iter().copied().find(|m| m.name() == name)
    }

    fn to_skia(self) -> tiny_skia::BlendMode {
        match self {
            BlendMode::Normal => tiny_skia::BlendMode::SourceOver,
            BlendMode::Multiply => tiny_skia::BlendMode::Multiply,
            BlendMode::Screen => tiny_skia::BlendMode::Screen,
            BlendMode::Overlay => tiny_skia::BlendMode::Overlay,
            BlendMode::Darken => tiny_skia::BlendMode::Darken,
            BlendMode::Lighten => tiny_skia::BlendMode::Lighten,
            BlendMode::ColorDodge => tiny_skia::BlendMode::ColorDodge,
            BlendMode::ColorBurn => tiny_skia::BlendMode::ColorBurn,
            BlendMode::HardLight => tiny_skia::BlendMode::HardLight,
            BlendMode::SoftLight => tiny_skia::BlendMode::SoftLight,
            BlendMode::Difference => tiny_skia::BlendMode::Difference,
            BlendMode::Exclusion => tiny_skia::BlendMode::Exclusion,
            BlendMode::Hue => tiny_skia::BlendMode::Hue,
            BlendMode::Saturation => tiny_skia::BlendMode::Saturation,
            BlendMode::Color => tiny_skia::BlendMode::Color,
            BlendMode::Luminosity => tiny_skia::BlendMode::Luminosity,
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything the compositor needs besides the layers themselves
pub struct ComposeOptions<'a> {
    /// Output canvas width in pixels
    pub width: u32,
    /// Output canvas height in pixels
    pub height: u32,
    /// Opacity of the target layer (0.0-1.0)
    pub overlay_opacity: f32,
    /// Blend mode of the target layer against the backdrop
    pub blend: BlendMode,
    /// Fraction of the target kept visible by the compare wipe, measured
    /// from its left edge in its own frame (1.0 = no wipe)
    pub compare: f64,
    /// Draw the alignment grid over the photos
    pub show_grid: bool,
    /// Draw the center guide cross over the photos
    pub show_guides: bool,
    /// Overlay colors, widths and text sizes
    pub style: &'a OverlayStyle,
    /// Label font; None skips text
    pub font: Option<&'a FontArc>,
}

/// The view-to-canvas transform of one layer, mirror included.
///
/// Mirroring flips about the image's own vertical center line, so the
/// flipped raster occupies exactly the pixels the unflipped one did.
fn layer_transform(photo: &Photo, state: &ImageTransformState) -> Transform {
    let s = state.scale as f32;
    if state.mirrored {
        let tx = (state.offset_x + state.scale * f64::from(photo.width())) as f32;
        Transform::from_row(-s, 0.0, 0.0, s, tx, state.offset_y as f32)
    } else {
        Transform::from_row(
            s,
            0.0,
            0.0,
            s,
            state.offset_x as f32,
            state.offset_y as f32,
        )
    }
}

fn photo_pixmap(photo: &Photo) -> Option<Pixmap> {
    Pixmap::from_vec(
        photo.rgba().as_raw().clone(),
        IntSize::from_wh(photo.width(), photo.height())?,
    )
}

/// Mask that keeps the left `compare` fraction of the image visible, in the
/// image's own frame, carried through the layer transform so the wipe moves
/// and flips with the photo.
fn wipe_mask(
    width: u32,
    height: u32,
    photo: &Photo,
    transform: Transform,
    compare: f64,
) -> Option<Mask> {
    let visible = f64::from(photo.width()) * compare;
    let rect = Rect::from_xywh(0.0, 0.0, visible as f32, photo.height() as f32)?;
    let path = PathBuilder::from_rect(rect);
    let mut mask = Mask::new(width, height)?;
    mask.fill_path(&path, FillRule::Winding, true, transform);
    Some(mask)
}

/// Flatten the overlay into a single image: black canvas, reference photo,
/// target photo with opacity, blend and wipe, then grid, guides and
/// annotations in that order.
pub fn compose(
    reference: Option<(&Photo, &ImageTransformState)>,
    target: Option<(&Photo, &ImageTransformState)>,
    annotations: &[Annotation],
    opts: &ComposeOptions,
) -> RgbaImage {
    if opts.width == 0 || opts.height == 0 {
        return RgbaImage::new(opts.width, opts.height);
    }
    let Some(mut pixmap) = Pixmap::new(opts.width, opts.height) else {
        log::warn!("canvas {}x{} is not renderable", opts.width, opts.height);
        return RgbaImage::new(0, 0);
    };
    pixmap.fill(Color::BLACK);

    if let Some((photo, state)) = reference {
        if let Some(layer) = photo_pixmap(photo) {
            let paint = PixmapPaint {
                quality: FilterQuality::Bilinear,
                ..Default::default()
            };
            pixmap.draw_pixmap(
                0,
                0,
                layer.as_ref(),
                &paint,
                layer_transform(photo, state),
                None,
            );
        }
    }

    if let Some((photo, state)) = target {
        if opts.compare > 0.0 {
            if let Some(layer) = photo_pixmap(photo) {
                let transform = layer_transform(photo, state);
                let mask = if opts.compare < 1.0 {
                    wipe_mask(opts.width, opts.height, photo, transform, opts.compare)
                } else {
                    None
                };
                let paint = PixmapPaint {
                    opacity: opts.overlay_opacity.clamp(0.0, 1.0),
                    blend_mode: opts.blend.to_skia(),
                    quality: FilterQuality::Bilinear,
                };
                pixmap.draw_pixmap(0, 0, layer.as_ref(), &paint, transform, mask.as_ref());
            }
        }
    }

    if opts.show_grid {
        overlay::draw_grid(&mut pixmap, opts.style);
    }
    if opts.show_guides {
        overlay::draw_guides(&mut pixmap, opts.style);
    }
    overlay::draw_annotation_strokes(&mut pixmap, annotations, opts.style);

    let mut img = RgbaImage::new(opts.width, opts.height);
    img.copy_from_slice(pixmap.data());
    overlay::draw_annotation_labels(&mut img, annotations, opts.style, opts.font);
    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    use crate::domain::geometry::Point;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Photo {
        Photo::from_rgba(RgbaImage::from_pixel(width, height, Rgba(rgba)))
    }

    fn options(style: &OverlayStyle, width: u32, height: u32) -> ComposeOptions<'_> {
        ComposeOptions {
            width,
            height,
            overlay_opacity: 1.0,
            blend: BlendMode::Normal,
            compare: 1.0,
            show_grid: false,
            show_guides: false,
            style,
            font: None,
        }
    }

    fn px(img: &RgbaImage, x: u32, y: u32) -> [u8; 4] {
        img.get_pixel(x, y).0
    }

    #[test]
    fn test_reference_layer_is_placed_by_its_transform() {
        let style = OverlayStyle::default();
        let photo = solid(2, 2, [255, 0, 0, 255]);
        let state = ImageTransformState {
            offset_x: 1.0,
            ..Default::default()
        };

        let img = compose(Some((&photo, &state)), None, &[], &options(&style, 4, 2));

        assert_eq!(px(&img, 0, 0), [0, 0, 0, 255]);
        assert_eq!(px(&img, 1, 0), [255, 0, 0, 255]);
        assert_eq!(px(&img, 2, 1), [255, 0, 0, 255]);
        assert_eq!(px(&img, 3, 1), [0, 0, 0, 255]);
    }

    #[test]
    fn test_scale_doubles_coverage() {
        let style = OverlayStyle::default();
        let photo = solid(1, 1, [0, 255, 0, 255]);
        let state = ImageTransformState {
            scale: 2.0,
            ..Default::default()
        };

        let img = compose(Some((&photo, &state)), None, &[], &options(&style, 3, 3));

        assert_eq!(px(&img, 0, 0), [0, 255, 0, 255]);
        assert_eq!(px(&img, 1, 1), [0, 255, 0, 255]);
        assert_eq!(px(&img, 2, 2), [0, 0, 0, 255]);
    }

    #[test]
    fn test_target_opacity_blends_toward_backdrop() {
        let style = OverlayStyle::default();
        let photo = solid(2, 2, [255, 255, 255, 255]);
        let state = ImageTransformState::default();
        let mut opts = options(&style, 2, 2);
        opts.overlay_opacity = 0.5;

        let img = compose(None, Some((&photo, &state)), &[], &opts);

        let p = px(&img, 1, 1);
        assert!((i32::from(p[0]) - 128).abs() <= 2, "got {p:?}");
        assert_eq!(p[3], 255);
    }

    #[test]
    fn test_multiply_blend_against_reference() {
        let style = OverlayStyle::default();
        let reference = solid(2, 2, [200, 100, 50, 255]);
        let target = solid(2, 2, [128, 128, 128, 255]);
        let state = ImageTransformState::default();
        let mut opts = options(&style, 2, 2);
        opts.blend = BlendMode::Multiply;

        let img = compose(
            Some((&reference, &state)),
            Some((&target, &state)),
            &[],
            &opts,
        );

        let p = px(&img, 0, 0);
        assert!((i32::from(p[0]) - 100).abs() <= 2, "got {p:?}");
        assert!((i32::from(p[1]) - 50).abs() <= 2, "got {p:?}");
        assert!((i32::from(p[2]) - 25).abs() <= 2, "got {p:?}");
    }

    #[test]
    fn test_mirror_flips_about_the_image_center() {
        let style = OverlayStyle::default();
        let mut raster = RgbaImage::new(2, 1);
        raster.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        raster.put_pixel(1, 0, Rgba([0, 0, 255, 255]));
        let photo = Photo::from_rgba(raster);
        let state = ImageTransformState {
            mirrored: true,
            ..Default::default()
        };

        let img = compose(None, Some((&photo, &state)), &[], &options(&style, 2, 1));

        assert_eq!(px(&img, 0, 0), [0, 0, 255, 255]);
        assert_eq!(px(&img, 1, 0), [255, 0, 0, 255]);
    }

    #[test]
    fn test_compare_wipe_hides_the_right_of_the_target() {
        let style = OverlayStyle::default();
        let photo = solid(4, 2, [255, 0, 0, 255]);
        let state = ImageTransformState::default();
        let mut opts = options(&style, 4, 2);
        opts.compare = 0.5;

        let img = compose(None, Some((&photo, &state)), &[], &opts);

        assert_eq!(px(&img, 0, 0), [255, 0, 0, 255]);
        assert_eq!(px(&img, 1, 1), [255, 0, 0, 255]);
        assert_eq!(px(&img, 2, 0), [0, 0, 0, 255]);
        assert_eq!(px(&img, 3, 1), [0, 0, 0, 255]);
    }

    #[test]
    fn test_compare_zero_hides_the_target_entirely() {
        let style = OverlayStyle::default();
        let photo = solid(2, 2, [255, 0, 0, 255]);
        let state = ImageTransformState::default();
        let mut opts = options(&style, 2, 2);
        opts.compare = 0.0;

        let img = compose(None, Some((&photo, &state)), &[], &opts);
        assert!(img.pixels().all(|p| p.0 == [0, 0, 0, 255]));
    }

    #[test]
    fn test_annotation_strokes_land_on_top() {
        let style = OverlayStyle::default();
        let photo = solid(8, 8, [0, 0, 255, 255]);
        let state = ImageTransformState::default();
        let annotations = [Annotation::line(Point::new(0.0, 4.0), Point::new(8.0, 4.0))];

        let img = compose(
            Some((&photo, &state)),
            None,
            &annotations,
            &options(&style, 8, 8),
        );

        let p = px(&img, 4, 4);
        assert!(p[0] > 200 && p[2] < 80, "got {p:?}");
    }

    #[test]
    fn test_empty_canvas_does_not_panic() {
        let style = OverlayStyle::default();
        let img = compose(None, None, &[], &options(&style, 0, 0));
        assert_eq!(img.dimensions(), (0, 0));
    }

    #[test]
    fn test_blend_mode_names_round_trip() {
        for mode in BlendMode::all() {
            assert_eq!(BlendMode::from_name(mode.name()), Some(*mode));
        }
        assert_eq!(BlendMode::from_name("soft-light"), Some(BlendMode::SoftLight));
        assert_eq!(BlendMode::from_name("plasma"), None);
    }
}
