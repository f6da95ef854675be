//! Command line interface
//!
//! Two subcommands share one set of view flags: `merge` composes the overlay
//! as-is, `align` runs pose-based auto-alignment first. Both end by writing
//! the composite PNG and, when asked, the session file.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::align::error::AlignError;
use crate::config::Settings;
use crate::domain::geometry::Point;
use crate::photo::{self, Photo, PhotoSlot};
use crate::pose::detector::SidecarDetector;
use crate::render::compositor::BlendMode;
use crate::session::SessionDocument;
use crate::viewer::ViewerState;

#[derive(Parser)]
#[command(name = "swingscope")]
#[command(about = "Overlay two golf swing photos, align them by pose, and annotate", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose the overlay exactly as the flags describe it
    #[command(alias = "m")]
    Merge(MergeArgs),

    /// Auto-align the P-7 photo to the P-1 photo from pose keypoints, then
    /// compose
    #[command(alias = "a")]
    Align(AlignArgs),
}

/// Flags shared by every composing subcommand
#[derive(Args, Debug, Default, Clone)]
pub struct ViewArgs {
    /// Reference photo (P-1)
    #[arg(long, value_name = "IMAGE")]
    pub reference: Option<PathBuf>,

    /// Target photo (P-7), drawn over the reference
    #[arg(long, value_name = "IMAGE")]
    pub target: Option<PathBuf>,

    /// Session file to restore before applying any other flag
    #[arg(long, value_name = "JSON")]
    pub session: Option<PathBuf>,

    /// Write the resulting session out after composing
    #[arg(long, value_name = "JSON")]
    pub save_session: Option<PathBuf>,

    /// Drop any annotations restored from the session
    #[arg(long)]
    pub clear_annotations: bool,

    /// Student name, used in the default output name
    #[arg(long)]
    pub student: Option<String>,

    /// Exchange the two photos after loading
    #[arg(long)]
    pub swap: bool,

    /// Target layer opacity in percent
    #[arg(long, value_name = "PERCENT")]
    pub opacity: Option<u8>,

    /// Blend mode of the target layer (CSS names, e.g. multiply)
    #[arg(long, value_name = "MODE", value_parser = parse_blend)]
    pub blend: Option<BlendMode>,

    /// Mirror the target photo horizontally
    #[arg(long)]
    pub flip: bool,

    /// Zoom of the reference layer in percent
    #[arg(long, value_name = "PERCENT")]
    pub zoom_reference: Option<f64>,

    /// Zoom of the target layer in percent
    #[arg(long, value_name = "PERCENT")]
    pub zoom_target: Option<f64>,

    /// Pan the reference layer by view pixels
    #[arg(long, value_name = "DX,DY", value_parser = parse_pair, allow_negative_numbers = true)]
    pub pan_reference: Option<(f64, f64)>,

    /// Pan the target layer by view pixels
    #[arg(long, value_name = "DX,DY", value_parser = parse_pair, allow_negative_numbers = true)]
    pub pan_target: Option<(f64, f64)>,

    /// Compare wipe: percent of the target kept visible from its left edge
    #[arg(long, value_name = "PERCENT")]
    pub compare: Option<u8>,

    /// Draw the alignment grid
    #[arg(long)]
    pub grid: bool,

    /// Draw the center guides
    #[arg(long)]
    pub guides: bool,

    /// Line annotation, repeatable
    #[arg(long = "line", value_name = "X1,Y1,X2,Y2", value_parser = parse_line, allow_negative_numbers = true)]
    pub lines: Vec<LineSpec>,

    /// Angle annotation with the vertex at B, repeatable
    #[arg(long = "angle", value_name = "AX,AY,BX,BY,CX,CY", value_parser = parse_angle, allow_negative_numbers = true)]
    pub angles: Vec<AngleSpec>,

    /// Text annotation, repeatable; the text may contain commas
    #[arg(long = "text", value_name = "X,Y,TEXT", value_parser = parse_text, allow_negative_numbers = true)]
    pub texts: Vec<TextSpec>,

    /// Output PNG path; defaults to a timestamped name in the current
    /// directory
    #[arg(short, long, value_name = "PNG")]
    pub output: Option<PathBuf>,

    /// Canvas size, overriding the configured viewer size
    #[arg(long, value_name = "WxH", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct MergeArgs {
    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Args, Debug, Clone)]
pub struct AlignArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Pose JSON for the reference photo
    #[arg(long, value_name = "JSON")]
    pub reference_pose: PathBuf,

    /// Pose JSON for the target photo
    #[arg(long, value_name = "JSON")]
    pub target_pose: PathBuf,
}

/// A `--line` value
#[derive(Clone, Debug)]
pub struct LineSpec {
    pub a: Point,
    pub b: Point,
}

/// An `--angle` value
#[derive(Clone, Debug)]
pub struct AngleSpec {
    pub a: Point,
    pub b: Point,
    pub c: Point,
}

/// A `--text` value
#[derive(Clone, Debug)]
pub struct TextSpec {
    pub at: Point,
    pub text: String,
}

fn parse_floats(s: &str, expected: usize) -> Result<Vec<f64>, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != expected {
        return Err(format!(
            "expected {expected} comma-separated numbers, got {}",
            parts.len()
        ));
    }
    parts
        .iter()
        .map(|p| {
            p.trim()
                .parse::<f64>()
                .map_err(|e| format!("bad number {p:?}: {e}"))
        })
        .collect()
}

fn parse_pair(s: &str) -> Result<(f64, f64), String> {
    let v = parse_floats(s, 2)?;
    Ok((v[0], v[1]))
}

fn parse_line(s: &str) -> Result<LineSpec, String> {
    let v = parse_floats(s, 4)?;
    Ok(LineSpec {
        a: Point::new(v[0], v[1]),
        b: Point::new(v[2], v[3]),
    })
}

fn parse_angle(s: &str) -> Result<AngleSpec, String> {
    let v = parse_floats(s, 6)?;
    Ok(AngleSpec {
        a: Point::new(v[0], v[1]),
        b: Point::new(v[2], v[3]),
        c: Point::new(v[4], v[5]),
    })
}

fn parse_text(s: &str) -> Result<TextSpec, String> {
    let mut it = s.splitn(3, ',');
    let (Some(x), Some(y), Some(text)) = (it.next(), it.next(), it.next()) else {
        return Err("expected X,Y,TEXT".to_string());
    };
    let x = x
        .trim()
        .parse()
        .map_err(|e| format!("bad number {x:?}: {e}"))?;
    let y = y
        .trim()
        .parse()
        .map_err(|e| format!("bad number {y:?}: {e}"))?;
    Ok(TextSpec {
        at: Point::new(x, y),
        text: text.to_string(),
    })
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let Some((w, h)) = s.split_once(['x', 'X']) else {
        return Err("expected WIDTHxHEIGHT".to_string());
    };
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("bad width {w:?}: {e}"))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("bad height {h:?}: {e}"))?;
    if width == 0 || height == 0 {
        return Err("canvas size must be non-zero".to_string());
    }
    Ok((width, height))
}

fn parse_blend(s: &str) -> Result<BlendMode, String> {
    BlendMode::from_name(s).ok_or_else(|| {
        let names: Vec<&str> = BlendMode::all().iter().map(|m| m.name()).collect();
        format!("unknown blend mode {s:?}; one of: {}", names.join(", "))
    })
}

/// Parse the command line and dispatch
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load();
    match cli.command {
        Commands::Merge(args) => merge(args, settings),
        Commands::Align(args) => align(args, settings),
    }
}

pub fn merge(args: MergeArgs, settings: Settings) -> Result<()> {
    let mut viewer = build_viewer(&args.view, settings)?;
    apply_view_flags(&args.view, &mut viewer);
    finish(&args.view, &mut viewer)
}

pub fn align(args: AlignArgs, settings: Settings) -> Result<()> {
    let (Some(reference), Some(target)) = (&args.view.reference, &args.view.target) else {
        bail!("align needs both --reference and --target photos to match pose files against");
    };
    let mut detector = SidecarDetector::new([
        (reference.clone(), args.reference_pose.clone()),
        (target.clone(), args.target_pose.clone()),
    ])
    .map_err(|e| AlignError::unavailable(e.to_string()))?;

    let mut viewer = build_viewer(&args.view, settings)?;
    let transform = viewer.auto_align(&mut detector)?;
    println!(
        "aligned P-7 to P-1: scale x{:.3}, rotation {:.1}° (reported, not applied)",
        transform.scale,
        transform.rotation_degrees()
    );

    apply_view_flags(&args.view, &mut viewer);
    finish(&args.view, &mut viewer)
}

/// Settings, session, photos and the student label, in that order
fn build_viewer(view: &ViewArgs, settings: Settings) -> Result<ViewerState> {
    let mut viewer = ViewerState::new(&settings);
    if let Some((width, height)) = view.size {
        viewer.viewer_width = width;
        viewer.viewer_height = height;
    }

    if let Some(path) = &view.session {
        let doc = SessionDocument::load(path)
            .with_context(|| format!("Failed to load session {}", path.display()))?;
        viewer.restore_session(doc)?;
    }
    if view.clear_annotations {
        viewer.annotations.clear();
    }

    if let Some(path) = &view.reference {
        viewer.load_photo(PhotoSlot::Reference, Photo::load(path)?);
    }
    if let Some(path) = &view.target {
        viewer.load_photo(PhotoSlot::Target, Photo::load(path)?);
    }
    if viewer.reference.photo.is_none() && viewer.target.photo.is_none() {
        bail!("nothing to compose; pass --reference, --target or --session");
    }
    if view.swap {
        viewer.swap_photos();
    }

    if let Some(student) = &view.student {
        viewer.student = student.clone();
    }
    Ok(viewer)
}

/// Explicit view flags win over whatever the session or alignment set
fn apply_view_flags(view: &ViewArgs, viewer: &mut ViewerState) {
    if let Some(percent) = view.opacity {
        viewer.set_opacity(f32::from(percent) / 100.0);
    }
    if let Some(blend) = view.blend {
        viewer.set_blend(blend);
    }
    if view.flip {
        viewer.toggle_mirror();
    }
    if let Some(percent) = view.zoom_reference {
        viewer.set_zoom(PhotoSlot::Reference, percent / 100.0);
    }
    if let Some(percent) = view.zoom_target {
        viewer.set_zoom(PhotoSlot::Target, percent / 100.0);
    }
    if let Some((dx, dy)) = view.pan_reference {
        viewer.drag_by(PhotoSlot::Reference, dx, dy);
    }
    if let Some((dx, dy)) = view.pan_target {
        viewer.drag_by(PhotoSlot::Target, dx, dy);
    }
    if let Some(percent) = view.compare {
        viewer.set_compare(f64::from(percent) / 100.0);
    }
    viewer.show_grid = view.grid;
    viewer.show_guides = view.guides;
}

/// Add the annotations, write the composite and, when asked, the session
fn finish(view: &ViewArgs, viewer: &mut ViewerState) -> Result<()> {
    for spec in &view.lines {
        viewer.add_line(spec.a, spec.b);
    }
    for spec in &view.angles {
        let degrees = viewer.add_angle(spec.a, spec.b, spec.c)?;
        println!(
            "angle at ({:.0}, {:.0}): {degrees:.1}°",
            spec.b.x, spec.b.y
        );
    }
    for spec in &view.texts {
        viewer.add_text(spec.at, spec.text.clone());
    }

    let img = viewer.compose();
    let path = view
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&viewer.student));
    let file = File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    photo::write_png(file, &img)?;
    println!("wrote {}", path.display());

    if let Some(path) = &view.save_session {
        viewer.to_session()?.save(path)?;
        println!("saved session {}", path.display());
    }
    Ok(())
}

fn default_output_path(student: &str) -> PathBuf {
    let slug: String = student
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
    let name = if slug.is_empty() {
        format!("Overlay_{stamp}.png")
    } else {
        format!("Overlay_{slug}_{stamp}.png")
    };
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_pair_and_line() {
        assert_eq!(parse_pair("3, -4.5").unwrap(), (3.0, -4.5));
        assert!(parse_pair("3").is_err());

        let line = parse_line("0,0, 10, 20").unwrap();
        assert_eq!(line.a, Point::new(0.0, 0.0));
        assert_eq!(line.b, Point::new(10.0, 20.0));
        assert!(parse_line("0,0,10").is_err());
    }

    #[test]
    fn test_parse_text_keeps_commas_in_the_text() {
        let text = parse_text("120,80,head down, eyes on the ball").unwrap();
        assert_eq!(text.at, Point::new(120.0, 80.0));
        assert_eq!(text.text, "head down, eyes on the ball");
        assert!(parse_text("only,two").is_err());
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1280x720").unwrap(), (1280, 720));
        assert_eq!(parse_size("64X48").unwrap(), (64, 48));
        assert!(parse_size("1280").is_err());
        assert!(parse_size("0x720").is_err());
    }

    #[test]
    fn test_parse_blend() {
        assert_eq!(parse_blend("multiply").unwrap(), BlendMode::Multiply);
        assert_eq!(parse_blend("color-dodge").unwrap(), BlendMode::ColorDodge);
        assert!(parse_blend("plasma").is_err());
    }

    #[test]
    fn test_default_output_name_carries_the_student() {
        let path = default_output_path("Sam O'Neil");
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("Overlay_Sam_O_Neil_"), "got {name}");
        assert!(name.ends_with(".png"));

        let plain = default_output_path("  ");
        let name = plain.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("Overlay_2"), "got {name}");
    }

    fn save_photo(dir: &std::path::Path, name: &str, rgba: [u8; 4]) -> PathBuf {
        let path = dir.join(name);
        Photo::from_rgba(RgbaImage::from_pixel(16, 16, Rgba(rgba)))
            .save_png(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_merge_writes_the_composite_and_session() {
        let dir = tempfile::tempdir().unwrap();
        let reference = save_photo(dir.path(), "p1.png", [200, 0, 0, 255]);
        let out = dir.path().join("out.png");
        let session = dir.path().join("session.json");

        let args = MergeArgs {
            view: ViewArgs {
                reference: Some(reference),
                student: Some("Sam".to_string()),
                lines: vec![parse_line("0,0,10,10").unwrap()],
                output: Some(out.clone()),
                save_session: Some(session.clone()),
                size: Some((32, 32)),
                ..Default::default()
            },
        };
        merge(args, Settings::default()).unwrap();

        let composite = Photo::load(&out).unwrap();
        assert_eq!(composite.dimensions(), (32, 32));

        let doc = SessionDocument::load(&session).unwrap();
        assert_eq!(doc.student, "Sam");
        assert!(doc.p1.is_some());
        assert_eq!(doc.annotations.len(), 1);
    }

    #[test]
    fn test_merge_without_photos_is_an_error() {
        let args = MergeArgs::default();
        assert!(merge(args, Settings::default()).is_err());
    }

    #[test]
    fn test_align_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let reference = save_photo(dir.path(), "p1.png", [200, 0, 0, 255]);
        let target = save_photo(dir.path(), "p7.png", [0, 0, 200, 255]);
        let reference_pose = dir.path().join("p1.pose.json");
        let target_pose = dir.path().join("p7.pose.json");
        std::fs::write(
            &reference_pose,
            r#"[ { "keypoints": [
                { "name": "left_shoulder", "x": 2.0, "y": 8.0 },
                { "name": "right_shoulder", "x": 10.0, "y": 8.0 }
            ] } ]"#,
        )
        .unwrap();
        std::fs::write(
            &target_pose,
            r#"[ { "keypoints": [
                { "name": "left_shoulder", "x": 2.0, "y": 4.0 },
                { "name": "right_shoulder", "x": 6.0, "y": 4.0 }
            ] } ]"#,
        )
        .unwrap();
        let out = dir.path().join("aligned.png");

        let args = AlignArgs {
            view: ViewArgs {
                reference: Some(reference),
                target: Some(target),
                output: Some(out.clone()),
                size: Some((32, 32)),
                ..Default::default()
            },
            reference_pose,
            target_pose,
        };
        align(args, Settings::default()).unwrap();

        assert!(out.is_file());
    }

    #[test]
    fn test_align_with_missing_pose_file_fails_before_loading_photos() {
        let dir = tempfile::tempdir().unwrap();
        let args = AlignArgs {
            view: ViewArgs {
                reference: Some(dir.path().join("p1.png")),
                target: Some(dir.path().join("p7.png")),
                ..Default::default()
            },
            reference_pose: dir.path().join("missing.json"),
            target_pose: dir.path().join("missing.json"),
        };
        let err = align(args, Settings::default()).unwrap_err();
        assert!(err.to_string().contains("not found"), "got {err}");
    }
}
