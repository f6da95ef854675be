//! The overlay viewer state and its operations
//!
//! Everything a front end would bind its controls to lives here: the two
//! photo layers, opacity, blend and compare settings, annotations with their
//! history, and the session and auto-align entry points. The state is plain
//! data driven by one caller at a time; nothing here spawns threads.

use ab_glyph::FontArc;
use image::RgbaImage;

use crate::align::error::AlignError;
use crate::align::solver::SimilarityTransform;
use crate::align::workflow;
use crate::config::{OverlayStyle, Settings};
use crate::domain::annotation::{Annotation, AnnotationList};
use crate::domain::geometry::{DegenerateInput, Point};
use crate::domain::transform::ImageTransformState;
use crate::photo::{Photo, PhotoError, PhotoSlot};
use crate::pose::detector::PoseDetector;
use crate::render::compositor::{self, BlendMode, ComposeOptions};
use crate::render::overlay;
use crate::session::{SessionDocument, SessionError};

/// One overlay slot: an optional photo and its view transform
#[derive(Debug, Default)]
pub struct PhotoLayer {
    pub photo: Option<Photo>,
    pub state: ImageTransformState,
}

impl PhotoLayer {
    fn as_layer(&self) -> Option<(&Photo, &ImageTransformState)> {
        self.photo.as_ref().map(|photo| (photo, &self.state))
    }
}

/// The whole working state of the overlay viewer
pub struct ViewerState {
    pub reference: PhotoLayer,
    pub target: PhotoLayer,
    /// Viewer canvas size in pixels
    pub viewer_width: u32,
    pub viewer_height: u32,
    /// Opacity of the target layer (0.0-1.0)
    pub overlay_opacity: f32,
    /// Blend mode of the target layer
    pub blend: BlendMode,
    /// Compare wipe fraction of the target kept visible (1.0 = all)
    pub compare: f64,
    pub show_guides: bool,
    pub show_grid: bool,
    pub annotations: AnnotationList,
    /// Student name used for labels and output naming
    pub student: String,
    style: OverlayStyle,
    font: Option<FontArc>,
}

impl ViewerState {
    /// Build a viewer from settings, probing for a label font
    pub fn new(settings: &Settings) -> Self {
        Self {
            reference: PhotoLayer::default(),
            target: PhotoLayer::default(),
            viewer_width: settings.viewer_width,
            viewer_height: settings.viewer_height,
            overlay_opacity: settings.overlay_opacity,
            blend: settings.blend,
            compare: 1.0,
            show_guides: false,
            show_grid: false,
            annotations: AnnotationList::default(),
            student: String::new(),
            font: overlay::load_font(&settings.overlay),
            style: settings.overlay.clone(),
        }
    }

    /// The layer occupying a slot
    pub fn layer(&self, slot: PhotoSlot) -> &PhotoLayer {
        match slot {
            PhotoSlot::Reference => &self.reference,
            PhotoSlot::Target => &self.target,
        }
    }

    /// Mutable access to the layer occupying a slot
    pub fn layer_mut(&mut self, slot: PhotoSlot) -> &mut PhotoLayer {
        match slot {
            PhotoSlot::Reference => &mut self.reference,
            PhotoSlot::Target => &mut self.target,
        }
    }

    /// Put a photo into a slot and refit both layers to the viewer
    pub fn load_photo(&mut self, slot: PhotoSlot, photo: Photo) {
        log::debug!("{slot}: loaded {}x{} photo", photo.width(), photo.height());
        self.layer_mut(slot).photo = Some(photo);
        self.fit_to_viewer();
    }

    /// Center every loaded photo in the viewer at scale 1
    pub fn fit_to_viewer(&mut self) {
        let viewer = (self.viewer_width, self.viewer_height);
        for layer in [&mut self.reference, &mut self.target] {
            if let Some(photo) = &layer.photo {
                layer.state.fit(photo.dimensions(), viewer);
            }
        }
    }

    /// Reset both transforms to identity, clearing mirroring
    pub fn reset_view(&mut self) {
        self.reference.state.reset();
        self.target.state.reset();
    }

    /// Toggle the horizontal flip of the target photo
    pub fn toggle_mirror(&mut self) {
        self.target.state.mirrored = !self.target.state.mirrored;
    }

    /// Exchange the two photos and refit them
    pub fn swap_photos(&mut self) {
        std::mem::swap(&mut self.reference.photo, &mut self.target.photo);
        self.fit_to_viewer();
    }

    /// Set the zoom factor of one layer, keeping its offset
    pub fn set_zoom(&mut self, slot: PhotoSlot, factor: f64) {
        self.layer_mut(slot).state.set_scale(factor);
    }

    /// Pan one layer by a view-space delta
    pub fn drag_by(&mut self, slot: PhotoSlot, dx: f64, dy: f64) {
        self.layer_mut(slot).state.drag_by(dx, dy);
    }

    /// Set the target layer opacity, clamped to 0.0-1.0
    pub fn set_opacity(&mut self, opacity: f32) {
        self.overlay_opacity = opacity.clamp(0.0, 1.0);
    }

    /// Set the target layer blend mode
    pub fn set_blend(&mut self, blend: BlendMode) {
        self.blend = blend;
    }

    /// Set the compare wipe fraction, clamped to 0.0-1.0
    pub fn set_compare(&mut self, fraction: f64) {
        self.compare = fraction.clamp(0.0, 1.0);
    }

    /// Add a line annotation between two view-space points
    pub fn add_line(&mut self, a: Point, b: Point) {
        self.annotations.add(Annotation::line(a, b));
    }

    /// Add an angle annotation and return its degree value
    pub fn add_angle(&mut self, a: Point, b: Point, c: Point) -> Result<f64, DegenerateInput> {
        let annotation = Annotation::angle(a, b, c)?;
        let degrees = match annotation {
            Annotation::Angle { angle, .. } => angle,
            _ => unreachable!(),
        };
        self.annotations.add(annotation);
        Ok(degrees)
    }

    /// Add a text annotation at a view-space point
    pub fn add_text(&mut self, at: Point, text: impl Into<String>) {
        self.annotations.add(Annotation::text(at, text));
    }

    /// Align the target photo to the reference from detected poses.
    ///
    /// Both photos must be loaded. On success the target transform has been
    /// updated and the solved similarity is returned for display; on failure
    /// nothing has changed.
    pub fn auto_align(
        &mut self,
        detector: &mut dyn PoseDetector,
    ) -> Result<SimilarityTransform, AlignError> {
        let reference_photo = self
            .reference
            .photo
            .as_ref()
            .ok_or_else(|| AlignError::Failed(anyhow::anyhow!("no photo loaded in P-1")))?;
        let target_photo = self
            .target
            .photo
            .as_ref()
            .ok_or_else(|| AlignError::Failed(anyhow::anyhow!("no photo loaded in P-7")))?;

        workflow::auto_align(
            detector,
            reference_photo,
            target_photo,
            &self.reference.state,
            &mut self.target.state,
        )
    }

    /// Flatten the current state into one image
    pub fn compose(&self) -> RgbaImage {
        let opts = ComposeOptions {
            width: self.viewer_width,
            height: self.viewer_height,
            overlay_opacity: self.overlay_opacity,
            blend: self.blend,
            compare: self.compare,
            show_grid: self.show_grid,
            show_guides: self.show_guides,
            style: &self.style,
            font: self.font.as_ref(),
        };
        compositor::compose(
            self.reference.as_layer(),
            self.target.as_layer(),
            self.annotations.visible(),
            &opts,
        )
    }

    /// Capture the session: student label, both photos as data URLs, and the
    /// visible annotations
    pub fn to_session(&self) -> Result<SessionDocument, PhotoError> {
        let encode = |layer: &PhotoLayer| -> Result<Option<String>, PhotoError> {
            layer.photo.as_ref().map(Photo::to_data_url).transpose()
        };
        Ok(SessionDocument {
            student: self.student.clone(),
            p1: encode(&self.reference)?,
            p7: encode(&self.target)?,
            annotations: self.annotations.visible().to_vec(),
        })
    }

    /// Restore a session. A missing photo in the document leaves the photo
    /// already in that slot alone; annotations and the student label are
    /// always replaced. Both layers are refit afterwards.
    pub fn restore_session(&mut self, doc: SessionDocument) -> Result<(), SessionError> {
        if let Some(url) = &doc.p1 {
            self.reference.photo = Some(Photo::from_data_url(url)?);
        }
        if let Some(url) = &doc.p7 {
            self.target.photo = Some(Photo::from_data_url(url)?);
        }
        self.student = doc.student;
        self.annotations.replace_all(doc.annotations);
        self.fit_to_viewer();
        Ok(())
    }
}
