//! Annotation types drawn over the composite
//!
//! All coordinates are view-space positions captured when the annotation was
//! placed, so annotations stay put when a photo is re-zoomed underneath them.

use serde::{Deserialize, Serialize};

use crate::domain::geometry::{self, DegenerateInput, Point};

/// One annotation. The serialized form keeps the field names used by the
/// browser build of this tool, so exported sessions load here unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Annotation {
    /// Straight segment between two points
    Line { a: Point, b: Point },
    /// Angle at vertex `b` between the rays toward `a` and `c`, with the
    /// degree value frozen at placement time
    Angle {
        #[serde(rename = "A")]
        a: Point,
        #[serde(rename = "B")]
        b: Point,
        #[serde(rename = "C")]
        c: Point,
        angle: f64,
    },
    /// Text label anchored at its baseline start
    Text { x: f64, y: f64, text: String },
}

impl Annotation {
    /// Line annotation between two points
    pub fn line(a: Point, b: Point) -> Self {
        Annotation::Line { a, b }
    }

    /// Angle annotation, computing the degree value at the vertex `b`
    pub fn angle(a: Point, b: Point, c: Point) -> Result<Self, DegenerateInput> {
        let angle = geometry::angle_at_vertex(a, b, c)?;
        Ok(Annotation::Angle { a, b, c, angle })
    }

    /// Text annotation anchored at `at`
    pub fn text(at: Point, text: impl Into<String>) -> Self {
        Annotation::Text {
            x: at.x,
            y: at.y,
            text: text.into(),
        }
    }
}

/// Ordered annotation list with linear undo/redo.
///
/// `cursor` marks how many entries are visible; `add` truncates any redo
/// history beyond it.
#[derive(Clone, Debug, Default)]
pub struct AnnotationList {
    entries: Vec<Annotation>,
    cursor: usize,
}

impl AnnotationList {
    /// Append an annotation, discarding anything that was undone
    pub fn add(&mut self, annotation: Annotation) {
        self.entries.truncate(self.cursor);
        self.entries.push(annotation);
        self.cursor = self.entries.len();
    }

    /// Hide the most recent visible annotation. Returns false at the start
    /// of history.
    pub fn undo(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    /// Restore the most recently undone annotation. Returns false when there
    /// is nothing to redo.
    pub fn redo(&mut self) -> bool {
        if self.cursor < self.entries.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Drop all annotations and their history
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    /// Replace the whole list, as when restoring a session
    pub fn replace_all(&mut self, entries: Vec<Annotation>) {
        self.cursor = entries.len();
        self.entries = entries;
    }

    /// The currently visible annotations in placement order
    pub fn visible(&self) -> &[Annotation] {
        &self.entries[..self.cursor]
    }

    /// Number of visible annotations
    pub fn len(&self) -> usize {
        self.cursor
    }

    /// True when nothing is visible
    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }
}
