//! Save and restore of a working session

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::annotation::Annotation;
use crate::photo::PhotoError;

/// On-disk session document.
///
/// Field names match the export format of the browser build of this tool:
/// `p1` and `p7` carry the photos as base64 PNG data URLs, and `student` is
/// the label used for output naming. Either photo may be absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionDocument {
    pub student: String,
    pub p1: Option<String>,
    pub p7: Option<String>,
    pub annotations: Vec<Annotation>,
}

/// Errors saving or restoring a session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("photo restore failed: {0}")]
    Photo(#[from] PhotoError),
}

impl SessionDocument {
    /// Write the session to disk as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("saved session to {}", path.display());
        Ok(())
    }

    /// Read a session back from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let doc = serde_json::from_str(&json)?;
        log::info!("loaded session from {}", path.display());
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::Point;

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let doc = SessionDocument {
            student: "Avery".to_string(),
            p1: Some("data:image/png;base64,aGk=".to_string()),
            p7: None,
            annotations: vec![Annotation::line(Point::new(0.0, 0.0), Point::new(5.0, 5.0))],
        };

        doc.save(&path).unwrap();
        let restored = SessionDocument::load(&path).unwrap();
        assert_eq!(restored, doc);
    }

    #[test]
    fn test_loads_browser_export_verbatim() {
        let json = r#"{
            "student": "Jun",
            "p1": "data:image/png;base64,QUJD",
            "p7": "data:image/png;base64,REVG",
            "annotations": [
                { "type": "line", "a": { "x": 10, "y": 20 }, "b": { "x": 30, "y": 40 } },
                { "type": "angle",
                  "A": { "x": 1, "y": 0 }, "B": { "x": 0, "y": 0 }, "C": { "x": 0, "y": 1 },
                  "angle": 90.0 },
                { "type": "text", "x": 12, "y": 34, "text": "keep the left arm straight" }
            ]
        }"#;
        let doc: SessionDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.student, "Jun");
        assert_eq!(doc.annotations.len(), 3);
        assert!(matches!(doc.annotations[1], Annotation::Angle { angle, .. } if angle == 90.0));
    }

    #[test]
    fn test_missing_fields_default() {
        let doc: SessionDocument = serde_json::from_str("{}").unwrap();
        assert_eq!(doc.student, "");
        assert!(doc.p1.is_none());
        assert!(doc.annotations.is_empty());
    }
}
