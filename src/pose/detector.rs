//! The pose estimation boundary
//!
//! Detection itself is an external capability. The only implementation that
//! ships here reads pose JSON written next to the photos by whatever tool
//! produced them; anything that can yield `PoseEstimate`s can stand in.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::photo::Photo;
use crate::pose::estimate::PoseEstimate;

/// External pose estimation capability.
///
/// A call may take arbitrarily long and may fail. An empty vector means the
/// back end ran but saw nobody, which is distinct from an error.
pub trait PoseDetector {
    /// Estimate poses for every subject in the photo, most confident first
    fn estimate(&mut self, photo: &Photo) -> Result<Vec<PoseEstimate>>;
}

/// A sidecar file holds either one pose or a whole array of them
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SidecarFile {
    Many(Vec<PoseEstimate>),
    One(PoseEstimate),
}

/// Detector that reads pose JSON from sidecar files keyed by photo path
pub struct SidecarDetector {
    sidecars: HashMap<PathBuf, PathBuf>,
}

impl SidecarDetector {
    /// Register a sidecar pose file per photo path. Fails when any sidecar
    /// is missing, so a misconfiguration surfaces before detection starts.
    pub fn new<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (PathBuf, PathBuf)>,
    {
        let mut sidecars = HashMap::new();
        for (photo, sidecar) in pairs {
            if !sidecar.is_file() {
                return Err(anyhow!("pose file {} not found", sidecar.display()));
            }
            sidecars.insert(photo, sidecar);
        }
        Ok(Self { sidecars })
    }

    fn sidecar_for(&self, photo: &Photo) -> Result<&Path> {
        let source = photo
            .source()
            .ok_or_else(|| anyhow!("photo has no source path to match a pose file against"))?;
        self.sidecars
            .get(source)
            .map(PathBuf::as_path)
            .ok_or_else(|| anyhow!("no pose file registered for {}", source.display()))
    }
}

impl PoseDetector for SidecarDetector {
    fn estimate(&mut self, photo: &Photo) -> Result<Vec<PoseEstimate>> {
        let path = self.sidecar_for(photo)?;
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read pose file {}", path.display()))?;
        let parsed: SidecarFile = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse pose file {}", path.display()))?;
        let poses = match parsed {
            SidecarFile::Many(poses) => poses,
            SidecarFile::One(pose) => vec![pose],
        };
        log::debug!("{}: {} pose(s)", path.display(), poses.len());
        Ok(poses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn photo_with_source(path: &Path) -> Photo {
        let mut photo = Photo::from_rgba(image::RgbaImage::from_pixel(
            4,
            4,
            image::Rgba([0, 0, 0, 255]),
        ));
        photo.set_source(path.to_path_buf());
        photo
    }

    fn write_sidecar(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_missing_sidecar_fails_construction() {
        let result = SidecarDetector::new([(
            PathBuf::from("photo.jpg"),
            PathBuf::from("/nonexistent/pose.json"),
        )]);
        assert!(result.is_err());
    }

    #[test]
    fn test_reads_pose_array() {
        let dir = tempfile::tempdir().unwrap();
        let sidecar = write_sidecar(
            dir.path(),
            "p1.pose.json",
            r#"[ { "keypoints": [ { "name": "left_shoulder", "x": 1.0, "y": 2.0 } ] } ]"#,
        );
        let photo_path = dir.path().join("p1.jpg");
        let mut detector =
            SidecarDetector::new([(photo_path.clone(), sidecar)]).unwrap();
        let poses = detector.estimate(&photo_with_source(&photo_path)).unwrap();
        assert_eq!(poses.len(), 1);
    }

    #[test]
    fn test_reads_single_pose_and_bare_keypoint_array() {
        let dir = tempfile::tempdir().unwrap();
        let single = write_sidecar(
            dir.path(),
            "single.json",
            r#"{ "keypoints": [ { "name": "left_shoulder", "x": 1.0, "y": 2.0 } ] }"#,
        );
        let bare = write_sidecar(
            dir.path(),
            "bare.json",
            r#"[ { "name": "left_shoulder", "x": 1.0, "y": 2.0 } ]"#,
        );
        let single_photo = dir.path().join("a.jpg");
        let bare_photo = dir.path().join("b.jpg");
        let mut detector = SidecarDetector::new([
            (single_photo.clone(), single),
            (bare_photo.clone(), bare),
        ])
        .unwrap();

        let poses = detector.estimate(&photo_with_source(&single_photo)).unwrap();
        assert_eq!(poses.len(), 1);
        assert_eq!(poses[0].keypoints().len(), 1);

        // A bare keypoint array is one pose, not a list of poses
        let poses = detector.estimate(&photo_with_source(&bare_photo)).unwrap();
        assert_eq!(poses.len(), 1);
        assert_eq!(poses[0].keypoints().len(), 1);
    }

    #[test]
    fn test_unregistered_photo_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let sidecar = write_sidecar(dir.path(), "p.json", "[]");
        let mut detector =
            SidecarDetector::new([(dir.path().join("known.jpg"), sidecar)]).unwrap();
        let unknown = photo_with_source(&dir.path().join("unknown.jpg"));
        assert!(detector.estimate(&unknown).is_err());
    }
}
