//! Logical landmark names and their wire-format spellings

use std::fmt;

/// Anatomical landmarks the aligner consumes.
///
/// Only the shoulder pair is needed to solve the overlay transform; the
/// detector may report many more keypoints, which are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Landmark {
    LeftShoulder,
    RightShoulder,
}

impl Landmark {
    /// Wire spellings in resolution order: the snake_case name used by the
    /// MoveNet and BlazePose families first, then the camelCase name used by
    /// PoseNet.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Landmark::LeftShoulder => &["left_shoulder", "leftShoulder"],
            Landmark::RightShoulder => &["right_shoulder", "rightShoulder"],
        }
    }

    /// Canonical name for logs and error messages
    pub fn name(self) -> &'static str {
        self.aliases()[0]
    }
}

impl fmt::Display for Landmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
