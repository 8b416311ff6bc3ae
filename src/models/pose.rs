// Data models for pose landmarks and detector configuration

use serde::{Deserialize, Serialize};

// ==============================================================================
// Body Landmarks (33 keypoints)
// ==============================================================================

/// MediaPipe Pose Landmark indices (33 total)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BodyLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl BodyLandmark {
    /// Number of landmarks in a complete detection result
    pub const COUNT: usize = 33;
}

// ==============================================================================
// Keypoints and Landmark Sets
// ==============================================================================

/// A 3D keypoint with confidence score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint3D {
    pub x: f32, // Normalized [0, 1] for image coordinates
    pub y: f32, // Normalized [0, 1] for image coordinates
    pub z: f32, // Depth (relative to reference point, e.g., hip midpoint)
    pub visibility: f32, // Detection confidence [0, 1]
}

impl Keypoint3D {
    pub fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility,
        }
    }

    pub fn is_visible(&self, threshold: f32) -> bool {
        self.visibility >= threshold
    }
}

/// One frame's complete set of detected body landmarks.
///
/// Validated once at the detector boundary: construction only succeeds with
/// all 33 keypoints present, so downstream geometry can index by anatomical
/// name without bounds checks. A new frame's set supersedes the previous one
/// entirely; sets are never merged.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    points: Vec<Keypoint3D>,
}

impl LandmarkSet {
    /// Build a landmark set from a full detection result.
    ///
    /// Returns None when the keypoint list is incomplete; callers skip the
    /// frame rather than treat it as an error.
    pub fn from_keypoints(points: Vec<Keypoint3D>) -> Option<Self> {
        if points.len() == BodyLandmark::COUNT {
            Some(Self { points })
        } else {
            None
        }
    }

    pub fn point(&self, landmark: BodyLandmark) -> Keypoint3D {
        self.points[landmark as usize]
    }

    pub fn points(&self) -> &[Keypoint3D] {
        &self.points
    }
}

// ==============================================================================
// Detector Configuration
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelComplexity {
    Lite = 0,  // Fastest, less accurate
    Full = 1,  // Balanced
    Heavy = 2, // Slowest, most accurate
}

/// Settings forwarded to the pose detector backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub model_complexity: ModelComplexity,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_complexity: ModelComplexity::Full,
            min_detection_confidence: 0.7,
            min_tracking_confidence: 0.7,
        }
    }
}

// ==============================================================================
// Error Types
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PoseError {
    #[error("Pose detection not initialized")]
    NotInitialized,

    #[error("Posture monitoring already running")]
    AlreadyRunning,

    #[error("Model loading failed: {0}")]
    ModelLoadFailed(String),

    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type PoseResult<T> = Result<T, PoseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypoint3d_visibility() {
        let keypoint = Keypoint3D::new(0.5, 0.5, 0.0, 0.8);
        assert!(keypoint.is_visible(0.5));
        assert!(keypoint.is_visible(0.7));
        assert!(!keypoint.is_visible(0.9));
    }

    #[test]
    fn test_landmark_set_requires_all_keypoints() {
        let incomplete = vec![Keypoint3D::new(0.5, 0.5, 0.0, 1.0); 32];
        assert!(LandmarkSet::from_keypoints(incomplete).is_none());

        let complete = vec![Keypoint3D::new(0.5, 0.5, 0.0, 1.0); BodyLandmark::COUNT];
        assert!(LandmarkSet::from_keypoints(complete).is_some());
    }

    #[test]
    fn test_landmark_set_indexes_by_name() {
        let mut points = vec![Keypoint3D::new(0.0, 0.0, 0.0, 1.0); BodyLandmark::COUNT];
        points[BodyLandmark::LeftEar as usize] = Keypoint3D::new(0.4, 0.3, 0.1, 0.9);

        let set = LandmarkSet::from_keypoints(points).unwrap();
        let ear = set.point(BodyLandmark::LeftEar);
        assert_eq!(ear.x, 0.4);
        assert_eq!(ear.y, 0.3);
        assert_eq!(ear.z, 0.1);
    }

    #[test]
    fn test_detector_config_default() {
        let config = DetectorConfig::default();
        assert_eq!(config.model_complexity, ModelComplexity::Full);
        assert_eq!(config.min_detection_confidence, 0.7);
        assert_eq!(config.min_tracking_confidence, 0.7);
    }
}
