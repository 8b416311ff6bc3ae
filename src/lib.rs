// Webcam posture monitoring core: baseline calibration, per-frame geometric
// deviation tracking, and majority-vote debounced alerts. Pose detection
// itself is an external collaborator behind the detector bridge.

pub mod core;
pub mod detector;
pub mod models;

pub use crate::core::config::MonitorConfig;
pub use crate::core::evaluator::{Baseline, PostureEvaluator};
pub use crate::core::features::{extract_features, PostureFeatures};
pub use crate::core::monitor::PostureMonitor;
pub use crate::detector::bridge::{decode_landmarks, NullBackend, PoseBackend};
pub use crate::models::pose::{
    BodyLandmark, DetectorConfig, Keypoint3D, LandmarkSet, ModelComplexity, PoseError, PoseResult,
};
pub use crate::models::status::{PostureStatus, PostureWarning, RawDeviations};
