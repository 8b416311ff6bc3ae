// Pose detector bridge
// Abstraction over landmark detector backends (MediaPipe sidecar, ONNX, or
// host-provided); the core consumes detection results, it never runs
// inference itself.

use crate::models::pose::{BodyLandmark, DetectorConfig, Keypoint3D, LandmarkSet, PoseResult};
use serde_json::Value;
use tracing::debug;

/// Pose detector backend.
///
/// Implementations wrap whatever actually produces landmarks. A frame with
/// no detectable subject yields `Ok(None)`, never an error; errors are
/// reserved for backend failures (model loading, inference crashes), which
/// the host surfaces as diagnostics.
// TODO: ship an ONNX backend behind an opt-in feature once the exported
// pose model format is settled.
pub trait PoseBackend: Send + Sync {
    /// Initialize the backend with detector settings.
    ///
    /// May load model assets; must complete (or be abandoned) before the
    /// first frame is submitted.
    fn new(config: &DetectorConfig) -> PoseResult<Self>
    where
        Self: Sized;

    /// Run detection on one frame of RGBA pixel data.
    fn process_frame(
        &self,
        frame_data: &[u8],
        width: u32,
        height: u32,
    ) -> PoseResult<Option<LandmarkSet>>;

    /// Whether model assets finished loading
    fn is_initialized(&self) -> bool;

    /// Human-readable backend description
    fn model_info(&self) -> String;
}

/// Decode a sidecar detector payload into a validated landmark set.
///
/// Expects `{"keypoints": [{"x": .., "y": .., "z": .., "visibility": ..},
/// ..]}` with all 33 entries. Returns None for missing or incomplete
/// keypoint lists so callers skip the frame.
pub fn decode_landmarks(payload: &Value) -> Option<LandmarkSet> {
    let keypoints = payload.get("keypoints")?.as_array()?;

    let points: Vec<Keypoint3D> = keypoints
        .iter()
        .map(|kp| Keypoint3D {
            x: kp.get("x").and_then(|v| v.as_f64()).unwrap_or(0.0) as f32,
            y: kp.get("y").and_then(|v| v.as_f64()).unwrap_or(0.0) as f32,
            z: kp.get("z").and_then(|v| v.as_f64()).unwrap_or(0.0) as f32,
            visibility: kp.get("visibility").and_then(|v| v.as_f64()).unwrap_or(0.0) as f32,
        })
        .collect();

    let set = LandmarkSet::from_keypoints(points);
    if set.is_none() {
        debug!(
            count = keypoints.len(),
            expected = BodyLandmark::COUNT,
            "incomplete landmark payload, frame skipped"
        );
    }
    set
}

/// Fallback backend that never detects a subject.
///
/// Keeps hosts running when no detector integration is configured; the
/// monitor simply never leaves the no-baseline state.
pub struct NullBackend {
    config: DetectorConfig,
}

impl PoseBackend for NullBackend {
    fn new(config: &DetectorConfig) -> PoseResult<Self> {
        debug!("using null pose backend (no inference)");
        Ok(Self {
            config: config.clone(),
        })
    }

    fn process_frame(
        &self,
        _frame_data: &[u8],
        _width: u32,
        _height: u32,
    ) -> PoseResult<Option<LandmarkSet>> {
        Ok(None)
    }

    fn is_initialized(&self) -> bool {
        false
    }

    fn model_info(&self) -> String {
        format!(
            "Null pose backend (complexity {:?}, no inference)",
            self.config.model_complexity
        )
    }
}
