// Geometric feature extraction from one frame of pose landmarks

use crate::models::pose::{BodyLandmark, Keypoint3D, LandmarkSet};

/// Scalar geometry describing head/torso posture for a single frame.
///
/// Recomputed from scratch every frame; carries no identity or history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostureFeatures {
    /// Signed horizontal offset between right shoulder and left ear
    pub forward_lean: f32,
    /// Absolute depth offset between left ear and left hip
    pub side_lean: f32,
    /// Angle in degrees at the left ear between shoulder and nose rays
    pub head_angle: f32,
}

/// Angle in degrees at `vertex` between the rays toward `a` and `b`.
///
/// Uses the image-plane (x, y) components. The cosine is clamped to [-1, 1]
/// before the inverse cosine to tolerate floating-point overshoot on
/// near-collinear points; a zero-length ray yields 0.0.
pub fn angle_between(a: Keypoint3D, vertex: Keypoint3D, b: Keypoint3D) -> f32 {
    let v1 = (a.x - vertex.x, a.y - vertex.y);
    let v2 = (b.x - vertex.x, b.y - vertex.y);

    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();
    if mag1 == 0.0 || mag2 == 0.0 {
        return 0.0;
    }

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let cos = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Compute the per-frame feature triple from a complete landmark set.
///
/// Pure and deterministic: identical coordinates always produce identical
/// features.
pub fn extract_features(landmarks: &LandmarkSet) -> PostureFeatures {
    let nose = landmarks.point(BodyLandmark::Nose);
    let left_ear = landmarks.point(BodyLandmark::LeftEar);
    let left_shoulder = landmarks.point(BodyLandmark::LeftShoulder);
    let right_shoulder = landmarks.point(BodyLandmark::RightShoulder);
    let left_hip = landmarks.point(BodyLandmark::LeftHip);

    PostureFeatures {
        forward_lean: right_shoulder.x - left_ear.x,
        side_lean: (left_ear.z - left_hip.z).abs(),
        // Shrinks as the head pitches down toward the chest
        head_angle: angle_between(left_shoulder, left_ear, nose),
    }
}
