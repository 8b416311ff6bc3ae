// Posture evaluation - compares per-frame geometry against a captured
// baseline and debounces deviations into stable warnings

use crate::core::features::{extract_features, PostureFeatures};
use crate::core::window::DeviationWindow;
use crate::models::pose::LandmarkSet;
use crate::models::status::{PostureStatus, PostureWarning, RawDeviations};
use tracing::{debug, info};

/// Sliding window length, in processed frames
pub const WINDOW_SIZE: usize = 100;
/// Samples within a full window that must be flagged before a warning fires
pub const REQUIRED_BAD: usize = 90;

// Per-frame deviation thresholds against the baseline
const FORWARD_LEAN_THRESHOLD: f32 = 0.01;
const SIDE_LEAN_THRESHOLD: f32 = 0.05;
const HEAD_ANGLE_THRESHOLD: f32 = 10.0; // degrees

// Score deductions for the instantaneous per-frame classification
const FORWARD_LEAN_PENALTY: i32 = 20;
const SIDE_LEAN_PENALTY: i32 = 15;
const HEAD_ANGLE_PENALTY: i32 = 15;

/// Reference posture captured from a user-selected frame
#[derive(Debug, Clone)]
pub struct Baseline {
    pub features: PostureFeatures,
    pub captured_at: i64, // epoch millis
}

/// Owns all posture-tracking state for a single subject.
///
/// Holds the optional baseline, one deviation window per category, the most
/// recent landmark set, and the currently published status. Nothing outside
/// this struct mutates that state; the monitor drives it through the methods
/// below. Normal operation never returns an error - missing input degrades
/// to "no update this frame".
pub struct PostureEvaluator {
    baseline: Option<Baseline>,
    forward_window: DeviationWindow,
    side_window: DeviationWindow,
    head_window: DeviationWindow,
    last_landmarks: Option<LandmarkSet>,
    status: PostureStatus,
}

impl PostureEvaluator {
    pub fn new() -> Self {
        Self {
            baseline: None,
            forward_window: DeviationWindow::new(WINDOW_SIZE),
            side_window: DeviationWindow::new(WINDOW_SIZE),
            head_window: DeviationWindow::new(WINDOW_SIZE),
            last_landmarks: None,
            status: PostureStatus::default(),
        }
    }

    /// Capture the most recently seen frame as the reference posture.
    ///
    /// Returns false when no frame has been observed yet. A successful
    /// capture fully replaces any previous baseline and clears all window
    /// and warning state; score and raw numbers refresh on the next
    /// processed frame.
    pub fn capture_baseline(&mut self) -> bool {
        let Some(landmarks) = self.last_landmarks.as_ref() else {
            return false;
        };

        let features = extract_features(landmarks);
        info!(
            forward_lean = features.forward_lean,
            side_lean = features.side_lean,
            head_angle = features.head_angle,
            "baseline posture captured"
        );

        self.baseline = Some(Baseline {
            features,
            captured_at: chrono::Utc::now().timestamp_millis(),
        });
        self.forward_window.clear();
        self.side_window.clear();
        self.head_window.clear();
        self.status.warnings.clear();
        true
    }

    /// Evaluate one frame's landmarks against the baseline.
    ///
    /// The frame is always remembered for later baseline capture. Without a
    /// baseline the published status stays frozen; per-frame scoring only
    /// makes sense relative to a reference.
    pub fn process_frame(&mut self, landmarks: LandmarkSet) -> &PostureStatus {
        let features = extract_features(&landmarks);
        self.last_landmarks = Some(landmarks);

        let Some(baseline) = self.baseline.as_ref() else {
            return &self.status;
        };

        let forward_diff = (features.forward_lean - baseline.features.forward_lean).abs();
        let side_diff = (features.side_lean - baseline.features.side_lean).abs();
        let angle_diff = (features.head_angle - baseline.features.head_angle).abs();

        let forward_bad = forward_diff > FORWARD_LEAN_THRESHOLD;
        let side_bad = side_diff > SIDE_LEAN_THRESHOLD;
        let head_bad = angle_diff > HEAD_ANGLE_THRESHOLD;

        self.forward_window.push(forward_bad);
        self.side_window.push(side_bad);
        self.head_window.push(head_bad);

        let mut warnings = Vec::new();
        if self.forward_window.is_sustained(REQUIRED_BAD) {
            warnings.push(PostureWarning::ForwardLean);
        }
        if self.side_window.is_sustained(REQUIRED_BAD) {
            warnings.push(PostureWarning::SideLean);
        }
        if self.head_window.is_sustained(REQUIRED_BAD) {
            warnings.push(PostureWarning::HeadLowered);
        }

        // Score reacts to the current frame; warnings stay debounced
        let mut score = 100i32;
        if forward_bad {
            score -= FORWARD_LEAN_PENALTY;
        }
        if side_bad {
            score -= SIDE_LEAN_PENALTY;
        }
        if head_bad {
            score -= HEAD_ANGLE_PENALTY;
        }

        self.status = PostureStatus {
            score: score.clamp(0, 100) as u8,
            warnings,
            raw: RawDeviations {
                forward_diff: Some(forward_diff),
                side_diff: Some(side_diff),
                angle_diff: Some(angle_diff),
            },
        };

        debug!(
            forward_diff,
            side_diff,
            angle_diff,
            forward_window = self.forward_window.ones(),
            side_window = self.side_window.ones(),
            head_window = self.head_window.ones(),
            window_len = self.forward_window.len(),
            score = self.status.score,
            "frame evaluated"
        );

        &self.status
    }

    /// Empty the published warnings list without touching the windows.
    ///
    /// A still-failing condition reappears on the next processed frame,
    /// since the window counters keep their history.
    pub fn clear_warnings(&mut self) {
        self.status.warnings.clear();
    }

    /// Return to the initial state: no baseline, empty windows, no
    /// remembered frame, default status.
    pub fn reset(&mut self) {
        self.baseline = None;
        self.forward_window.clear();
        self.side_window.clear();
        self.head_window.clear();
        self.last_landmarks = None;
        self.status = PostureStatus::default();
    }

    pub fn baseline_set(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn baseline(&self) -> Option<&Baseline> {
        self.baseline.as_ref()
    }

    pub fn status(&self) -> &PostureStatus {
        &self.status
    }
}

impl Default for PostureEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pose::{BodyLandmark, Keypoint3D};

    fn keypoint(x: f32, y: f32, z: f32) -> Keypoint3D {
        Keypoint3D::new(x, y, z, 1.0)
    }

    fn pose_with(adjust: impl FnOnce(&mut Vec<Keypoint3D>)) -> LandmarkSet {
        let mut points = vec![keypoint(0.5, 0.5, 0.0); BodyLandmark::COUNT];
        points[BodyLandmark::Nose as usize] = keypoint(0.4, 0.5, 0.0);
        points[BodyLandmark::LeftEar as usize] = keypoint(0.5, 0.5, 0.0);
        points[BodyLandmark::LeftShoulder as usize] = keypoint(0.5, 0.7, 0.0);
        points[BodyLandmark::RightShoulder as usize] = keypoint(0.45, 0.7, 0.0);
        points[BodyLandmark::LeftHip as usize] = keypoint(0.5, 0.9, 0.0);
        adjust(&mut points);
        LandmarkSet::from_keypoints(points).unwrap()
    }

    fn neutral_pose() -> LandmarkSet {
        pose_with(|_| {})
    }

    // forward_diff ~0.02 vs the neutral baseline, other features unchanged
    fn forward_lean_pose() -> LandmarkSet {
        pose_with(|p| p[BodyLandmark::RightShoulder as usize] = keypoint(0.47, 0.7, 0.0))
    }

    // side_diff 0.1 vs the neutral baseline
    fn side_lean_pose() -> LandmarkSet {
        pose_with(|p| p[BodyLandmark::LeftHip as usize] = keypoint(0.5, 0.9, 0.1))
    }

    // angle_diff ~63 degrees vs the neutral baseline
    fn head_down_pose() -> LandmarkSet {
        pose_with(|p| p[BodyLandmark::Nose as usize] = keypoint(0.45, 0.6, 0.0))
    }

    fn calibrated_evaluator() -> PostureEvaluator {
        let mut evaluator = PostureEvaluator::new();
        evaluator.process_frame(neutral_pose());
        assert!(evaluator.capture_baseline());
        evaluator
    }

    #[test]
    fn test_capture_without_frames_is_noop() {
        let mut evaluator = PostureEvaluator::new();
        assert!(!evaluator.capture_baseline());
        assert!(!evaluator.baseline_set());
    }

    #[test]
    fn test_status_frozen_before_baseline() {
        let mut evaluator = PostureEvaluator::new();
        for _ in 0..10 {
            evaluator.process_frame(forward_lean_pose());
        }
        assert_eq!(*evaluator.status(), PostureStatus::default());
        assert_eq!(evaluator.forward_window.len(), 0);
    }

    #[test]
    fn test_capture_clears_windows_and_warnings() {
        let mut evaluator = calibrated_evaluator();
        for _ in 0..30 {
            evaluator.process_frame(forward_lean_pose());
        }
        assert_eq!(evaluator.forward_window.len(), 30);

        assert!(evaluator.capture_baseline());
        assert_eq!(evaluator.forward_window.len(), 0);
        assert_eq!(evaluator.side_window.len(), 0);
        assert_eq!(evaluator.head_window.len(), 0);
        assert!(evaluator.status().warnings.is_empty());
    }

    #[test]
    fn test_score_ladder() {
        let mut evaluator = calibrated_evaluator();

        assert_eq!(evaluator.process_frame(neutral_pose()).score, 100);
        assert_eq!(evaluator.process_frame(forward_lean_pose()).score, 80);

        let forward_and_side = pose_with(|p| {
            p[BodyLandmark::RightShoulder as usize] = keypoint(0.47, 0.7, 0.0);
            p[BodyLandmark::LeftHip as usize] = keypoint(0.5, 0.9, 0.1);
        });
        assert_eq!(evaluator.process_frame(forward_and_side).score, 65);

        let all_three = pose_with(|p| {
            p[BodyLandmark::RightShoulder as usize] = keypoint(0.47, 0.7, 0.0);
            p[BodyLandmark::LeftHip as usize] = keypoint(0.5, 0.9, 0.1);
            p[BodyLandmark::Nose as usize] = keypoint(0.45, 0.6, 0.0);
        });
        assert_eq!(evaluator.process_frame(all_three).score, 50);
    }

    #[test]
    fn test_raw_diffs_published() {
        let mut evaluator = calibrated_evaluator();
        let status = evaluator.process_frame(forward_lean_pose());

        let forward_diff = status.raw.forward_diff.unwrap();
        assert!((forward_diff - 0.02).abs() < 1e-6);
        assert!(status.raw.side_diff.unwrap().abs() < 1e-6);
        assert!(status.raw.angle_diff.unwrap().abs() < 1e-3);
    }

    #[test]
    fn test_sustained_forward_lean_fires_warning() {
        let mut evaluator = calibrated_evaluator();

        for _ in 0..WINDOW_SIZE - 1 {
            let status = evaluator.process_frame(forward_lean_pose());
            assert!(
                status.warnings.is_empty(),
                "no warning may fire before the window is full"
            );
        }

        let status = evaluator.process_frame(forward_lean_pose());
        assert_eq!(status.warnings, vec![PostureWarning::ForwardLean]);
        assert_eq!(status.score, 80);
    }

    #[test]
    fn test_89_bad_frames_do_not_fire() {
        let mut evaluator = calibrated_evaluator();

        for _ in 0..89 {
            evaluator.process_frame(forward_lean_pose());
        }
        for _ in 0..11 {
            evaluator.process_frame(neutral_pose());
        }

        assert!(evaluator.forward_window.is_full());
        assert_eq!(evaluator.forward_window.ones(), 89);
        assert!(evaluator.status().warnings.is_empty());
    }

    #[test]
    fn test_head_and_side_warnings() {
        let mut evaluator = calibrated_evaluator();
        for _ in 0..WINDOW_SIZE {
            evaluator.process_frame(side_lean_pose());
        }
        assert_eq!(evaluator.status().warnings, vec![PostureWarning::SideLean]);
        assert_eq!(evaluator.status().score, 85);

        let mut evaluator = calibrated_evaluator();
        for _ in 0..WINDOW_SIZE {
            evaluator.process_frame(head_down_pose());
        }
        assert_eq!(
            evaluator.status().warnings,
            vec![PostureWarning::HeadLowered]
        );
        assert_eq!(evaluator.status().score, 85);
    }

    #[test]
    fn test_recapture_restarts_accumulation() {
        let mut evaluator = calibrated_evaluator();
        for _ in 0..50 {
            evaluator.process_frame(forward_lean_pose());
        }
        assert_eq!(evaluator.forward_window.len(), 50);

        // New baseline invalidates the accumulated deviation history
        assert!(evaluator.capture_baseline());
        assert_eq!(evaluator.forward_window.len(), 0);

        for _ in 0..WINDOW_SIZE {
            evaluator.process_frame(forward_lean_pose());
        }
        // The leaned pose was itself recaptured as the reference, so those
        // frames no longer deviate at all.
        assert!(evaluator.status().warnings.is_empty());
        assert_eq!(evaluator.status().score, 100);
    }

    #[test]
    fn test_clear_warnings_snoozes_one_tick() {
        let mut evaluator = calibrated_evaluator();
        for _ in 0..WINDOW_SIZE {
            evaluator.process_frame(forward_lean_pose());
        }
        assert!(!evaluator.status().warnings.is_empty());

        evaluator.clear_warnings();
        assert!(evaluator.status().warnings.is_empty());

        // Windows were untouched, so the next frame re-derives the warning
        let status = evaluator.process_frame(forward_lean_pose());
        assert_eq!(status.warnings, vec![PostureWarning::ForwardLean]);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut evaluator = calibrated_evaluator();
        for _ in 0..WINDOW_SIZE {
            evaluator.process_frame(forward_lean_pose());
        }

        evaluator.reset();
        assert!(!evaluator.baseline_set());
        assert_eq!(*evaluator.status(), PostureStatus::default());
        assert!(evaluator.forward_window.is_empty());
        // The remembered frame is discarded too: capture needs new input
        assert!(!evaluator.capture_baseline());
    }

    #[test]
    fn test_baseline_timestamp_recorded() {
        let evaluator = calibrated_evaluator();
        let baseline = evaluator.baseline().unwrap();
        assert!(baseline.captured_at > 0);
    }
}
