use crate::models::pose::{DetectorConfig, PoseError, PoseResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorConfig {
    /// Upper bound on processed frames per second
    pub target_fps: u32,
    /// Clear baseline and window state when monitoring is deactivated
    pub reset_on_deactivate: bool,
    /// Settings forwarded to the pose detector backend
    pub detector: DetectorConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            target_fps: 30,
            reset_on_deactivate: true,
            detector: DetectorConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Validate configuration values
    pub fn validate(&self) -> PoseResult<()> {
        if self.target_fps == 0 || self.target_fps > 60 {
            return Err(PoseError::InvalidConfig(format!(
                "Invalid target FPS: {}. Must be between 1 and 60",
                self.target_fps
            )));
        }

        if !(0.0..=1.0).contains(&self.detector.min_detection_confidence) {
            return Err(PoseError::InvalidConfig(format!(
                "Invalid detection confidence: {}. Must be between 0.0 and 1.0",
                self.detector.min_detection_confidence
            )));
        }

        if !(0.0..=1.0).contains(&self.detector.min_tracking_confidence) {
            return Err(PoseError::InvalidConfig(format!(
                "Invalid tracking confidence: {}. Must be between 0.0 and 1.0",
                self.detector.min_tracking_confidence
            )));
        }

        Ok(())
    }

    /// Minimum spacing between accepted frames; faster arrivals are dropped
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / self.target_fps as u64)
    }
}
