// Externally visible posture status models

use serde::{Serialize, Serializer};

// ==============================================================================
// Warnings
// ==============================================================================

/// The three independently tracked posture deviation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostureWarning {
    ForwardLean,
    SideLean,
    HeadLowered,
}

impl PostureWarning {
    /// The fixed label shown to downstream consumers
    pub fn label(&self) -> &'static str {
        match self {
            PostureWarning::ForwardLean => "Forward lean detected",
            PostureWarning::SideLean => "Side lean detected",
            PostureWarning::HeadLowered => "Head lowered detected",
        }
    }
}

impl Serialize for PostureWarning {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

// ==============================================================================
// Status Snapshot
// ==============================================================================

/// Per-frame absolute deviations from the baseline.
///
/// All fields stay empty until a baseline exists and a frame has been
/// evaluated against it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RawDeviations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_diff: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side_diff: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle_diff: Option<f32>,
}

/// Snapshot published to downstream consumers.
///
/// Recomputed on every processed frame once a baseline exists; before that
/// it holds the fixed default (score 100, no warnings, no raw numbers).
/// Warning order is fixed: forward, side, head.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostureStatus {
    /// Instantaneous score 0..=100 derived from the current frame
    pub score: u8,
    /// Debounced warnings currently active
    pub warnings: Vec<PostureWarning>,
    pub raw: RawDeviations,
}

impl Default for PostureStatus {
    fn default() -> Self {
        Self {
            score: 100,
            warnings: Vec::new(),
            raw: RawDeviations::default(),
        }
    }
}
