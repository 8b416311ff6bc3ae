// Data models for pose landmarks, detector configuration, and posture status

pub mod pose;
pub mod status;
