// Pose detector integration boundary

pub mod bridge;
