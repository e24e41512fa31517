//! Heuristic CV profile detection

pub mod detector;

pub use detector::{DetectedProfile, ProfileDetector};
