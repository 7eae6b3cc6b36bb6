//! The landmark-detector seam.
//!
//! Anything that can produce one [`HandInput`] per frame implements
//! [`HandDetector`].  The model behind it (webcam network, LeapMotion,
//! pointer simulation) is opaque to the simulation.

use glam::Vec2;
use thiserror::Error;

use crate::landmark::HandInput;

#[derive(Debug, Error)]
pub enum DetectorError {
    /// The detector could not be brought up; the frame loop must not start.
    #[error("detector failed to initialize: {0}")]
    Init(String),
    /// A single detection failed; the frame can still be drawn.
    #[error("detection failed: {0}")]
    Frame(String),
    /// The input feed went away.
    #[error("detector input disconnected")]
    Disconnected,
}

/// One detector call per rendered frame.
pub trait HandDetector {
    /// Short label for logs.
    fn name(&self) -> &str;

    /// Bring the detector up.  Called once before the first frame.
    fn init(&mut self) -> Result<(), DetectorError>;

    /// Size in pixels of the frames the landmarks are normalized against.
    /// Zero while unknown.
    fn video_size(&self) -> Vec2;

    /// Run detection for the frame displayed at `now_ms`.
    fn detect(&mut self, now_ms: u64) -> Result<HandInput, DetectorError>;
}
