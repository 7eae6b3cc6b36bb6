//! Hand landmark layout and per-frame observations.
//!
//! The detector contract is the 21-point hand skeleton: wrist, then four
//! joints per finger from thumb to pinky.  Coordinates are normalized to the
//! video frame (`0.0..=1.0` on both axes, origin top-left).

use glam::Vec2;
use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices
// ════════════════════════════════════════════════════════════════════════════

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

/// The five fingertips, thumb first.
pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Skeleton connections used by the preview inset.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    // Thumb
    (WRIST, THUMB_CMC), (THUMB_CMC, THUMB_MCP), (THUMB_MCP, THUMB_IP), (THUMB_IP, THUMB_TIP),
    // Index
    (WRIST, INDEX_MCP), (INDEX_MCP, INDEX_PIP), (INDEX_PIP, INDEX_DIP), (INDEX_DIP, INDEX_TIP),
    // Middle
    (INDEX_MCP, MIDDLE_MCP), (MIDDLE_MCP, MIDDLE_PIP), (MIDDLE_PIP, MIDDLE_DIP), (MIDDLE_DIP, MIDDLE_TIP),
    // Ring
    (MIDDLE_MCP, RING_MCP), (RING_MCP, RING_PIP), (RING_PIP, RING_DIP), (RING_DIP, RING_TIP),
    // Pinky
    (RING_MCP, PINKY_MCP), (PINKY_MCP, PINKY_PIP), (PINKY_PIP, PINKY_DIP), (PINKY_DIP, PINKY_TIP),
    // Palm outline
    (WRIST, PINKY_MCP),
];

// ════════════════════════════════════════════════════════════════════════════
// Keypoint / HandObservation
// ════════════════════════════════════════════════════════════════════════════

/// One normalized landmark position.
pub type Keypoint = Vec2;

#[derive(Debug, Error, PartialEq)]
pub enum PoseError {
    #[error("expected {LANDMARK_COUNT} keypoints, got {0}")]
    WrongKeypointCount(usize),
    #[error("keypoint {0} has a non-finite coordinate")]
    NonFinite(usize),
}

/// A single detected hand: all 21 landmarks plus the detector's confidence.
#[derive(Clone, Debug, PartialEq)]
pub struct HandObservation {
    pub keypoints:  [Keypoint; LANDMARK_COUNT],
    pub confidence: f32,
}

impl HandObservation {
    pub fn new(keypoints: [Keypoint; LANDMARK_COUNT], confidence: f32) -> Self {
        HandObservation { keypoints, confidence }
    }

    /// Build from a detector's landmark list, rejecting short lists and NaNs.
    pub fn from_slice(points: &[Keypoint], confidence: f32) -> Result<Self, PoseError> {
        let keypoints: [Keypoint; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| PoseError::WrongKeypointCount(points.len()))?;
        if let Some(i) = keypoints.iter().position(|p| !p.is_finite()) {
            return Err(PoseError::NonFinite(i));
        }
        Ok(HandObservation { keypoints, confidence })
    }

    pub fn point(&self, landmark: usize) -> Keypoint {
        self.keypoints[landmark]
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandInput: what the detector hands the simulation each frame
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum HandInput {
    /// The video frame has not advanced; keep the previous reading.
    Unchanged,
    /// A fresh detection found no hand.
    Absent,
    /// A fresh detection found a hand.
    Present(HandObservation),
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_rejects_wrong_count() {
        let pts = vec![Vec2::ZERO; 20];
        assert_eq!(
            HandObservation::from_slice(&pts, 1.0),
            Err(PoseError::WrongKeypointCount(20))
        );
    }

    #[test]
    fn from_slice_rejects_nan() {
        let mut pts = vec![Vec2::splat(0.5); LANDMARK_COUNT];
        pts[7] = Vec2::new(f32::NAN, 0.5);
        assert_eq!(HandObservation::from_slice(&pts, 1.0), Err(PoseError::NonFinite(7)));
    }

    #[test]
    fn from_slice_keeps_order() {
        let pts: Vec<Vec2> = (0..LANDMARK_COUNT)
            .map(|i| Vec2::new(i as f32 / 21.0, 0.5))
            .collect();
        let obs = HandObservation::from_slice(&pts, 0.9).unwrap();
        assert_eq!(obs.point(MIDDLE_MCP), pts[9]);
        assert_eq!(obs.confidence, 0.9);
    }

    #[test]
    fn connections_stay_in_range() {
        for &(a, b) in HAND_CONNECTIONS.iter() {
            assert!(a < LANDMARK_COUNT && b < LANDMARK_COUNT);
        }
    }
}
