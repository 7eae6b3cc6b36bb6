//! Synthetic hands for simulation mode and headless replay.
//!
//! Fingertips are placed on an arc around the middle-finger base, so the
//! thumb–pinky chord sets the spread: `2 · reach · sin(fan)`.

use glam::Vec2;

use crate::landmark::{HandObservation, Keypoint, LANDMARK_COUNT, MIDDLE_MCP, WRIST};

/// A canned finger arrangement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandPose {
    /// Fingertips pinched together (spread ≈ 0.3).
    Pinched,
    /// Loose open hand (spread ≈ 1.05).
    Relaxed,
    /// Fingers spread wide (spread ≈ 2.0).
    Splayed,
}

impl HandPose {
    /// (reach as a fraction of palm length, half-fan angle in radians)
    fn arc(&self) -> (f32, f32) {
        match self {
            HandPose::Pinched => (0.5, 0.30),
            HandPose::Relaxed => (1.0, 0.55),
            HandPose::Splayed => (1.3, 0.90),
        }
    }
}

/// Build a hand whose middle-finger base sits at `center` (normalized
/// coordinates), with the wrist `palm` below it.
pub fn synthetic_hand(center: Vec2, palm: f32, pose: HandPose) -> HandObservation {
    let (reach, fan) = pose.arc();
    let mut pts: [Keypoint; LANDMARK_COUNT] = [center; LANDMARK_COUNT];

    pts[WRIST]      = center + Vec2::new(0.0, palm);
    pts[MIDDLE_MCP] = center;

    // Knuckle (or thumb root) for each finger, thumb → pinky
    let bases = [
        center + Vec2::new(-0.40, 0.70) * palm,
        center + Vec2::new(-0.35, 0.05) * palm,
        center,
        center + Vec2::new(0.30, 0.03) * palm,
        center + Vec2::new(0.55, 0.12) * palm,
    ];

    for (finger, base) in bases.iter().enumerate() {
        let t     = finger as f32 / 4.0;
        let angle = -fan + 2.0 * fan * t;
        let tip   = center + Vec2::new(angle.sin(), -angle.cos()) * reach * palm;

        // Four joints per finger starting at landmark 1
        let first = 1 + finger * 4;
        for joint in 0..4 {
            pts[first + joint] = base.lerp(tip, joint as f32 / 3.0);
        }
    }
    HandObservation::new(pts, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::spread_ratio;
    use crate::landmark::{INDEX_MCP, PINKY_TIP, THUMB_TIP};

    #[test]
    fn middle_base_is_center() {
        let c = Vec2::new(0.3, 0.7);
        let h = synthetic_hand(c, 0.1, HandPose::Relaxed);
        assert_eq!(h.point(MIDDLE_MCP), c);
        assert!((h.point(WRIST).distance(c) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn thumb_and_pinky_are_the_widest_pair() {
        let h = synthetic_hand(Vec2::splat(0.5), 0.1, HandPose::Splayed);
        let chord = h.point(THUMB_TIP).distance(h.point(PINKY_TIP)) / 0.1;
        assert!((spread_ratio(&h).unwrap() - chord).abs() < 1e-5);
    }

    #[test]
    fn knuckles_keep_their_slot() {
        let h = synthetic_hand(Vec2::splat(0.5), 0.1, HandPose::Pinched);
        // First joint of the index chain is its knuckle
        assert!((h.point(INDEX_MCP) - Vec2::new(0.465, 0.505)).length() < 1e-5);
    }
}
