//! Spread-ratio gesture classification.
//!
//! The widest fingertip-to-fingertip distance is divided by the palm length
//! (wrist → middle-finger base).  The ratio does not change with hand size
//! or distance from the camera, so the thresholds need no calibration.

use glam::Vec2;

use crate::cover::CoverTransform;
use crate::landmark::{HandInput, HandObservation, FINGERTIPS, MIDDLE_MCP, WRIST};

/// Palms shorter than this (normalized units) are treated as degenerate.
const MIN_PALM_LENGTH: f32 = 1e-6;

// ════════════════════════════════════════════════════════════════════════════
// GestureState
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GestureState {
    #[default]
    Idle,
    /// Fingertips bunched together.
    Gather,
    /// Fingers splayed wide.
    Scatter,
}

impl GestureState {
    pub fn name(&self) -> &'static str {
        match self {
            GestureState::Idle    => "idle",
            GestureState::Gather  => "gather",
            GestureState::Scatter => "scatter",
        }
    }

    /// Strict comparisons on both sides: a ratio equal to a threshold is idle.
    pub fn from_spread(spread: f32, thresholds: &Thresholds) -> Self {
        if spread < thresholds.gather_below {
            GestureState::Gather
        } else if spread > thresholds.scatter_above {
            GestureState::Scatter
        } else {
            GestureState::Idle
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Thresholds
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholds {
    pub gather_below:   f32,
    pub scatter_above:  f32,
    /// Observations under this confidence count as "no hand".
    pub min_confidence: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds { gather_below: 0.65, scatter_above: 1.6, min_confidence: 0.0 }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandReading: classifier output
// ════════════════════════════════════════════════════════════════════════════

/// Gesture state and screen-space anchor for one detection.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HandReading {
    pub state:  GestureState,
    pub anchor: Option<Vec2>,
    /// Spread ratio behind `state`; `None` when there was no usable hand.
    pub spread: Option<f32>,
}

impl HandReading {
    pub fn absent() -> Self {
        HandReading::default()
    }
}

/// Fingertip spread divided by palm length.  `None` for a degenerate palm.
pub fn spread_ratio(hand: &HandObservation) -> Option<f32> {
    let palm = hand.point(WRIST).distance(hand.point(MIDDLE_MCP));
    if palm < MIN_PALM_LENGTH {
        return None;
    }

    let mut max_spread = 0.0f32;
    for i in 0..FINGERTIPS.len() {
        for j in (i + 1)..FINGERTIPS.len() {
            let d = hand.point(FINGERTIPS[i]).distance(hand.point(FINGERTIPS[j]));
            max_spread = max_spread.max(d);
        }
    }
    Some(max_spread / palm)
}

/// Classify a fresh detection.
///
/// `HandInput::Unchanged` has no reading of its own and yields `None`; the
/// caller keeps whatever it read last.
pub fn classify(
    input: &HandInput,
    cover: &CoverTransform,
    thresholds: &Thresholds,
) -> Option<HandReading> {
    match input {
        HandInput::Unchanged => None,
        HandInput::Absent    => Some(HandReading::absent()),
        HandInput::Present(hand) => Some(classify_hand(hand, cover, thresholds)),
    }
}

pub fn classify_hand(
    hand: &HandObservation,
    cover: &CoverTransform,
    thresholds: &Thresholds,
) -> HandReading {
    if hand.confidence < thresholds.min_confidence {
        return HandReading::absent();
    }
    let anchor = Some(cover.to_screen(hand.point(MIDDLE_MCP)));
    match spread_ratio(hand) {
        Some(spread) => HandReading {
            state: GestureState::from_spread(spread, thresholds),
            anchor,
            spread: Some(spread),
        },
        None => HandReading { state: GestureState::Idle, anchor, spread: None },
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{LANDMARK_COUNT, INDEX_TIP, PINKY_TIP, THUMB_TIP};
    use crate::synth::{synthetic_hand, HandPose};

    fn hand_with_spread(ratio: f32) -> HandObservation {
        // Palm of length 0.1, all tips at one point except the thumb/pinky pair
        let mut pts = [Vec2::new(0.5, 0.5); LANDMARK_COUNT];
        pts[WRIST]      = Vec2::new(0.5, 0.6);
        pts[MIDDLE_MCP] = Vec2::new(0.5, 0.5);
        for &t in FINGERTIPS.iter() {
            pts[t] = Vec2::new(0.5, 0.4);
        }
        pts[THUMB_TIP] = Vec2::new(0.5 - 0.05 * ratio, 0.4);
        pts[PINKY_TIP] = Vec2::new(0.5 + 0.05 * ratio, 0.4);
        HandObservation::new(pts, 1.0)
    }

    #[test]
    fn spread_boundaries_are_strict() {
        let t = Thresholds::default();
        assert_eq!(GestureState::from_spread(0.649, &t), GestureState::Gather);
        assert_eq!(GestureState::from_spread(0.65,  &t), GestureState::Idle);
        assert_eq!(GestureState::from_spread(1.6,   &t), GestureState::Idle);
        assert_eq!(GestureState::from_spread(1.601, &t), GestureState::Scatter);
    }

    #[test]
    fn spread_ratio_uses_widest_pair() {
        let hand = hand_with_spread(1.2);
        let r = spread_ratio(&hand).unwrap();
        assert!((r - 1.2).abs() < 1e-3, "got {}", r);
    }

    #[test]
    fn spread_is_scale_invariant() {
        let near = synthetic_hand(Vec2::new(0.5, 0.5), 0.20, HandPose::Splayed);
        let far  = synthetic_hand(Vec2::new(0.5, 0.5), 0.05, HandPose::Splayed);
        let a = spread_ratio(&near).unwrap();
        let b = spread_ratio(&far).unwrap();
        assert!((a - b).abs() < 1e-3);
    }

    #[test]
    fn absent_reads_idle_without_anchor() {
        let r = classify(&HandInput::Absent, &CoverTransform::default(), &Thresholds::default());
        assert_eq!(r, Some(HandReading { state: GestureState::Idle, anchor: None, spread: None }));
    }

    #[test]
    fn unchanged_has_no_reading() {
        let r = classify(&HandInput::Unchanged, &CoverTransform::default(), &Thresholds::default());
        assert_eq!(r, None);
    }

    #[test]
    fn anchor_is_middle_base_in_screen_space() {
        let cover = CoverTransform::compute(1280.0, 720.0, 1280.0, 720.0);
        let hand = hand_with_spread(1.0);
        let r = classify_hand(&hand, &cover, &Thresholds::default());
        let a = r.anchor.unwrap();
        assert!((a - Vec2::new(640.0, 360.0)).length() < 1e-3);
        assert_eq!(r.state, GestureState::Idle);
    }

    #[test]
    fn degenerate_palm_is_idle() {
        let mut hand = hand_with_spread(3.0);
        hand.keypoints[WRIST] = hand.keypoints[MIDDLE_MCP];
        let r = classify_hand(&hand, &CoverTransform::default(), &Thresholds::default());
        assert_eq!(r.state, GestureState::Idle);
        assert!(r.anchor.is_some());
        assert_eq!(r.spread, None);
    }

    #[test]
    fn low_confidence_counts_as_absent() {
        let mut hand = hand_with_spread(3.0);
        hand.confidence = 0.2;
        let t = Thresholds { min_confidence: 0.5, ..Thresholds::default() };
        let r = classify_hand(&hand, &CoverTransform::default(), &t);
        assert_eq!(r, HandReading::absent());
    }

    #[test]
    fn synthetic_poses_classify_as_named() {
        let cover = CoverTransform::compute(1280.0, 720.0, 1280.0, 720.0);
        let t = Thresholds::default();
        for (pose, want) in [
            (HandPose::Pinched, GestureState::Gather),
            (HandPose::Relaxed, GestureState::Idle),
            (HandPose::Splayed, GestureState::Scatter),
        ] {
            let hand = synthetic_hand(Vec2::new(0.4, 0.6), 0.12, pose);
            assert_eq!(classify_hand(&hand, &cover, &t).state, want, "{:?}", pose);
        }
    }

    #[test]
    fn index_tip_alone_does_not_set_spread() {
        // Only one tip moved: widest pair is still measured against the rest
        let mut hand = hand_with_spread(0.0);
        hand.keypoints[INDEX_TIP] = Vec2::new(0.5, 0.3);
        let r = spread_ratio(&hand).unwrap();
        assert!((r - 1.0).abs() < 1e-3);
    }
}
