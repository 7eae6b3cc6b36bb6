//! Gesture state across frames, and the blast it triggers.
//!
//! A blast fires on the frame the hand *enters* scatter, from idle or
//! straight from gather.  Holding scatter does not re-fire it.  The blast
//! then fades geometrically, one decay per rendered frame, and is dropped
//! once it falls under the cutoff.

use glam::Vec2;
use hand_pose::{GestureState, HandReading};
use log::debug;

use crate::config::BlastConfig;
use crate::force::HandField;

// ════════════════════════════════════════════════════════════════════════════
// BlastEvent
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlastEvent {
    /// 1.0 when fired, shrinking toward 0.
    pub intensity: f32,
    /// Anchor at the moment the blast fired.
    pub center:    Vec2,
}

impl BlastEvent {
    /// Bloom radius: grows from `base_radius` to `base_radius + growth` as
    /// the intensity falls from 1 to 0.
    pub fn radius(&self, cfg: &BlastConfig) -> f32 {
        cfg.growth * (1.0 - self.intensity) + cfg.base_radius
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureTracker
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct GestureTracker {
    cfg:              BlastConfig,
    previous:         GestureState,
    current:          HandReading,
    blast:            Option<BlastEvent>,
    blasts_triggered: u64,
}

impl GestureTracker {
    pub fn new(cfg: BlastConfig) -> Self {
        GestureTracker {
            cfg,
            previous:         GestureState::Idle,
            current:          HandReading::absent(),
            blast:            None,
            blasts_triggered: 0,
        }
    }

    /// Take a fresh classifier reading.  Returns true if it fired a blast.
    pub fn observe(&mut self, reading: HandReading) -> bool {
        let entering_scatter = reading.state == GestureState::Scatter
            && self.previous != GestureState::Scatter;

        let mut fired = false;
        if entering_scatter {
            if let Some(center) = reading.anchor {
                self.blast = Some(BlastEvent { intensity: 1.0, center });
                self.blasts_triggered += 1;
                fired = true;
                debug!("blast at ({:.0}, {:.0})", center.x, center.y);
            }
        }
        if reading.state != self.previous {
            debug!("gesture {} → {}", self.previous.name(), reading.state.name());
        }

        self.previous = reading.state;
        self.current  = reading;
        fired
    }

    /// One rendered frame of fade.  Clears the blast once it is spent.
    pub fn decay_blast(&mut self) {
        if let Some(b) = self.blast.as_mut() {
            b.intensity *= self.cfg.decay;
            if b.intensity < self.cfg.cutoff {
                self.blast = None;
            }
        }
    }

    pub fn blast(&self)            -> Option<&BlastEvent> { self.blast.as_ref() }
    pub fn current(&self)          -> &HandReading        { &self.current }
    pub fn previous(&self)         -> GestureState        { self.previous }
    pub fn blasts_triggered(&self) -> u64                 { self.blasts_triggered }

    pub fn hand_field(&self) -> HandField {
        HandField { anchor: self.current.anchor, state: self.current.state }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(state: GestureState) -> HandReading {
        HandReading { state, anchor: Some(Vec2::new(320.0, 240.0)), spread: Some(1.0) }
    }

    fn tracker() -> GestureTracker {
        GestureTracker::new(BlastConfig::default())
    }

    #[test]
    fn idle_to_scatter_fires_once() {
        let mut t = tracker();
        assert!(!t.observe(reading(GestureState::Idle)));
        assert!(t.observe(reading(GestureState::Scatter)));
        assert!(!t.observe(reading(GestureState::Scatter)));
        assert!(!t.observe(reading(GestureState::Scatter)));
        assert_eq!(t.blasts_triggered(), 1);
    }

    #[test]
    fn gather_straight_to_scatter_fires() {
        let mut t = tracker();
        t.observe(reading(GestureState::Gather));
        assert!(t.observe(reading(GestureState::Scatter)));
        assert_eq!(t.blasts_triggered(), 1);
        assert_eq!(t.blast().unwrap().intensity, 1.0);
    }

    #[test]
    fn leaving_and_reentering_scatter_fires_again() {
        let mut t = tracker();
        t.observe(reading(GestureState::Scatter));
        t.observe(reading(GestureState::Idle));
        t.observe(reading(GestureState::Scatter));
        assert_eq!(t.blasts_triggered(), 2);
    }

    #[test]
    fn losing_the_hand_resets_history() {
        let mut t = tracker();
        t.observe(reading(GestureState::Scatter));
        t.observe(HandReading::absent());
        assert_eq!(t.previous(), GestureState::Idle);
        assert!(t.observe(reading(GestureState::Scatter)));
    }

    #[test]
    fn scatter_without_anchor_does_not_fire() {
        let mut t = tracker();
        let r = HandReading { state: GestureState::Scatter, anchor: None, spread: Some(2.0) };
        assert!(!t.observe(r));
        assert!(t.blast().is_none());
        // …but it still counts as being in scatter
        assert!(!t.observe(reading(GestureState::Scatter)));
    }

    #[test]
    fn blast_center_is_anchor_at_fire_time() {
        let mut t = tracker();
        t.observe(reading(GestureState::Scatter));
        let mut moved = reading(GestureState::Scatter);
        moved.anchor = Some(Vec2::new(10.0, 10.0));
        t.observe(moved);
        assert_eq!(t.blast().unwrap().center, Vec2::new(320.0, 240.0));
    }

    #[test]
    fn blast_lives_for_expected_frames() {
        let expected = ((0.01f64).ln() / (0.88f64).ln()).ceil() as usize;
        let mut t = tracker();
        t.observe(reading(GestureState::Scatter));

        let mut frames = 0;
        while t.blast().is_some() {
            frames += 1;
            t.decay_blast();
            assert!(frames < 1000);
        }
        assert_eq!(frames, expected);
    }

    #[test]
    fn blast_radius_grows_as_it_fades() {
        let cfg = BlastConfig::default();
        let fresh = BlastEvent { intensity: 1.0, center: Vec2::ZERO };
        let spent = BlastEvent { intensity: 0.0, center: Vec2::ZERO };
        assert_eq!(fresh.radius(&cfg), 300.0);
        assert_eq!(spent.radius(&cfg), 2300.0);
    }

    #[test]
    fn hand_field_mirrors_current_reading() {
        let mut t = tracker();
        t.observe(reading(GestureState::Gather));
        let h = t.hand_field();
        assert_eq!(h.state, GestureState::Gather);
        assert_eq!(h.anchor, Some(Vec2::new(320.0, 240.0)));
    }
}
