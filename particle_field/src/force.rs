//! Per-particle force model.
//!
//! Inside the influence radius of a gathering or scattering hand, a particle
//! is pulled (or pushed) radially and spun tangentially, with a quadratic
//! falloff `(1 - d/R)²` toward the edge of the radius.  Everywhere else it
//! drifts: a weak pull toward the canvas center, a little jitter, and a
//! speed governor.
//!
//! [`ForceField::apply`] never mutates the particle.  It returns the velocity
//! change and whether the particle should be drawn highlighted.

use glam::Vec2;
use hand_pose::GestureState;
use rand::Rng;

use crate::config::{AmbientConfig, ForceConfig};

/// Distances used as divisors are floored to this.
pub const MIN_DISTANCE: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceOutcome {
    pub velocity_delta: Vec2,
    pub highlighted:    bool,
}

/// The hand as the force model sees it for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HandField {
    pub anchor: Option<Vec2>,
    pub state:  GestureState,
}

#[derive(Clone, Debug, Default)]
pub struct ForceField {
    pub force:   ForceConfig,
    pub ambient: AmbientConfig,
}

impl ForceField {
    pub fn new(force: ForceConfig, ambient: AmbientConfig) -> Self {
        ForceField { force, ambient }
    }

    /// `(1 - d/R)²` for `d < R`, else `None`.
    pub fn influence(&self, dist: f32) -> Option<f32> {
        let r = self.force.influence_radius;
        if dist >= r {
            return None;
        }
        let k = 1.0 - dist / r;
        Some(k * k)
    }

    pub fn apply<R: Rng + ?Sized>(
        &self,
        pos:    Vec2,
        vel:    Vec2,
        hand:   &HandField,
        center: Vec2,
        rng:    &mut R,
    ) -> ForceOutcome {
        if let Some(anchor) = hand.anchor {
            let offset = pos - anchor;
            let dist   = offset.length().max(MIN_DISTANCE);
            if let Some(influence) = self.influence(dist) {
                let outward = offset / dist;
                match hand.state {
                    GestureState::Gather  => return self.gather(vel, outward, dist, influence),
                    GestureState::Scatter => return self.scatter(vel, outward, dist, influence),
                    GestureState::Idle    => {}
                }
            }
        }
        self.drift(pos, vel, center, rng)
    }

    // ── gather: vortex toward the anchor ─────────────────────────────────

    fn gather(&self, vel: Vec2, outward: Vec2, dist: f32, influence: f32) -> ForceOutcome {
        let f = &self.force;
        let pull  = f.gather_strength / (dist + f.gather_softening) * influence;
        let swirl = f.gather_swirl * influence;

        let mut v = vel - outward * pull + tangent(outward) * swirl;
        v *= if dist < f.core_radius { f.core_damping } else { f.gather_damping };

        ForceOutcome {
            velocity_delta: v - vel,
            highlighted:    influence > f.gather_highlight,
        }
    }

    // ── scatter: push away and spin ──────────────────────────────────────

    fn scatter(&self, vel: Vec2, outward: Vec2, dist: f32, influence: f32) -> ForceOutcome {
        let f = &self.force;
        let push = f.scatter_strength / (dist + f.scatter_softening) * influence;

        let mut v = vel + outward * push + tangent(outward) * (push * f.scatter_swirl);
        v *= f.scatter_damping;

        ForceOutcome {
            velocity_delta: v - vel,
            highlighted:    influence > f.scatter_highlight,
        }
    }

    // ── ambient drift ────────────────────────────────────────────────────

    fn drift<R: Rng + ?Sized>(&self, pos: Vec2, vel: Vec2, center: Vec2, rng: &mut R) -> ForceOutcome {
        let a = &self.ambient;
        let mut v = vel;

        let to_center = center - pos;
        let d_center  = to_center.length().max(MIN_DISTANCE);
        if d_center > a.center_dead_zone {
            v += to_center / d_center * a.center_pull;
        }

        v += Vec2::new(
            (rng.gen::<f32>() - 0.5) * 2.0 * a.jitter,
            (rng.gen::<f32>() - 0.5) * 2.0 * a.jitter,
        );

        // Measured before damping; the rescale below divides by it.
        let speed = v.length();
        v *= a.damping;

        if speed > a.escape_speed {
            v *= a.escape_damping;
        } else if speed > a.cruise_speed {
            v = v / speed * a.cruise_speed;
        }

        ForceOutcome { velocity_delta: v - vel, highlighted: false }
    }
}

/// Fixed-handedness perpendicular of an outward unit vector.
fn tangent(outward: Vec2) -> Vec2 {
    Vec2::new(outward.y, -outward.x)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
