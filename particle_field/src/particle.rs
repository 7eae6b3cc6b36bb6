//! Particle store and integrator.
//!
//! The pool is allocated once and every particle lives for the whole run.
//! Each frame every particle independently gets its force, integrates, and
//! bounces off the canvas edges.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::Rng;

use crate::config::ParticleConfig;
use crate::error::{FieldError, Result};
use crate::force::{ForceField, HandField};
use crate::sprite::SpriteKey;

// ════════════════════════════════════════════════════════════════════════════
// Particle
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub pos:         Vec2,
    pub vel:         Vec2,
    /// Fixed at spawn.
    pub size:        f32,
    /// Fixed at spawn.
    pub alpha:       f32,
    /// 0 = palest … 2 = deepest; fixed at spawn.
    pub color_class: u8,
    /// Set every frame from the force outcome.
    pub highlighted: bool,
}

impl Particle {
    pub fn spawn<R: Rng + ?Sized>(canvas: Vec2, cfg: &ParticleConfig, rng: &mut R) -> Self {
        let mut p = Particle {
            pos:         Vec2::ZERO,
            vel:         Vec2::ZERO,
            size:        0.0,
            alpha:       0.0,
            color_class: 0,
            highlighted: false,
        };
        p.reset(canvas, cfg, rng);
        p
    }

    /// Re-roll position, velocity, and the fixed attributes in place.
    pub fn reset<R: Rng + ?Sized>(&mut self, canvas: Vec2, cfg: &ParticleConfig, rng: &mut R) {
        self.pos = Vec2::new(rng.gen::<f32>() * canvas.x, rng.gen::<f32>() * canvas.y);
        self.vel = Vec2::new(
            (rng.gen::<f32>() - 0.5) * 2.0 * cfg.initial_speed,
            (rng.gen::<f32>() - 0.5) * 2.0 * cfg.initial_speed,
        );
        self.size        = rng.gen::<f32>() * cfg.size_range + cfg.min_size;
        self.alpha       = rng.gen::<f32>() * cfg.alpha_range + cfg.min_alpha;
        self.color_class = pick_color_class(&cfg.color_weights, rng.gen::<f32>());
        self.highlighted = false;
    }

    pub fn sprite_key(&self) -> SpriteKey {
        SpriteKey { color_class: self.color_class, highlighted: self.highlighted }
    }

    /// Clamp to `[0, canvas]` and flip the velocity component of every edge
    /// that was crossed.
    pub fn reflect(&mut self, canvas: Vec2) {
        if self.pos.x < 0.0      { self.pos.x = 0.0;      self.vel.x = -self.vel.x; }
        if self.pos.x > canvas.x { self.pos.x = canvas.x; self.vel.x = -self.vel.x; }
        if self.pos.y < 0.0      { self.pos.y = 0.0;      self.vel.y = -self.vel.y; }
        if self.pos.y > canvas.y { self.pos.y = canvas.y; self.vel.y = -self.vel.y; }
    }
}

/// Map a uniform draw `r ∈ [0, 1)` to a class.  The first class owns the top
/// of the range: with weights `[0.3, 0.4, 0.3]`, `r > 0.7` → 0, `r > 0.3` → 1,
/// otherwise 2.
pub fn pick_color_class(weights: &[f32; 3], r: f32) -> u8 {
    let mut upper = 1.0;
    for (class, &w) in weights.iter().enumerate().take(weights.len() - 1) {
        upper -= w;
        if r > upper {
            return class as u8;
        }
    }
    (weights.len() - 1) as u8
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleField
// ════════════════════════════════════════════════════════════════════════════

pub struct ParticleField {
    particles: Vec<Particle>,
    canvas:    Vec2,
    cfg:       ParticleConfig,
    forces:    ForceField,
    rng:       StdRng,
}

impl ParticleField {
    pub fn new(canvas: Vec2, cfg: ParticleConfig, forces: ForceField, mut rng: StdRng) -> Result<Self> {
        check_canvas(canvas)?;
        let particles = (0..cfg.count)
            .map(|_| Particle::spawn(canvas, &cfg, &mut rng))
            .collect();
        Ok(ParticleField { particles, canvas, cfg, forces, rng })
    }

    /// Advance every particle one frame.  Returns how many are highlighted.
    pub fn step(&mut self, hand: &HandField) -> usize {
        let center = self.canvas / 2.0;
        let mut lit = 0;
        for p in self.particles.iter_mut() {
            let out = self.forces.apply(p.pos, p.vel, hand, center, &mut self.rng);
            p.vel += out.velocity_delta;
            p.highlighted = out.highlighted;
            p.pos += p.vel;
            p.reflect(self.canvas);
            lit += out.highlighted as usize;
        }
        lit
    }

    /// New canvas bounds.  Particles outside are pulled back by the next
    /// step's reflection.
    pub fn resize(&mut self, canvas: Vec2) -> Result<()> {
        check_canvas(canvas)?;
        self.canvas = canvas;
        Ok(())
    }

    /// Re-roll every particle.
    pub fn reset_all(&mut self) {
        for p in self.particles.iter_mut() {
            p.reset(self.canvas, &self.cfg, &mut self.rng);
        }
    }

    pub fn particles(&self) -> &[Particle] { &self.particles }
    pub fn len(&self)       -> usize       { self.particles.len() }
    pub fn is_empty(&self)  -> bool        { self.particles.is_empty() }
    pub fn canvas(&self)    -> Vec2        { self.canvas }
}

fn check_canvas(canvas: Vec2) -> Result<()> {
    if !(canvas.x >= 1.0 && canvas.y >= 1.0) {
        return Err(FieldError::EmptyCanvas(canvas.x, canvas.y));
    }
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
