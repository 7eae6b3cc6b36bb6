//! The per-frame driver.
//!
//! [`FieldSim`] owns every piece of frame state and advances it in a fixed
//! order on each [`FieldSim::step`]:
//!
//! 1. classify the detection (skipped for `Unchanged`) and feed the tracker
//! 2. integrate the particles against the tracker's hand
//! 3. compose: clear, bloom (then fade it), particles, overlay, background
//!
//! Scheduling belongs to the caller.  `start`/`stop` are flags the caller
//! checks before asking for the next frame.

use glam::Vec2;
use hand_pose::{classify, CoverTransform, HandInput, Thresholds};
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::compositor::{Compositor, FrameStats, RenderFrame};
use crate::config::FieldConfig;
use crate::error::{FieldError, Result};
use crate::force::ForceField;
use crate::particle::ParticleField;
use crate::sprite::SpriteAtlas;
use crate::tracker::GestureTracker;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Readiness {
    /// Detector still coming up.
    Loading,
    Ready,
    Failed(String),
}

pub struct FieldSim {
    thresholds: Thresholds,
    cover:      CoverTransform,
    video:      Vec2,
    field:      ParticleField,
    tracker:    GestureTracker,
    compositor: Compositor,
    atlas:      SpriteAtlas,
    frame:      RenderFrame,
    readiness:  Readiness,
    running:    bool,
    frames:     u64,
}

impl FieldSim {
    pub fn new(cfg: FieldConfig, canvas: Vec2, seed: u64) -> Result<Self> {
        cfg.validate()?;

        let forces = ForceField::new(cfg.force.clone(), cfg.ambient.clone());
        let field  = ParticleField::new(
            canvas,
            cfg.particles.clone(),
            forces,
            StdRng::seed_from_u64(seed),
        )?;
        let compositor = Compositor::new(
            cfg.particles.draw_scale,
            cfg.blast.clone(),
            cfg.overlay.clone(),
            cfg.parallax.clone(),
        );

        info!("field: {} particles on {}x{}", field.len(), canvas.x, canvas.y);

        Ok(FieldSim {
            thresholds: cfg.gesture.thresholds(),
            cover:      CoverTransform::default(),
            video:      Vec2::ZERO,
            frame:      RenderFrame::with_capacity(field.len()),
            field,
            tracker:    GestureTracker::new(cfg.blast),
            compositor,
            atlas:      SpriteAtlas::build(),
            readiness:  Readiness::Loading,
            running:    false,
            frames:     0,
        })
    }

    // ── lifecycle ────────────────────────────────────────────────────────

    pub fn mark_ready(&mut self) {
        info!("detector ready");
        self.readiness = Readiness::Ready;
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        error!("detector failed: {}", reason);
        self.readiness = Readiness::Failed(reason);
        self.running   = false;
    }

    pub fn start(&mut self) -> Result<()> {
        match &self.readiness {
            Readiness::Ready => {
                if !self.running {
                    info!("field started");
                }
                self.running = true;
                Ok(())
            }
            Readiness::Loading        => Err(FieldError::NotReady("detector still loading".into())),
            Readiness::Failed(reason) => Err(FieldError::NotReady(reason.clone())),
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            info!("field stopped after {} frames", self.frames);
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool { self.running }
    pub fn readiness(&self)  -> &Readiness { &self.readiness }

    // ── geometry ─────────────────────────────────────────────────────────

    /// New canvas size.  The cover mapping follows.
    pub fn resize(&mut self, canvas: Vec2) -> Result<()> {
        self.field.resize(canvas)?;
        self.cover = CoverTransform::compute(self.video.x, self.video.y, canvas.x, canvas.y);
        info!("resized to {}x{}", canvas.x, canvas.y);
        Ok(())
    }

    /// Source video size.  Ignored until both sides are positive.
    pub fn set_video_size(&mut self, video: Vec2) {
        if video == self.video || video.x <= 0.0 || video.y <= 0.0 {
            return;
        }
        self.video = video;
        let canvas = self.field.canvas();
        self.cover = CoverTransform::compute(video.x, video.y, canvas.x, canvas.y);
    }

    // ── frame ────────────────────────────────────────────────────────────

    /// Advance one frame and return what to draw.
    pub fn step(&mut self, input: HandInput) -> &RenderFrame {
        if let Some(reading) = classify(&input, &self.cover, &self.thresholds) {
            self.tracker.observe(reading);
            // A hand the classifier dropped has no anchor and no preview
            let hand = match &input {
                HandInput::Present(hand) if reading.anchor.is_some() => Some(hand),
                _ => None,
            };
            self.compositor.detected(hand);
        }

        let highlighted = self.field.step(&self.tracker.hand_field());

        let canvas = self.field.canvas();
        self.compositor.begin(&mut self.frame, canvas);
        let blast_alive = match self.tracker.blast().copied() {
            Some(blast) => {
                self.compositor.bloom(&mut self.frame, &blast);
                true
            }
            None => false,
        };
        self.tracker.decay_blast();
        self.compositor.particles(&mut self.frame, self.field.particles());
        self.compositor.presentation(&mut self.frame, self.tracker.current());

        self.frames += 1;
        self.frame.stats = FrameStats {
            frame: self.frames,
            state: self.tracker.current().state,
            highlighted,
            blast_alive,
        };
        &self.frame
    }

    /// Re-roll every particle; gesture and blast state are kept.
    pub fn reset_particles(&mut self) {
        self.field.reset_all();
    }

    pub fn frame(&self)   -> &RenderFrame     { &self.frame }
    pub fn field(&self)   -> &ParticleField   { &self.field }
    pub fn tracker(&self) -> &GestureTracker  { &self.tracker }
    pub fn atlas(&self)   -> &SpriteAtlas     { &self.atlas }
    pub fn cover(&self)   -> &CoverTransform  { &self.cover }
    pub fn canvas(&self)  -> Vec2             { self.field.canvas() }
    pub fn frames(&self)  -> u64              { self.frames }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
