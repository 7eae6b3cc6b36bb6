//! Frame composition as render commands.
//!
//! The compositor never touches pixels.  It fills a reusable [`RenderFrame`]
//! with draw commands in paint order plus the per-frame updates for the
//! overlay character, the parallax background, and the hand preview inset.
//! A rasterizer (see the `field_viewer` crate) executes the frame.
//!
//! Paint order:
//!
//! ```text
//! Clear
//! [SetBlend(Additive) · RadialGradient(bloom) · SetBlend(Normal)]   while a blast is alive
//! SetBlend(Additive) · Sprite × N · SetBlend(Normal)
//! ```

use glam::Vec2;
use hand_pose::landmark::{HAND_CONNECTIONS, LANDMARK_COUNT};
use hand_pose::{GestureState, HandObservation, HandReading};

use crate::config::{BlastConfig, OverlayConfig, ParallaxConfig};
use crate::particle::Particle;
use crate::sprite::{GradientStop, Rgba, SpriteKey};
use crate::tracker::BlastEvent;

pub const PREVIEW_W: f32 = 320.0;
pub const PREVIEW_H: f32 = 180.0;

// ════════════════════════════════════════════════════════════════════════════
// Render commands
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendMode {
    /// Source-over.
    Normal,
    /// Colors add ("lighter").
    Additive,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCommand {
    Clear,
    SetBlend(BlendMode),
    /// Disc of `radius` around `center`, shaded center → rim.
    RadialGradient {
        center: Vec2,
        radius: f32,
        stops:  [GradientStop; 3],
    },
    /// Blit a particle sprite scaled to `size × size` with its top-left at
    /// `(x, y)`, multiplied by `alpha`.
    Sprite {
        key:   SpriteKey,
        x:     i32,
        y:     i32,
        size:  f32,
        alpha: f32,
    },
}

/// Which overlay artwork to show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayAsset {
    Resting,
    /// Shown while gathering.
    Inhaling,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OverlayUpdate {
    Hidden,
    Shown {
        position: Vec2,
        scale:    f32,
        mirrored: bool,
        asset:    OverlayAsset,
    },
}

/// Background position in percent, as for a CSS `background-position`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackgroundOffset {
    pub x_pct: f32,
    pub y_pct: f32,
}

/// Hand skeleton scaled into the preview inset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandPreview {
    pub joints: [Vec2; LANDMARK_COUNT],
}

impl HandPreview {
    pub fn from_observation(hand: &HandObservation) -> Self {
        let scale = Vec2::new(PREVIEW_W, PREVIEW_H);
        let mut joints = [Vec2::ZERO; LANDMARK_COUNT];
        for (j, k) in joints.iter_mut().zip(hand.keypoints.iter()) {
            *j = *k * scale;
        }
        HandPreview { joints }
    }

    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        HAND_CONNECTIONS.iter().map(|&(a, b)| (self.joints[a], self.joints[b]))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    pub frame:       u64,
    pub state:       GestureState,
    pub highlighted: usize,
    pub blast_alive: bool,
}

/// Everything one frame needs drawn.  Reused across frames; `commands` keeps
/// its capacity.
#[derive(Clone, Debug)]
pub struct RenderFrame {
    pub canvas:     Vec2,
    pub commands:   Vec<DrawCommand>,
    pub overlay:    OverlayUpdate,
    pub background: BackgroundOffset,
    pub preview:    Option<HandPreview>,
    pub stats:      FrameStats,
}

impl RenderFrame {
    pub fn with_capacity(particles: usize) -> Self {
        RenderFrame {
            canvas:     Vec2::ZERO,
            // Clear + bloom (3) + particle bracket (2)
            commands:   Vec::with_capacity(particles + 6),
            overlay:    OverlayUpdate::Hidden,
            background: BackgroundOffset { x_pct: 50.0, y_pct: 50.0 },
            preview:    None,
            stats:      FrameStats::default(),
        }
    }

    pub fn sprite_count(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, DrawCommand::Sprite { .. })).count()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Smoothed presentation state
// ════════════════════════════════════════════════════════════════════════════

/// Overlay scale, eased toward its target once per frame with a hand.
#[derive(Clone, Debug)]
pub struct OverlayState {
    cfg:   OverlayConfig,
    scale: f32,
}

impl OverlayState {
    pub fn new(cfg: OverlayConfig) -> Self {
        let scale = cfg.rest_scale;
        OverlayState { cfg, scale }
    }

    pub fn update(&mut self, reading: &HandReading, canvas: Vec2) -> OverlayUpdate {
        let Some(anchor) = reading.anchor else { return OverlayUpdate::Hidden };

        let gathering = reading.state == GestureState::Gather;
        let target = if gathering { self.cfg.gather_scale } else { self.cfg.rest_scale };
        self.scale += (target - self.scale) * self.cfg.smoothing;

        OverlayUpdate::Shown {
            position: Vec2::new(canvas.x - anchor.x, anchor.y),
            scale:    self.scale,
            mirrored: true,
            asset:    if gathering { OverlayAsset::Inhaling } else { OverlayAsset::Resting },
        }
    }

    pub fn scale(&self) -> f32 { self.scale }
}

/// Background offset eased toward the hand's displacement from center.
#[derive(Clone, Debug)]
pub struct Parallax {
    cfg:    ParallaxConfig,
    offset: Vec2,
}

impl Parallax {
    pub fn new(cfg: ParallaxConfig) -> Self {
        let offset = Vec2::splat(cfg.origin);
        Parallax { cfg, offset }
    }

    pub fn target(&self, anchor: Vec2, canvas: Vec2) -> Vec2 {
        let center = (canvas / 2.0).max(Vec2::ONE);
        let diff   = anchor - center;
        Vec2::new(
            self.cfg.origin + diff.x / center.x * self.cfg.x_range,
            self.cfg.origin + diff.y / center.y * self.cfg.y_range,
        )
    }

    /// Ease toward the anchor's target; hold still without a hand.
    pub fn update(&mut self, anchor: Option<Vec2>, canvas: Vec2) -> BackgroundOffset {
        if let Some(a) = anchor {
            let target = self.target(a, canvas);
            self.offset += (target - self.offset) * self.cfg.smoothing;
        }
        BackgroundOffset { x_pct: self.offset.x, y_pct: self.offset.y }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Compositor
// ════════════════════════════════════════════════════════════════════════════

pub struct Compositor {
    draw_scale: f32,
    blast:      BlastConfig,
    overlay:    OverlayState,
    parallax:   Parallax,
    preview:    Option<HandPreview>,
}

impl Compositor {
    pub fn new(draw_scale: f32, blast: BlastConfig, overlay: OverlayConfig, parallax: ParallaxConfig) -> Self {
        Compositor {
            draw_scale,
            blast,
            overlay:  OverlayState::new(overlay),
            parallax: Parallax::new(parallax),
            preview:  None,
        }
    }

    /// Start a frame: reset the buffer and clear the canvas.
    pub fn begin(&self, frame: &mut RenderFrame, canvas: Vec2) {
        frame.canvas = canvas;
        frame.commands.clear();
        frame.commands.push(DrawCommand::Clear);
    }

    /// Additive bloom for a live blast, drawn at its current intensity.
    pub fn bloom(&self, frame: &mut RenderFrame, blast: &BlastEvent) {
        let i = blast.intensity;
        let stops = [
            GradientStop::new(0.0, Rgba::from_rgb8(200, 255, 255, i * self.blast.core_alpha)),
            GradientStop::new(0.3, Rgba::from_rgb8(100, 255, 200, i * self.blast.mid_alpha)),
            GradientStop::new(1.0, Rgba::TRANSPARENT),
        ];
        frame.commands.push(DrawCommand::SetBlend(BlendMode::Additive));
        frame.commands.push(DrawCommand::RadialGradient {
            center: blast.center,
            radius: blast.radius(&self.blast),
            stops,
        });
        frame.commands.push(DrawCommand::SetBlend(BlendMode::Normal));
    }

    pub fn particles(&self, frame: &mut RenderFrame, particles: &[Particle]) {
        frame.commands.push(DrawCommand::SetBlend(BlendMode::Additive));
        for p in particles {
            let size = p.size * self.draw_scale;
            frame.commands.push(DrawCommand::Sprite {
                key:   p.sprite_key(),
                x:     (p.pos.x - size / 2.0) as i32,
                y:     (p.pos.y - size / 2.0) as i32,
                size,
                alpha: p.alpha,
            });
        }
        frame.commands.push(DrawCommand::SetBlend(BlendMode::Normal));
    }

    /// Overlay and background for the current reading.
    pub fn presentation(&mut self, frame: &mut RenderFrame, reading: &HandReading) {
        frame.overlay    = self.overlay.update(reading, frame.canvas);
        frame.background = self.parallax.update(reading.anchor, frame.canvas);
        frame.preview    = self.preview;
    }

    /// Refresh the preview inset from a fresh detection.  A detection with no
    /// hand blanks it.
    pub fn detected(&mut self, hand: Option<&HandObservation>) {
        self.preview = hand.map(HandPreview::from_observation);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
