//! # particle_field
//!
//! A few thousand glowing particles that a hand can pull into a vortex or
//! blow apart.
//!
//! ## Gesture → field response
//!
//! | Gesture | Spread ratio | Field |
//! |---|---|---|
//! | Gather | `< 0.65` | particles spiral into the palm and light up |
//! | Scatter | `> 1.6` | particles are pushed out and spun; entering fires a bloom |
//! | Idle | otherwise | ambient drift toward the canvas center |
//! | no hand | | ambient drift; the overlay hides |
//!
//! ## Modules
//!
//! | Module | Provides |
//! |---|---|
//! | [`config`] | [`FieldConfig`] and its TOML loader |
//! | [`force`] | per-particle [`ForceField`] |
//! | [`particle`] | the [`ParticleField`] pool and integrator |
//! | [`tracker`] | [`GestureTracker`]: previous state and the blast |
//! | [`sprite`] | [`SpriteAtlas`] of pre-rendered particle sprites |
//! | [`compositor`] | [`RenderFrame`] draw commands and presentation |
//! | [`sim`] | [`FieldSim`], the per-frame driver |
//!
//! ## Quick start
//!
//! ```rust
//! use glam::Vec2;
//! use hand_pose::{HandInput, HandPose};
//! use hand_pose::synth::synthetic_hand;
//! use particle_field::{FieldConfig, FieldSim};
//!
//! let mut sim = FieldSim::new(FieldConfig::default(), Vec2::new(1280.0, 720.0), 1).unwrap();
//! sim.set_video_size(Vec2::new(1280.0, 720.0));
//! sim.mark_ready();
//! sim.start().unwrap();
//!
//! let hand  = synthetic_hand(Vec2::new(0.5, 0.5), 0.1, HandPose::Splayed);
//! let frame = sim.step(HandInput::Present(hand));
//! assert!(frame.stats.blast_alive);
//! assert_eq!(frame.sprite_count(), 4500);
//! ```

pub mod compositor;
pub mod config;
pub mod error;
pub mod force;
pub mod particle;
pub mod sim;
pub mod sprite;
pub mod tracker;

pub use compositor::{
    BackgroundOffset, BlendMode, DrawCommand, HandPreview, OverlayAsset, OverlayUpdate,
    RenderFrame,
};
pub use config::FieldConfig;
pub use error::{ConfigError, FieldError};
pub use force::{ForceField, ForceOutcome, HandField};
pub use particle::{Particle, ParticleField};
pub use sim::{FieldSim, Readiness};
pub use sprite::{Rgba, SpriteAtlas, SpriteKey};
pub use tracker::{BlastEvent, GestureTracker};
