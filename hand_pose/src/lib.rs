//! # hand_pose
//!
//! Turns a 21-landmark hand detection into a gesture the particle field can
//! react to.
//!
//! | Module | Provides |
//! |---|---|
//! | [`landmark`] | landmark indices, [`HandObservation`], [`HandInput`] |
//! | [`cover`] | [`CoverTransform`], video → screen mapping |
//! | [`classify`] | spread-ratio [`GestureState`] and screen-space anchor |
//! | [`detector`] | the [`HandDetector`] trait implemented by input backends |
//! | [`synth`] | canned hands for simulation and replay |
//!
//! ## Quick start
//!
//! ```rust
//! use glam::Vec2;
//! use hand_pose::{classify, CoverTransform, GestureState, HandInput, HandPose, Thresholds};
//! use hand_pose::synth::synthetic_hand;
//!
//! let cover = CoverTransform::compute(1280.0, 720.0, 1920.0, 1080.0);
//! let hand  = synthetic_hand(Vec2::new(0.5, 0.5), 0.12, HandPose::Pinched);
//! let read  = classify(&HandInput::Present(hand), &cover, &Thresholds::default()).unwrap();
//!
//! assert_eq!(read.state, GestureState::Gather);
//! assert!((read.anchor.unwrap() - Vec2::new(960.0, 540.0)).length() < 1e-2);
//! ```

pub mod classify;
pub mod cover;
pub mod detector;
pub mod landmark;
pub mod synth;

pub use classify::{classify, classify_hand, spread_ratio, GestureState, HandReading, Thresholds};
pub use cover::CoverTransform;
pub use detector::{DetectorError, HandDetector};
pub use landmark::{HandInput, HandObservation, Keypoint, PoseError, LANDMARK_COUNT};
pub use synth::HandPose;
