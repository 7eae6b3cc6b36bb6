//! Software-rendered window using `minifb`.
//!
//! The visualizer owns the window and the [`Raster`].  Each frame it samples
//! the pointer for the simulated detector and presents a [`RenderFrame`].
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  backdrop (parallax)                                     │
//! │        + particle layer (mirrored, additive)             │
//! │                     overlay character ◯                  │
//! │  ┌──────────┐                                            │
//! │  │ preview  │                                            │
//! │  └──────────┘                                            │
//! └──────────────────────────────────────────────────────────┘
//! ```

use std::sync::mpsc::Sender;
use std::time::Duration;

use glam::Vec2;
use hand_pose::HandPose;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use particle_field::{RenderFrame, SpriteAtlas};

use crate::gesture::PointerSample;
use crate::raster::Raster;

pub const TITLE: &str = "Hand Field";

/// What the keyboard asked for this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputActions {
    pub quit:  bool,
    pub reset: bool,
}

pub struct Visualizer {
    window:     Window,
    raster:     Raster,
    pointer_tx: Sender<PointerSample>,
    status:     String,
}

impl Visualizer {
    pub fn new(width: usize, height: usize, pointer_tx: Sender<PointerSample>) -> Result<Self, minifb::Error> {
        let mut window = Window::new(
            TITLE,
            width, height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            raster: Raster::new(width, height),
            pointer_tx,
            status: String::new(),
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Current window size.
    pub fn size(&self) -> (usize, usize) { self.window.get_size() }

    /// Read the keyboard and send this frame's pointer sample to the
    /// simulated detector.
    ///
    /// | Input | Hand |
    /// |---|---|
    /// | pointer | position |
    /// | `G` / left button | pinched (gather) |
    /// | `S` / right button | splayed (scatter) |
    /// | neither | relaxed |
    pub fn poll_input(&mut self) -> InputActions {
        let mut actions = InputActions::default();
        if !self.window.is_open() {
            actions.quit = true;
            return actions;
        }

        actions.quit  = self.window.is_key_pressed(Key::Escape, KeyRepeat::No)
                     || self.window.is_key_pressed(Key::Q, KeyRepeat::No);
        actions.reset = self.window.is_key_pressed(Key::R, KeyRepeat::No);

        let gather  = self.window.is_key_down(Key::G) || self.window.get_mouse_down(MouseButton::Left);
        let scatter = self.window.is_key_down(Key::S) || self.window.get_mouse_down(MouseButton::Right);
        let pose = match (gather, scatter) {
            (true, false) => HandPose::Pinched,
            (false, true) => HandPose::Splayed,
            _             => HandPose::Relaxed,
        };

        let (w, h) = self.window.get_size();
        let sample = PointerSample {
            pos:    self.window.get_mouse_pos(MouseMode::Discard).map(|(x, y)| Vec2::new(x, y)),
            window: Vec2::new(w as f32, h as f32),
            pose,
        };
        // Nobody listening when a hardware detector is in use
        let _ = self.pointer_tx.send(sample);

        actions
    }

    /// Rasterize and show one frame.
    pub fn present(&mut self, frame: &RenderFrame, atlas: &SpriteAtlas) -> Result<(), minifb::Error> {
        let (w, h) = (frame.canvas.x as usize, frame.canvas.y as usize);
        self.raster.resize(w, h);
        self.raster.render(frame, atlas);

        let (w, h) = self.raster.size();
        self.window.update_with_buffer(self.raster.pixels(), w, h)
    }

    /// Window title doubles as the status line.
    pub fn set_status(&mut self, status: &str) {
        if status != self.status {
            self.status = status.to_string();
            self.window.set_title(&format!("{} — {}", TITLE, status));
        }
    }
}
