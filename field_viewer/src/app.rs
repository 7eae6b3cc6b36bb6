//! Frame loop: detector → simulation → window.

use std::sync::mpsc;
use std::time::Instant;

use anyhow::{Context, Result};
use glam::Vec2;
use hand_pose::{HandDetector, HandInput};
use log::{info, warn};
use particle_field::{FieldConfig, FieldSim, Readiness};

use crate::gesture::{PointerSample, SimHandDetector};
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

pub struct AppConfig {
    pub field:  FieldConfig,
    pub width:  usize,
    pub height: usize,
    pub seed:   u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            field:  FieldConfig::default(),
            width:  1280,
            height: 720,
            seed:   0x5EED,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Detector selection
// ════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "leap")]
fn make_detector(_pointer_rx: mpsc::Receiver<PointerSample>) -> Box<dyn HandDetector> {
    Box::new(crate::gesture::LeapHandDetector::new())
}

#[cfg(not(feature = "leap"))]
fn make_detector(pointer_rx: mpsc::Receiver<PointerSample>) -> Box<dyn HandDetector> {
    Box::new(SimHandDetector::new(pointer_rx))
}

/// Bring the detector up and start the field.  `Ok(false)` when the detector
/// failed and the frame loop must not run.
fn bring_up(detector: &mut dyn HandDetector, sim: &mut FieldSim) -> Result<bool> {
    match detector.init() {
        Ok(()) => sim.mark_ready(),
        Err(e) => sim.mark_failed(e.to_string()),
    }
    if *sim.readiness() != Readiness::Ready {
        return Ok(false);
    }
    info!("detector: {}", detector.name());
    sim.set_video_size(detector.video_size());
    sim.start()?;
    Ok(true)
}

/// One line for the window title.
pub fn status_line(sim: &FieldSim) -> String {
    let stats = sim.frame().stats;
    let blast = if stats.blast_alive { "  ✶" } else { "" };
    format!("{}  lit {}{}", stats.state.name(), stats.highlighted, blast)
}

// ════════════════════════════════════════════════════════════════════════════
// run
// ════════════════════════════════════════════════════════════════════════════

pub fn run(cfg: AppConfig) -> Result<()> {
    // ── Pointer channel (visualizer → simulated detector) ────────────────
    let (pointer_tx, pointer_rx) = mpsc::channel::<PointerSample>();
    let mut detector = make_detector(pointer_rx);

    let mut vis = Visualizer::new(cfg.width, cfg.height, pointer_tx)
        .context("opening window")?;

    let (w, h) = vis.size();
    let mut sim = FieldSim::new(cfg.field, Vec2::new(w as f32, h as f32), cfg.seed)?;

    if !bring_up(detector.as_mut(), &mut sim)? {
        return Ok(());
    }

    let started = Instant::now();
    let mut size = (w, h);

    // ── Main loop ────────────────────────────────────────────────────────
    while vis.is_open() && sim.is_running() {
        // 1. Keyboard + pointer
        let actions = vis.poll_input();
        if actions.quit {
            sim.stop();
            break;
        }
        if actions.reset {
            sim.reset_particles();
        }

        // 2. Window resize
        let now_size = vis.size();
        if now_size != size && now_size.0 > 0 && now_size.1 > 0 {
            size = now_size;
            if let Err(e) = sim.resize(Vec2::new(size.0 as f32, size.1 as f32)) {
                warn!("resize ignored: {}", e);
            }
        }

        // 3. Detection; a failed frame keeps the last reading
        let now_ms = started.elapsed().as_millis() as u64;
        let input = match detector.detect(now_ms) {
            Ok(input) => input,
            Err(e) => {
                warn!("{}: {}", detector.name(), e);
                HandInput::Unchanged
            }
        };
        sim.set_video_size(detector.video_size());

        // 4. Simulate + render
        sim.step(input);
        if let Err(e) = vis.present(sim.frame(), sim.atlas()) {
            warn!("frame skipped: {}", e);
        }
        let status = status_line(&sim);
        vis.set_status(&status);
    }

    sim.stop();
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
