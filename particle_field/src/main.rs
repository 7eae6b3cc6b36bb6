//! field_replay: headless scripted run of the particle field.
//!
//! Plays idle → gather → scatter → no hand with a synthetic hand and checks
//! the frame invariants as it goes.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use glam::Vec2;
use hand_pose::synth::synthetic_hand;
use hand_pose::{HandInput, HandPose};
use log::{info, warn};
use particle_field::{FieldConfig, FieldSim};
use pico_args::Arguments;

const HELP: &str = "\
field_replay — headless particle field replay

USAGE:
  field_replay [OPTIONS]

OPTIONS:
  --config <path>     TOML config (defaults are built in)
  --frames <n>        frames per phase [default: 120]
  --cycles <n>        times to repeat the script [default: 1]
  --particles <n>     override particles.count
  --width <px>        canvas width [default: 1280]
  --height <px>       canvas height [default: 720]
  --seed <n>          RNG seed [default: 1]
  -h, --help          print this help
";

struct Args {
    config:    Option<PathBuf>,
    frames:    u32,
    cycles:    u32,
    particles: Option<usize>,
    width:     f32,
    height:    f32,
    seed:      u64,
}

#[derive(Clone, Copy)]
enum Phase {
    Idle,
    Gather,
    Scatter,
    NoHand,
}

impl Phase {
    const SCRIPT: [Phase; 4] = [Phase::Idle, Phase::Gather, Phase::Scatter, Phase::NoHand];

    fn name(&self) -> &'static str {
        match self {
            Phase::Idle    => "idle",
            Phase::Gather  => "gather",
            Phase::Scatter => "scatter",
            Phase::NoHand  => "no hand",
        }
    }

    fn pose(&self) -> Option<HandPose> {
        match self {
            Phase::Idle    => Some(HandPose::Relaxed),
            Phase::Gather  => Some(HandPose::Pinched),
            Phase::Scatter => Some(HandPose::Splayed),
            Phase::NoHand  => None,
        }
    }
}

#[derive(Default)]
struct PhaseReport {
    frames:        u32,
    peak_lit:      usize,
    bloom_frames:  u32,
    out_of_bounds: usize,
    count_changes: u32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut pargs = Arguments::from_env();
    if pargs.contains(["-h", "--help"]) {
        print!("{}", HELP);
        return Ok(());
    }
    let args = Args {
        config:    pargs.opt_value_from_str("--config")?,
        frames:    pargs.opt_value_from_str("--frames")?.unwrap_or(120),
        cycles:    pargs.opt_value_from_str("--cycles")?.unwrap_or(1),
        particles: pargs.opt_value_from_str("--particles")?,
        width:     pargs.opt_value_from_str("--width")?.unwrap_or(1280.0),
        height:    pargs.opt_value_from_str("--height")?.unwrap_or(720.0),
        seed:      pargs.opt_value_from_str("--seed")?.unwrap_or(1),
    };
    let rest = pargs.finish();
    if !rest.is_empty() {
        bail!("unexpected arguments: {:?}", rest);
    }

    let mut cfg = match &args.config {
        Some(path) => FieldConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => FieldConfig::default(),
    };
    if let Some(n) = args.particles {
        cfg.particles.count = n;
    }

    let canvas = Vec2::new(args.width, args.height);
    let mut sim = FieldSim::new(cfg, canvas, args.seed)?;
    sim.set_video_size(canvas);
    sim.mark_ready();
    sim.start()?;

    let expected_count = sim.field().len();
    let mut violations = 0usize;

    for cycle in 0..args.cycles {
        let blasts_before = sim.tracker().blasts_triggered();

        for phase in Phase::SCRIPT {
            let report = run_phase(&mut sim, phase, args.frames, expected_count);
            info!(
                "cycle {} {:>7}: {} frames, peak lit {}, bloom frames {}",
                cycle, phase.name(), report.frames, report.peak_lit, report.bloom_frames,
            );
            if report.out_of_bounds > 0 {
                warn!("{}: {} particle positions left the canvas", phase.name(), report.out_of_bounds);
            }
            if report.count_changes > 0 {
                warn!("{}: particle count changed on {} frames", phase.name(), report.count_changes);
            }
            violations += report.out_of_bounds + report.count_changes as usize;
        }

        let blasts = sim.tracker().blasts_triggered() - blasts_before;
        info!("cycle {}: {} blast(s)", cycle, blasts);
        if args.frames > 0 && blasts != 1 {
            warn!("cycle {}: expected exactly one blast, got {}", cycle, blasts);
            violations += 1;
        }
    }

    sim.stop();
    if violations > 0 {
        bail!("{} invariant violation(s)", violations);
    }
    info!("replay clean after {} frames", sim.frames());
    Ok(())
}

fn run_phase(sim: &mut FieldSim, phase: Phase, frames: u32, expected_count: usize) -> PhaseReport {
    let mut report = PhaseReport::default();

    for i in 0..frames {
        // Hand circles slowly around the middle of the frame
        let t      = i as f32 / 60.0;
        let center = Vec2::new(0.5 + 0.15 * t.cos(), 0.5 + 0.1 * t.sin());
        let input  = match phase.pose() {
            Some(pose) => HandInput::Present(synthetic_hand(center, 0.12, pose)),
            None       => HandInput::Absent,
        };

        let frame = sim.step(input);
        report.frames += 1;
        report.peak_lit = report.peak_lit.max(frame.stats.highlighted);
        report.bloom_frames += frame.stats.blast_alive as u32;

        let canvas = sim.canvas();
        let particles = sim.field().particles();
        if particles.len() != expected_count {
            report.count_changes += 1;
        }
        report.out_of_bounds += particles
            .iter()
            .filter(|p| !(0.0..=canvas.x).contains(&p.pos.x) || !(0.0..=canvas.y).contains(&p.pos.y))
            .count();
    }
    report
}
