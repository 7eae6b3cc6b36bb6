//! field_viewer: interactive entry point.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use field_viewer::app::{run, AppConfig};
use particle_field::FieldConfig;
use pico_args::Arguments;

const HELP: &str = "\
field_viewer — hand-driven particle field

USAGE:
  field_viewer [OPTIONS]

OPTIONS:
  --config <path>     TOML config (defaults are built in)
  --particles <n>     override particles.count
  --width <px>        window width [default: 1280]
  --height <px>       window height [default: 720]
  --seed <n>          RNG seed
  -h, --help          print this help
";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut pargs = Arguments::from_env();
    if pargs.contains(["-h", "--help"]) {
        print!("{}", HELP);
        return Ok(());
    }

    let mut cfg = AppConfig::default();
    let config: Option<PathBuf> = pargs.opt_value_from_str("--config")?;
    if let Some(path) = config {
        cfg.field = FieldConfig::load(&path)
            .with_context(|| format!("loading {}", path.display()))?;
    }
    if let Some(n) = pargs.opt_value_from_str("--particles")? {
        cfg.field.particles.count = n;
        cfg.field.validate()?;
    }
    if let Some(w) = pargs.opt_value_from_str("--width")? {
        cfg.width = w;
    }
    if let Some(h) = pargs.opt_value_from_str("--height")? {
        cfg.height = h;
    }
    if let Some(seed) = pargs.opt_value_from_str("--seed")? {
        cfg.seed = seed;
    }
    let rest = pargs.finish();
    if !rest.is_empty() {
        bail!("unexpected arguments: {:?}", rest);
    }

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              Hand Field — gesture particle field             ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Pointer simulation  (use --features leap for hardware)");
    println!("  {} particles, {}x{}", cfg.field.particles.count, cfg.width, cfg.height);
    println!();

    run(cfg)
}
