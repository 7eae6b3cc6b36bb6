//! Tunable constants, loaded from TOML.
//!
//! Every section and field has a default, so a config file only needs to
//! name what it changes.  The bundled `config/default.toml` spells out the
//! defaults in full.

use std::fs;
use std::path::Path;

use hand_pose::Thresholds;
use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config/default.toml");

// ════════════════════════════════════════════════════════════════════════════
// Sections
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub count:         usize,
    pub min_size:      f32,
    pub size_range:    f32,
    pub min_alpha:     f32,
    pub alpha_range:   f32,
    /// Initial velocity components are uniform in `±initial_speed`.
    pub initial_speed: f32,
    /// Sprite edge in pixels = `size * draw_scale`.
    pub draw_scale:    f32,
    /// Probability of each color class, brightest first.
    pub color_weights: [f32; 3],
}

impl Default for ParticleConfig {
    fn default() -> Self {
        ParticleConfig {
            count:         4500,
            min_size:      0.5,
            size_range:    1.0,
            min_alpha:     0.3,
            alpha_range:   0.7,
            initial_speed: 1.0,
            draw_scale:    5.0,
            color_weights: [0.3, 0.4, 0.3],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub gather_below:   f32,
    pub scatter_above:  f32,
    pub min_confidence: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        let t = Thresholds::default();
        GestureConfig {
            gather_below:   t.gather_below,
            scatter_above:  t.scatter_above,
            min_confidence: t.min_confidence,
        }
    }
}

impl GestureConfig {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            gather_below:   self.gather_below,
            scatter_above:  self.scatter_above,
            min_confidence: self.min_confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    pub influence_radius:  f32,

    pub gather_strength:   f32,
    pub gather_softening:  f32,
    pub gather_swirl:      f32,
    /// Inside this distance the vortex core damping applies.
    pub core_radius:       f32,
    pub core_damping:      f32,
    pub gather_damping:    f32,
    pub gather_highlight:  f32,

    pub scatter_strength:  f32,
    pub scatter_softening: f32,
    /// Swirl as a fraction of the outward push.
    pub scatter_swirl:     f32,
    pub scatter_damping:   f32,
    pub scatter_highlight: f32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        ForceConfig {
            influence_radius:  1200.0,
            gather_strength:   2500.0,
            gather_softening:  20.0,
            gather_swirl:      0.8,
            core_radius:       60.0,
            core_damping:      0.75,
            gather_damping:    0.92,
            gather_highlight:  0.3,
            scatter_strength:  1000.0,
            scatter_softening: 40.0,
            scatter_swirl:     0.4,
            scatter_damping:   0.92,
            scatter_highlight: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    pub center_dead_zone: f32,
    pub center_pull:      f32,
    /// Per-axis jitter is uniform in `±jitter`.
    pub jitter:           f32,
    pub damping:          f32,
    pub escape_speed:     f32,
    pub escape_damping:   f32,
    pub cruise_speed:     f32,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        AmbientConfig {
            center_dead_zone: 80.0,
            center_pull:      0.08,
            jitter:           0.05,
            damping:          0.97,
            escape_speed:     4.0,
            escape_damping:   0.85,
            cruise_speed:     1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BlastConfig {
    pub decay:       f32,
    pub cutoff:      f32,
    pub base_radius: f32,
    pub growth:      f32,
    pub core_alpha:  f32,
    pub mid_alpha:   f32,
}

impl Default for BlastConfig {
    fn default() -> Self {
        BlastConfig {
            decay:       0.88,
            cutoff:      0.01,
            base_radius: 300.0,
            growth:      2000.0,
            core_alpha:  0.4,
            mid_alpha:   0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub gather_scale: f32,
    pub rest_scale:   f32,
    pub smoothing:    f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        OverlayConfig { gather_scale: 1.4, rest_scale: 1.0, smoothing: 0.15 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParallaxConfig {
    /// Resting background position, percent.
    pub origin:    f32,
    pub x_range:   f32,
    pub y_range:   f32,
    pub smoothing: f32,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        ParallaxConfig { origin: 50.0, x_range: 67.5, y_range: 45.0, smoothing: 0.1 }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FieldConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub particles: ParticleConfig,
    pub gesture:   GestureConfig,
    pub force:     ForceConfig,
    pub ambient:   AmbientConfig,
    pub blast:     BlastConfig,
    pub overlay:   OverlayConfig,
    pub parallax:  ParallaxConfig,
}

impl FieldConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: FieldConfig = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // NaN slips past every ordered comparison below
        if let Some((name, x)) = self.numbers().into_iter().find(|(_, x)| !x.is_finite()) {
            return invalid(&format!("{name} must be finite, got {x}"));
        }

        let p = &self.particles;
        if p.count == 0 {
            return invalid("particles.count must be positive");
        }
        if p.min_size <= 0.0 || p.size_range < 0.0 || p.draw_scale <= 0.0 {
            return invalid("particle sizes must be positive");
        }
        if !(0.0..=1.0).contains(&p.min_alpha) || p.min_alpha + p.alpha_range > 1.0 + 1e-6 {
            return invalid("particle alpha must stay within [0, 1]");
        }
        let w: f32 = p.color_weights.iter().sum();
        if p.color_weights.iter().any(|&x| x < 0.0) || (w - 1.0).abs() > 1e-3 {
            return invalid("particles.color_weights must be non-negative and sum to 1");
        }

        let g = &self.gesture;
        if g.gather_below >= g.scatter_above {
            return invalid("gesture.gather_below must be below gesture.scatter_above");
        }
        if !(0.0..=1.0).contains(&g.min_confidence) {
            return invalid("gesture.min_confidence must be in [0, 1]");
        }

        let f = &self.force;
        if f.influence_radius <= 0.0 || f.core_radius < 0.0 {
            return invalid("force radii must be positive");
        }
        if f.gather_softening <= 0.0 || f.scatter_softening <= 0.0 {
            return invalid("force softening must be positive");
        }
        for (name, x) in [
            ("force.gather_strength",  f.gather_strength),
            ("force.gather_swirl",     f.gather_swirl),
            ("force.scatter_strength", f.scatter_strength),
            ("force.scatter_swirl",    f.scatter_swirl),
            ("ambient.center_pull",    self.ambient.center_pull),
            ("ambient.jitter",         self.ambient.jitter),
        ] {
            if x < 0.0 {
                return invalid(&format!("{name} must not be negative, got {x}"));
            }
        }
        for (name, d) in [
            ("force.core_damping",    f.core_damping),
            ("force.gather_damping",  f.gather_damping),
            ("force.scatter_damping", f.scatter_damping),
            ("ambient.damping",       self.ambient.damping),
            ("ambient.escape_damping", self.ambient.escape_damping),
            ("overlay.smoothing",     self.overlay.smoothing),
            ("parallax.smoothing",    self.parallax.smoothing),
        ] {
            if !(d > 0.0 && d <= 1.0) {
                return invalid(&format!("{name} must be in (0, 1], got {d}"));
            }
        }

        let a = &self.ambient;
        if a.cruise_speed <= 0.0 || a.escape_speed < a.cruise_speed {
            return invalid("ambient.escape_speed must be at least ambient.cruise_speed");
        }

        let b = &self.blast;
        if !(b.decay > 0.0 && b.decay < 1.0) {
            return invalid("blast.decay must be in (0, 1)");
        }
        if !(b.cutoff > 0.0 && b.cutoff < 1.0) {
            return invalid("blast.cutoff must be in (0, 1)");
        }
        Ok(())
    }

    /// Every float setting, by its TOML path.
    fn numbers(&self) -> Vec<(&'static str, f32)> {
        let (p, g, f, a) = (&self.particles, &self.gesture, &self.force, &self.ambient);
        let (b, o, x) = (&self.blast, &self.overlay, &self.parallax);
        vec![
            ("particles.min_size",          p.min_size),
            ("particles.size_range",        p.size_range),
            ("particles.min_alpha",         p.min_alpha),
            ("particles.alpha_range",       p.alpha_range),
            ("particles.initial_speed",     p.initial_speed),
            ("particles.draw_scale",        p.draw_scale),
            ("particles.color_weights[0]",  p.color_weights[0]),
            ("particles.color_weights[1]",  p.color_weights[1]),
            ("particles.color_weights[2]",  p.color_weights[2]),
            ("gesture.gather_below",        g.gather_below),
            ("gesture.scatter_above",       g.scatter_above),
            ("gesture.min_confidence",      g.min_confidence),
            ("force.influence_radius",      f.influence_radius),
            ("force.gather_strength",       f.gather_strength),
            ("force.gather_softening",      f.gather_softening),
            ("force.gather_swirl",          f.gather_swirl),
            ("force.core_radius",           f.core_radius),
            ("force.core_damping",          f.core_damping),
            ("force.gather_damping",        f.gather_damping),
            ("force.gather_highlight",      f.gather_highlight),
            ("force.scatter_strength",      f.scatter_strength),
            ("force.scatter_softening",     f.scatter_softening),
            ("force.scatter_swirl",         f.scatter_swirl),
            ("force.scatter_damping",       f.scatter_damping),
            ("force.scatter_highlight",     f.scatter_highlight),
            ("ambient.center_dead_zone",    a.center_dead_zone),
            ("ambient.center_pull",         a.center_pull),
            ("ambient.jitter",              a.jitter),
            ("ambient.damping",             a.damping),
            ("ambient.escape_speed",        a.escape_speed),
            ("ambient.escape_damping",      a.escape_damping),
            ("ambient.cruise_speed",        a.cruise_speed),
            ("blast.decay",                 b.decay),
            ("blast.cutoff",                b.cutoff),
            ("blast.base_radius",           b.base_radius),
            ("blast.growth",                b.growth),
            ("blast.core_alpha",            b.core_alpha),
            ("blast.mid_alpha",             b.mid_alpha),
            ("overlay.gather_scale",        o.gather_scale),
            ("overlay.rest_scale",          o.rest_scale),
            ("overlay.smoothing",           o.smoothing),
            ("parallax.origin",             x.origin),
            ("parallax.x_range",            x.x_range),
            ("parallax.y_range",            x.y_range),
            ("parallax.smoothing",          x.smoothing),
        ]
    }
}

fn invalid(msg: &str) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid(msg.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_default_matches_code_default() {
        let cfg = FieldConfig::from_toml_str(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(cfg, FieldConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg = FieldConfig::from_toml_str("[particles]\ncount = 100\n").unwrap();
        assert_eq!(cfg.particles.count, 100);
        assert_eq!(cfg.force, ForceConfig::default());
        assert_eq!(cfg.particles.draw_scale, 5.0);
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(FieldConfig::from_toml_str("").unwrap(), FieldConfig::default());
    }

    #[test]
    fn rejects_crossed_thresholds() {
        let err = FieldConfig::from_toml_str(
            "[gesture]\ngather_below = 2.0\nscatter_above = 1.0\n",
        ).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_runaway_decay() {
        let err = FieldConfig::from_toml_str("[blast]\ndecay = 1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_bad_color_weights() {
        let err = FieldConfig::from_toml_str(
            "[particles]\ncolor_weights = [0.5, 0.5, 0.5]\n",
        ).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn reports_parse_errors() {
        let err = FieldConfig::from_toml_str("[particles\ncount = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = FieldConfig::load(Path::new("/nonexistent/field.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/field.toml"));
    }

    #[test]
    fn rejects_nan_radius() {
        let err = FieldConfig::from_toml_str(
            "[particles]\ncount = 50\n[force]\ninfluence_radius = nan\n",
        ).unwrap_err();
        assert!(err.to_string().contains("force.influence_radius"), "{err}");
    }

    #[test]
    fn rejects_non_finite_anywhere() {
        for text in [
            "[ambient]\ncruise_speed = nan\n",
            "[force]\ngather_damping = nan\n",
            "[force]\ngather_strength = inf\n",
            "[ambient]\njitter = nan\n",
            "[gesture]\nmin_confidence = nan\n",
            "[blast]\ngrowth = -inf\n",
        ] {
            let err = FieldConfig::from_toml_str(text).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{text}");
        }
    }

    #[test]
    fn rejects_negative_strengths() {
        for text in [
            "[force]\nscatter_strength = -1.0\n",
            "[ambient]\ncenter_pull = -0.1\n",
            "[ambient]\njitter = -0.05\n",
        ] {
            assert!(FieldConfig::from_toml_str(text).is_err(), "{text}");
        }
    }

    #[test]
    fn confidence_gate_stays_in_unit_range() {
        assert!(FieldConfig::from_toml_str("[gesture]\nmin_confidence = 1.5\n").is_err());
        assert!(FieldConfig::from_toml_str("[gesture]\nmin_confidence = 1.0\n").is_ok());
    }

    #[test]
    fn thresholds_follow_gesture_section() {
        let cfg = FieldConfig::from_toml_str("[gesture]\nmin_confidence = 0.4\n").unwrap();
        let t = cfg.gesture.thresholds();
        assert_eq!(t.min_confidence, 0.4);
        assert_eq!(t.gather_below, 0.65);
    }
}
