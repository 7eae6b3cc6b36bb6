//! Pre-rendered particle sprites.
//!
//! Six small soft discs are rasterized once at startup, one per
//! `(color class, highlighted)` pair, and every particle draw refers to one of
//! them by [`SpriteKey`].

// ════════════════════════════════════════════════════════════════════════════
// Color + gradient primitives
// ════════════════════════════════════════════════════════════════════════════

/// Straight (non-premultiplied) color, channels in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };

    pub fn from_rgb8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Rgba {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a.clamp(0.0, 1.0),
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Rgba { a: a.clamp(0.0, 1.0), ..self }
    }

    pub fn lerp(self, other: Rgba, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |x: f32, y: f32| x + (y - x) * t;
        Rgba {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Position along the radius, `0.0` = center, `1.0` = rim.
    pub offset: f32,
    pub color:  Rgba,
}

impl GradientStop {
    pub const fn new(offset: f32, color: Rgba) -> Self {
        GradientStop { offset, color }
    }
}

/// Color at `t` along a sorted stop list; clamps outside the first/last stop.
pub fn sample_gradient(stops: &[GradientStop], t: f32) -> Rgba {
    let Some(first) = stops.first() else { return Rgba::TRANSPARENT };
    if t <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            if span <= 0.0 {
                return b.color;
            }
            return a.color.lerp(b.color, (t - a.offset) / span);
        }
    }
    stops[stops.len() - 1].color
}

// ════════════════════════════════════════════════════════════════════════════
// Palette
// ════════════════════════════════════════════════════════════════════════════

pub const COLOR_CLASSES: usize = 3;

/// Pale → deep blue.
const BASE_COLORS: [(u8, u8, u8); COLOR_CLASSES] = [
    (180, 210, 255),
    ( 90, 140, 255),
    ( 40,  90, 220),
];

const HIGHLIGHT_COLORS: [(u8, u8, u8); COLOR_CLASSES] = [
    (230, 245, 255),
    (160, 200, 255),
    (100, 170, 255),
];

pub const SPRITE_SIZE: usize = 16;

// ════════════════════════════════════════════════════════════════════════════
// Sprite / SpriteAtlas
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpriteKey {
    pub color_class: u8,
    pub highlighted: bool,
}

impl SpriteKey {
    pub fn index(&self) -> usize {
        (self.color_class as usize).min(COLOR_CLASSES - 1) * 2 + self.highlighted as usize
    }
}

/// A square RGBA bitmap, row-major.
#[derive(Clone, Debug)]
pub struct Sprite {
    pub size:   usize,
    pub pixels: Vec<Rgba>,
}

impl Sprite {
    /// Filled disc shaded by a radial gradient from the center to the rim.
    pub fn radial(size: usize, stops: &[GradientStop]) -> Self {
        let center = size as f32 / 2.0;
        let mut pixels = vec![Rgba::TRANSPARENT; size * size];
        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 + 0.5 - center;
                let dy = y as f32 + 0.5 - center;
                let t  = (dx * dx + dy * dy).sqrt() / center;
                if t <= 1.0 {
                    pixels[y * size + x] = sample_gradient(stops, t);
                }
            }
        }
        Sprite { size, pixels }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        self.pixels[y * self.size + x]
    }
}

fn particle_stops((r, g, b): (u8, u8, u8), highlighted: bool) -> [GradientStop; 4] {
    let c = Rgba::from_rgb8(r, g, b, 1.0);
    [
        GradientStop::new(0.0, c),
        GradientStop::new(0.2, c.with_alpha(0.8)),
        GradientStop::new(0.3, c.with_alpha(if highlighted { 0.6 } else { 0.25 })),
        GradientStop::new(1.0, c.with_alpha(0.0)),
    ]
}

/// All six particle sprites, indexed by [`SpriteKey::index`].
#[derive(Clone, Debug)]
pub struct SpriteAtlas {
    sprites: Vec<Sprite>,
}

impl SpriteAtlas {
    pub fn build() -> Self {
        let mut sprites = Vec::with_capacity(COLOR_CLASSES * 2);
        for class in 0..COLOR_CLASSES {
            sprites.push(Sprite::radial(SPRITE_SIZE, &particle_stops(BASE_COLORS[class], false)));
            sprites.push(Sprite::radial(SPRITE_SIZE, &particle_stops(HIGHLIGHT_COLORS[class], true)));
        }
        SpriteAtlas { sprites }
    }

    pub fn get(&self, key: SpriteKey) -> &Sprite {
        &self.sprites[key.index()]
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

impl Default for SpriteAtlas {
    fn default() -> Self {
        SpriteAtlas::build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_cover_atlas_without_overlap() {
        let atlas = SpriteAtlas::build();
        let mut seen = std::collections::HashSet::new();
        for class in 0..COLOR_CLASSES as u8 {
            for highlighted in [false, true] {
                let i = SpriteKey { color_class: class, highlighted }.index();
                assert!(i < atlas.len());
                assert!(seen.insert(i));
            }
        }
    }

    #[test]
    fn gradient_interpolates_between_stops() {
        let stops = [
            GradientStop::new(0.0, Rgba::from_rgb8(0, 0, 0, 1.0)),
            GradientStop::new(1.0, Rgba::from_rgb8(255, 255, 255, 0.0)),
        ];
        let mid = sample_gradient(&stops, 0.5);
        assert!((mid.r - 0.5).abs() < 1e-6);
        assert!((mid.a - 0.5).abs() < 1e-6);
        assert_eq!(sample_gradient(&stops, -1.0), stops[0].color);
        assert_eq!(sample_gradient(&stops, 2.0), stops[1].color);
    }

    #[test]
    fn sprite_is_opaque_center_clear_corner() {
        let atlas = SpriteAtlas::build();
        let s = atlas.get(SpriteKey { color_class: 0, highlighted: false });
        let c = s.pixel(SPRITE_SIZE / 2, SPRITE_SIZE / 2);
        assert!(c.a > 0.8);
        assert_eq!(s.pixel(0, 0).a, 0.0);
    }

    #[test]
    fn highlight_halo_is_brighter() {
        let atlas = SpriteAtlas::build();
        // A pixel in the halo band between stops 0.3 and 1.0
        let (x, y) = (SPRITE_SIZE / 2 + 4, SPRITE_SIZE / 2);
        let base = atlas.get(SpriteKey { color_class: 1, highlighted: false }).pixel(x, y);
        let hi   = atlas.get(SpriteKey { color_class: 1, highlighted: true }).pixel(x, y);
        assert!(hi.a > base.a);
    }
}
