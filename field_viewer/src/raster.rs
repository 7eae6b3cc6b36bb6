//! Software rasterizer for [`RenderFrame`]s.
//!
//! Particles and bloom go to a float RGB layer in simulation coordinates.
//! On present the layer is mirrored horizontally and added onto the
//! parallax backdrop; the overlay character and the preview inset are drawn
//! on top in screen coordinates.
//!
//! ```text
//! out(x, y) = backdrop(x + ox, y + oy) + layer(W − 1 − x, y)
//! ```

use glam::Vec2;
use particle_field::compositor::{PREVIEW_H, PREVIEW_W};
use particle_field::sprite::{sample_gradient, GradientStop, Rgba, SpriteAtlas};
use particle_field::{
    BackgroundOffset, BlendMode, DrawCommand, HandPreview, OverlayAsset, OverlayUpdate,
    RenderFrame, SpriteKey,
};

const PREVIEW_MARGIN: usize = 16;
const PREVIEW_BONE:   u32   = 0xFF5AE0C8;
const PREVIEW_JOINT:  u32   = 0xFFFFFFFF;
const OVERLAY_RADIUS: f32   = 36.0;
const OVERLAY_BODY:   u32   = 0xFFB8D8FF;
const OVERLAY_INHALE: u32   = 0xFFD8F0FF;
const OVERLAY_INK:    u32   = 0xFF14203A;

/// Backdrop is this much larger than the viewport, like a `150%` CSS size.
const BACKDROP_SCALE: f32 = 1.5;

// ════════════════════════════════════════════════════════════════════════════
// Backdrop
// ════════════════════════════════════════════════════════════════════════════

/// Procedural night-sky tile, rebuilt on resize.
pub struct Backdrop {
    width:  usize,
    height: usize,
    pixels: Vec<[f32; 3]>,
}

impl Backdrop {
    pub fn new(view_w: usize, view_h: usize) -> Self {
        let width  = ((view_w as f32 * BACKDROP_SCALE) as usize).max(1);
        let height = ((view_h as f32 * BACKDROP_SCALE) as usize).max(1);
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(sky(x, y, width, height));
            }
        }
        Backdrop { width, height, pixels }
    }

    /// Top-left of the tile relative to the viewport, as CSS computes a
    /// percentage `background-position`.
    pub fn origin(&self, view_w: usize, view_h: usize, offset: BackgroundOffset) -> (isize, isize) {
        let ox = (view_w as f32 - self.width as f32)  * offset.x_pct / 100.0;
        let oy = (view_h as f32 - self.height as f32) * offset.y_pct / 100.0;
        (ox.round() as isize, oy.round() as isize)
    }

    /// Sample at viewport `(x, y)` with the tile placed at `origin`.
    /// The tile repeats in both directions.
    pub fn sample(&self, x: usize, y: usize, origin: (isize, isize)) -> [f32; 3] {
        let bx = (x as isize - origin.0).rem_euclid(self.width as isize) as usize;
        let by = (y as isize - origin.1).rem_euclid(self.height as isize) as usize;
        self.pixels[by * self.width + bx]
    }

    pub fn size(&self) -> (usize, usize) { (self.width, self.height) }
}

fn sky(x: usize, y: usize, w: usize, h: usize) -> [f32; 3] {
    let u = x as f32 / w as f32;
    let v = y as f32 / h as f32;

    // Navy at the top, deep teal at the bottom
    let mut c = [0.03 + 0.01 * v, 0.05 + 0.11 * v, 0.13 + 0.10 * v];

    // Soft nebula band
    let band = (u * 9.0 + (v * 5.0).sin() * 1.5).sin() * 0.5 + 0.5;
    let veil = band * (1.0 - (v - 0.45).abs() * 2.0).max(0.0) * 0.08;
    c[0] += veil * 0.6;
    c[1] += veil * 0.8;
    c[2] += veil;

    // Sparse stars
    let hash = (x as u32).wrapping_mul(73_856_093) ^ (y as u32).wrapping_mul(19_349_663);
    if hash.wrapping_mul(2_654_435_761) % 997 == 0 {
        c = [0.75, 0.8, 0.9];
    }
    c
}

// ════════════════════════════════════════════════════════════════════════════
// Raster
// ════════════════════════════════════════════════════════════════════════════

pub struct Raster {
    width:    usize,
    height:   usize,
    /// Particle layer, premultiplied linear RGB.
    layer:    Vec<[f32; 3]>,
    backdrop: Backdrop,
    /// ARGB for `minifb`.
    out:      Vec<u32>,
    blend:    BlendMode,
}

impl Raster {
    pub fn new(width: usize, height: usize) -> Self {
        let width  = width.max(1);
        let height = height.max(1);
        Raster {
            width,
            height,
            layer:    vec![[0.0; 3]; width * height],
            backdrop: Backdrop::new(width, height),
            out:      vec![0xFF000000; width * height],
            blend:    BlendMode::Normal,
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        *self = Raster::new(width, height);
    }

    pub fn size(&self)   -> (usize, usize) { (self.width, self.height) }
    pub fn pixels(&self) -> &[u32]         { &self.out }

    /// Run the frame's draw commands, then composite everything into the
    /// output buffer.
    pub fn render(&mut self, frame: &RenderFrame, atlas: &SpriteAtlas) {
        for cmd in &frame.commands {
            match *cmd {
                DrawCommand::Clear => {
                    self.layer.fill([0.0; 3]);
                    self.blend = BlendMode::Normal;
                }
                DrawCommand::SetBlend(mode) => self.blend = mode,
                DrawCommand::RadialGradient { center, radius, stops } => {
                    self.radial_gradient(center, radius, &stops);
                }
                DrawCommand::Sprite { key, x, y, size, alpha } => {
                    self.sprite(atlas, key, x, y, size, alpha);
                }
            }
        }

        self.composite(frame.background);
        if let OverlayUpdate::Shown { position, scale, mirrored, asset } = frame.overlay {
            self.draw_overlay(position, scale, mirrored, asset);
        }
        if let Some(preview) = &frame.preview {
            self.draw_preview(preview);
        }
    }

    // ── particle layer ───────────────────────────────────────────────────

    fn put(&mut self, x: i32, y: i32, c: Rgba, alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let a = (c.a * alpha).clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let dst = &mut self.layer[y as usize * self.width + x as usize];
        let src = [c.r, c.g, c.b];
        for i in 0..3 {
            dst[i] = match self.blend {
                BlendMode::Additive => dst[i] + src[i] * a,
                BlendMode::Normal   => dst[i] * (1.0 - a) + src[i] * a,
            };
        }
    }

    fn sprite(&mut self, atlas: &SpriteAtlas, key: SpriteKey, x: i32, y: i32, size: f32, alpha: f32) {
        let sprite = atlas.get(key);
        let n = (size.ceil() as i32).max(1);
        let step = sprite.size as f32 / size.max(1e-3);
        for dy in 0..n {
            let sy = (((dy as f32 + 0.5) * step) as usize).min(sprite.size - 1);
            for dx in 0..n {
                let sx = (((dx as f32 + 0.5) * step) as usize).min(sprite.size - 1);
                self.put(x + dx, y + dy, sprite.pixel(sx, sy), alpha);
            }
        }
    }

    fn radial_gradient(&mut self, center: Vec2, radius: f32, stops: &[GradientStop]) {
        if radius <= 0.0 {
            return;
        }
        let x0 = ((center.x - radius).floor().max(0.0)) as i32;
        let y0 = ((center.y - radius).floor().max(0.0)) as i32;
        let x1 = ((center.x + radius).ceil()).min(self.width as f32 - 1.0) as i32;
        let y1 = ((center.y + radius).ceil()).min(self.height as f32 - 1.0) as i32;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let t = p.distance(center) / radius;
                if t <= 1.0 {
                    self.put(x, y, sample_gradient(stops, t), 1.0);
                }
            }
        }
    }

    // ── output ───────────────────────────────────────────────────────────

    fn composite(&mut self, offset: BackgroundOffset) {
        let origin = self.backdrop.origin(self.width, self.height, offset);
        for y in 0..self.height {
            let row = y * self.width;
            for x in 0..self.width {
                let bg  = self.backdrop.sample(x, y, origin);
                let lit = self.layer[row + (self.width - 1 - x)];
                self.out[row + x] = pack([bg[0] + lit[0], bg[1] + lit[1], bg[2] + lit[2]]);
            }
        }
    }

    fn draw_overlay(&mut self, position: Vec2, scale: f32, mirrored: bool, asset: OverlayAsset) {
        let r    = OVERLAY_RADIUS * scale;
        let body = match asset {
            OverlayAsset::Resting  => OVERLAY_BODY,
            OverlayAsset::Inhaling => OVERLAY_INHALE,
        };
        self.fill_disc(position, r, body, 0.9);

        // Eyes look the way the character faces
        let facing = if mirrored { -1.0 } else { 1.0 };
        let eye_y  = position.y - r * 0.2;
        for side in [-1.0, 1.0] {
            let eye = Vec2::new(position.x + (side * 0.3 + facing * 0.1) * r, eye_y);
            self.fill_disc(eye, r * 0.1, OVERLAY_INK, 1.0);
        }

        let mouth = Vec2::new(position.x + facing * 0.1 * r, position.y + r * 0.35);
        match asset {
            OverlayAsset::Inhaling => self.fill_disc(mouth, r * 0.18, OVERLAY_INK, 1.0),
            OverlayAsset::Resting  => {
                let w = (r * 0.4) as isize;
                let h = (r * 0.06).max(1.0) as isize;
                self.fill_rect(mouth.x as isize - w / 2, mouth.y as isize, w, h, OVERLAY_INK);
            }
        }
    }

    fn draw_preview(&mut self, preview: &HandPreview) {
        let pw = PREVIEW_W as usize;
        let ph = PREVIEW_H as usize;
        if self.width < pw + PREVIEW_MARGIN || self.height < ph + PREVIEW_MARGIN {
            return;
        }
        let ox = PREVIEW_MARGIN as f32;
        let oy = (self.height - ph - PREVIEW_MARGIN) as f32;

        // Darken the panel
        for y in 0..ph {
            for x in 0..pw {
                let i = (oy as usize + y) * self.width + ox as usize + x;
                self.out[i] = blend(self.out[i], 0xFF000000, 0.6);
            }
        }

        // Mirrored to match the particle layer
        let place = |p: Vec2| Vec2::new(ox + PREVIEW_W - p.x, oy + p.y);
        for (a, b) in preview.segments() {
            self.draw_line(place(a), place(b), PREVIEW_BONE);
        }
        for &j in preview.joints.iter() {
            let p = place(j);
            self.draw_diamond(p.x as isize, p.y as isize, 2, PREVIEW_JOINT);
        }
    }

    // ── primitive drawing helpers ────────────────────────────────────────

    fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.out[y as usize * self.width + x as usize] = color;
        }
    }

    fn fill_rect(&mut self, x: isize, y: isize, w: isize, h: isize, color: u32) {
        for row in y..y + h {
            for col in x..x + w {
                self.set_pixel(col, row, color);
            }
        }
    }

    fn fill_disc(&mut self, center: Vec2, r: f32, color: u32, alpha: f32) {
        let ri = r.ceil() as isize;
        let (cx, cy) = (center.x as isize, center.y as isize);
        for dy in -ri..=ri {
            for dx in -ri..=ri {
                if ((dx * dx + dy * dy) as f32) > r * r {
                    continue;
                }
                let (x, y) = (cx + dx, cy + dy);
                if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
                    continue;
                }
                let i = y as usize * self.width + x as usize;
                self.out[i] = blend(self.out[i], color, alpha);
            }
        }
    }

    fn draw_line(&mut self, a: Vec2, b: Vec2, color: u32) {
        let steps = (b - a).abs().max_element().ceil().max(1.0) as usize;
        for s in 0..=steps {
            let p = a.lerp(b, s as f32 / steps as f32);
            self.set_pixel(p.x.round() as isize, p.y.round() as isize, color);
        }
    }

    fn draw_diamond(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        for dy in -r..=r {
            let span = r - dy.abs();
            for dx in -span..=span {
                self.set_pixel(cx + dx, cy + dy, color);
            }
        }
    }
}

/// Saturating linear RGB → opaque ARGB.
fn pack(c: [f32; 3]) -> u32 {
    let ch = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u32;
    0xFF000000 | (ch(c[0]) << 16) | (ch(c[1]) << 8) | ch(c[2])
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |shift: u32| {
        let ca = ((a >> shift) & 0xFF) as f32;
        let cb = ((b >> shift) & 0xFF) as f32;
        ((ca * (1.0 - t) + cb * t) as u32) << shift
    };
    0xFF000000 | mix(16) | mix(8) | mix(0)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use particle_field::compositor::FrameStats;

    const W: usize = 400;
    const H: usize = 300;

    fn frame(commands: Vec<DrawCommand>) -> RenderFrame {
        let mut f = RenderFrame::with_capacity(0);
        f.canvas   = Vec2::new(W as f32, H as f32);
        f.commands = commands;
        f.stats    = FrameStats::default();
        f
    }

    fn channel(px: u32, shift: u32) -> u32 {
        (px >> shift) & 0xFF
    }

    fn brightness(px: u32) -> u32 {
        channel(px, 16) + channel(px, 8) + channel(px, 0)
    }

    fn sprite(x: i32, y: i32) -> DrawCommand {
        DrawCommand::Sprite {
            key:   SpriteKey { color_class: 0, highlighted: true },
            x, y,
            size:  8.0,
            alpha: 1.0,
        }
    }

    #[test]
    fn layer_is_mirrored_on_present() {
        let atlas = SpriteAtlas::build();
        let mut r = Raster::new(W, H);
        let dark = {
            r.render(&frame(vec![DrawCommand::Clear]), &atlas);
            r.pixels()[150 * W + (W - 1 - 24)]
        };
        r.render(&frame(vec![
            DrawCommand::Clear,
            DrawCommand::SetBlend(BlendMode::Additive),
            sprite(20, 146),
        ]), &atlas);

        // Drawn near the left edge, shows near the right edge
        assert!(brightness(r.pixels()[150 * W + (W - 1 - 24)]) > brightness(dark));
    }

    #[test]
    fn additive_sprites_accumulate() {
        let atlas = SpriteAtlas::build();
        let mut r = Raster::new(W, H);
        let at = 150 * W + (W - 1 - 104);

        r.render(&frame(vec![DrawCommand::Clear, DrawCommand::SetBlend(BlendMode::Additive), sprite(100, 146)]), &atlas);
        let once = brightness(r.pixels()[at]);
        r.render(&frame(vec![
            DrawCommand::Clear,
            DrawCommand::SetBlend(BlendMode::Additive),
            sprite(100, 146),
            sprite(100, 146),
        ]), &atlas);
        let twice = brightness(r.pixels()[at]);
        assert!(twice > once);
    }

    #[test]
    fn clear_wipes_the_layer() {
        let atlas = SpriteAtlas::build();
        let mut r = Raster::new(W, H);
        r.render(&frame(vec![DrawCommand::Clear]), &atlas);
        let empty = r.pixels().to_vec();

        r.render(&frame(vec![DrawCommand::Clear, DrawCommand::SetBlend(BlendMode::Additive), sprite(50, 50)]), &atlas);
        r.render(&frame(vec![DrawCommand::Clear]), &atlas);
        assert_eq!(r.pixels(), &empty[..]);
    }

    #[test]
    fn gradient_is_brightest_at_center() {
        let atlas = SpriteAtlas::build();
        let mut r = Raster::new(W, H);
        let stops = [
            GradientStop::new(0.0, Rgba::from_rgb8(200, 255, 255, 0.4)),
            GradientStop::new(0.3, Rgba::from_rgb8(100, 255, 200, 0.15)),
            GradientStop::new(1.0, Rgba::TRANSPARENT),
        ];
        r.render(&frame(vec![
            DrawCommand::Clear,
            DrawCommand::SetBlend(BlendMode::Additive),
            DrawCommand::RadialGradient { center: Vec2::new(200.0, 150.0), radius: 100.0, stops },
        ]), &atlas);

        let center = brightness(r.pixels()[150 * W + (W - 1 - 200)]);
        let rim    = brightness(r.pixels()[150 * W + (W - 1 - 290)]);
        assert!(center > rim);
    }

    #[test]
    fn offscreen_sprites_are_clipped() {
        let atlas = SpriteAtlas::build();
        let mut r = Raster::new(W, H);
        r.render(&frame(vec![
            DrawCommand::Clear,
            DrawCommand::SetBlend(BlendMode::Additive),
            sprite(-20, -20),
            sprite(W as i32 + 5, H as i32 + 5),
        ]), &atlas);
        assert_eq!(r.pixels().len(), W * H);
    }

    #[test]
    fn backdrop_origin_follows_percent() {
        let b = Backdrop::new(W, H);
        assert_eq!(b.size(), (600, 450));
        assert_eq!(b.origin(W, H, BackgroundOffset { x_pct: 0.0, y_pct: 0.0 }), (0, 0));
        assert_eq!(b.origin(W, H, BackgroundOffset { x_pct: 50.0, y_pct: 50.0 }), (-100, -75));
        assert_eq!(b.origin(W, H, BackgroundOffset { x_pct: 100.0, y_pct: 100.0 }), (-200, -150));
    }

    #[test]
    fn backdrop_repeats() {
        let b = Backdrop::new(W, H);
        assert_eq!(b.sample(0, 0, (0, 0)), b.sample(0, 0, (600, 450)));
        assert_eq!(b.sample(10, 10, (20, 0)), b.sample(10, 10, (-580, 0)));
    }

    #[test]
    fn overlay_draws_at_its_position() {
        let atlas = SpriteAtlas::build();
        let mut r = Raster::new(W, H);
        let mut f = frame(vec![DrawCommand::Clear]);
        f.overlay = OverlayUpdate::Shown {
            position: Vec2::new(300.0, 100.0),
            scale:    1.0,
            mirrored: true,
            asset:    OverlayAsset::Resting,
        };
        r.render(&f, &atlas);
        // Cheek, clear of eyes and mouth
        let px = r.pixels()[100 * W + 275];
        assert!(channel(px, 0) > 200);
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0xFF102030, 0xFFFFFFFF, 0.0), 0xFF102030);
        assert_eq!(blend(0xFF102030, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
        assert_eq!(pack([2.0, -1.0, 0.5]), 0xFFFF0080);
    }
}
