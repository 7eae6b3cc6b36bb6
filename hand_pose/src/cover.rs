//! Video → screen "cover" mapping.
//!
//! The video is scaled so it covers the whole viewport along one axis and is
//! centered along the other.  Normalized landmark coordinates go through
//! this mapping to land in screen pixels.

use glam::Vec2;

/// Scale + offset from video pixels to screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverTransform {
    pub scale:    f32,
    pub offset:   Vec2,
    /// Source video size in pixels; zero until the first frame is known.
    pub video:    Vec2,
}

impl Default for CoverTransform {
    fn default() -> Self {
        CoverTransform { scale: 1.0, offset: Vec2::ZERO, video: Vec2::ZERO }
    }
}

impl CoverTransform {
    /// Compute the mapping for a `video_w × video_h` source on a
    /// `screen_w × screen_h` viewport.
    pub fn compute(video_w: f32, video_h: f32, screen_w: f32, screen_h: f32) -> Self {
        if video_w <= 0.0 || video_h <= 0.0 || screen_h <= 0.0 {
            return CoverTransform::default();
        }
        let video_aspect  = video_w / video_h;
        let screen_aspect = screen_w / screen_h;

        let (scale, offset) = if screen_aspect > video_aspect {
            let s = screen_w / video_w;
            (s, Vec2::new(0.0, (screen_h - video_h * s) / 2.0))
        } else {
            let s = screen_h / video_h;
            (s, Vec2::new((screen_w - video_w * s) / 2.0, 0.0))
        };
        CoverTransform { scale, offset, video: Vec2::new(video_w, video_h) }
    }

    /// Normalized video coordinates → screen pixels.
    pub fn to_screen(&self, normalized: Vec2) -> Vec2 {
        normalized * self.video * self.scale + self.offset
    }

    /// Screen pixels → normalized video coordinates.  Returns `None` while
    /// the video size is unknown.
    pub fn to_normalized(&self, screen: Vec2) -> Option<Vec2> {
        if self.video.x <= 0.0 || self.video.y <= 0.0 || self.scale <= 0.0 {
            return None;
        }
        Some((screen - self.offset) / self.scale / self.video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn wide_screen_scales_by_width() {
        // 16:9 video on a 2:1 screen → width fits, vertical overflow centered
        let t = CoverTransform::compute(1280.0, 720.0, 2000.0, 1000.0);
        assert!((t.scale - 2000.0 / 1280.0).abs() < 1e-6);
        assert_eq!(t.offset.x, 0.0);
        assert!((t.offset.y - (1000.0 - 720.0 * t.scale) / 2.0).abs() < 1e-3);
        assert!(t.offset.y < 0.0);
    }

    #[test]
    fn tall_screen_scales_by_height() {
        let t = CoverTransform::compute(1280.0, 720.0, 800.0, 1000.0);
        assert!((t.scale - 1000.0 / 720.0).abs() < 1e-6);
        assert_eq!(t.offset.y, 0.0);
        assert!(t.offset.x < 0.0);
    }

    #[test]
    fn center_maps_to_center() {
        let t = CoverTransform::compute(1280.0, 720.0, 1024.0, 768.0);
        assert!(close(t.to_screen(Vec2::splat(0.5)), Vec2::new(512.0, 384.0)));
    }

    #[test]
    fn unknown_video_is_identity_scale() {
        let t = CoverTransform::compute(0.0, 0.0, 1024.0, 768.0);
        assert_eq!(t, CoverTransform::default());
        assert_eq!(t.to_normalized(Vec2::ONE), None);
    }

    #[test]
    fn inverse_mapping_returns_to_start() {
        let t = CoverTransform::compute(1280.0, 720.0, 1440.0, 900.0);
        let p = Vec2::new(0.27, 0.81);
        let back = t.to_normalized(t.to_screen(p)).unwrap();
        assert!(close(back, p));
    }
}
