//! Horizontal follow camera

use glam::Vec2;

use crate::consts::{DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH, FALL_MARGIN};

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// World x at the left edge of the screen
    pub offset_x: f32,
    /// Viewport size in CSS pixels
    pub viewport: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            viewport: Vec2::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT),
        }
    }
}

impl Camera {
    /// Center on `target_x`, never showing past either end of the level.
    /// A viewport wider than the level pins to the left edge.
    pub fn follow(&mut self, target_x: f32, level_width: f32) {
        let centered = target_x - self.viewport.x / 2.0;
        self.offset_x = centered.min(level_width - self.viewport.x).max(0.0);
    }

    /// Y beyond which anything has fallen out of the world
    #[inline]
    pub fn fall_limit(&self) -> f32 {
        self.viewport.y + FALL_MARGIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_follow_centers_player() {
        let mut cam = Camera::default();
        cam.viewport = Vec2::new(800.0, 600.0);
        cam.follow(900.0, 1600.0);
        assert_eq!(cam.offset_x, 500.0);
    }

    #[test]
    fn test_follow_clamps_both_ends() {
        let mut cam = Camera::default();
        cam.viewport = Vec2::new(800.0, 600.0);
        cam.follow(100.0, 1600.0);
        assert_eq!(cam.offset_x, 0.0);
        cam.follow(1590.0, 1600.0);
        assert_eq!(cam.offset_x, 800.0);
    }

    #[test]
    fn test_wide_viewport_pins_left() {
        let mut cam = Camera::default();
        cam.viewport = Vec2::new(2400.0, 900.0);
        cam.follow(1500.0, 1600.0);
        assert_eq!(cam.offset_x, 0.0);
        assert_eq!(cam.fall_limit(), 1100.0);
    }

    proptest! {
        #[test]
        fn offset_stays_in_level(target in -500.0f32..2500.0, width in 200.0f32..3000.0) {
            let mut cam = Camera::default();
            cam.viewport.x = width;
            cam.follow(target, 1600.0);
            prop_assert!(cam.offset_x >= 0.0);
            prop_assert!(cam.offset_x <= (1600.0 - width).max(0.0));
        }
    }
}
