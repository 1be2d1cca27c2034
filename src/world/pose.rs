use glam::{Vec2, vec2};
use std::f32::consts::TAU;

/// Player view-point on the tile grid.
///
/// * `pos` is in tile units; tile `(x, y)` spans `[x, x + 1) × [y, y + 1)`.
/// * `heading` is in radians, 0 = north (+Y), π/2 = east (+X), growing
///   clockwise when north is drawn up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub pos: Vec2,
    pub heading: f32,
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(2.5, 2.5, std::f32::consts::FRAC_PI_4)
    }
}

impl Pose {
    pub fn new(x: f32, y: f32, heading: f32) -> Self {
        Self {
            pos: vec2(x, y),
            heading,
        }
    }

    /// Unit vector pointing where the player looks.
    #[inline]
    pub fn forward(self) -> Vec2 {
        let (s, c) = self.heading.sin_cos();
        Vec2::new(s, c)
    }

    /// Tile the player stands in.
    #[inline]
    pub fn tile(self) -> (i32, i32) {
        (self.pos.x.floor() as i32, self.pos.y.floor() as i32)
    }

    /// Rotate clockwise by `delta` radians, keeping the heading in `[0, 2π)`.
    pub fn turn(&mut self, delta: f32) {
        self.heading = (self.heading + delta).rem_euclid(TAU);
    }
}
