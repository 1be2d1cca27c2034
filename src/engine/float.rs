//! Floating-point caster: real positions, `f32` trigonometry, direct
//! division. The reference the fixed caster is measured against.

use std::f32::consts::{FRAC_PI_4, TAU};
use std::sync::Arc;

use glam::{Vec2, vec2};

use crate::engine::types::{
    HORIZON_HEIGHT, INV_FACTOR, RayCaster, SCREEN_HEIGHT, SCREEN_WIDTH, TraceResult, Variant,
    column_index,
};
use crate::world::{Pose, TileMap};

/// Direction components smaller than this are treated as exactly zero, so
/// rays along an axis never step sideways.
const AXIS_EPSILON: f32 = 1e-6;

/// Closest distance the projection divides by (one sub-tile unit).
const MIN_DISTANCE: f32 = 1.0 / 256.0;

/// Texture step for one texture height spread over one pixel.
const STEP_ONE: f32 = 65_536.0;

/// Which grid line a ray crossed into the wall tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Constant-x line: east/west face.
    Vertical,
    /// Constant-y line: north/south face.
    Horizontal,
}

/// Wall intersection in map space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloatHit {
    pub point: Vec2,
    pub side: Side,
    pub steps: u32,
}

pub struct FloatCaster {
    map: Arc<TileMap>,
    pos: Vec2,
    heading: f32,
    forward: Vec2,
    column_angle: [f32; SCREEN_WIDTH],
}

impl FloatCaster {
    pub fn new(map: Arc<TileMap>) -> Self {
        let mut column_angle = [0.0; SCREEN_WIDTH];
        let half = SCREEN_WIDTH as f32 / 2.0;
        for (column, angle) in column_angle.iter_mut().enumerate() {
            *angle = ((column as f32 - half) / half * FRAC_PI_4).atan();
        }
        Self {
            map,
            pos: Vec2::ZERO,
            heading: 0.0,
            forward: vec2(0.0, 1.0),
            column_angle,
        }
    }

    /// Ray heading for `column`, in radians.
    #[inline]
    pub fn ray_angle(&self, column: u16) -> f32 {
        self.heading + self.column_angle[column_index(column)]
    }

    /// Side-distance DDA from the current position along `angle`.
    pub fn cast(&self, angle: f32) -> FloatHit {
        let (s, c) = angle.sin_cos();
        let dir = vec2(snap(s), snap(c));

        let mut tile_x = self.pos.x.floor() as i32;
        let mut tile_y = self.pos.y.floor() as i32;
        let (step_x, mut side_x, delta_x) = axis_setup(self.pos.x, tile_x, dir.x);
        let (step_y, mut side_y, delta_y) = axis_setup(self.pos.y, tile_y, dir.y);

        let mut steps = 0;
        let side = loop {
            steps += 1;
            if side_x < side_y {
                side_x += delta_x;
                tile_x += step_x;
                if self.map.is_wall(tile_x, tile_y) {
                    break Side::Vertical;
                }
            } else {
                side_y += delta_y;
                tile_y += step_y;
                if self.map.is_wall(tile_x, tile_y) {
                    break Side::Horizontal;
                }
            }
        };

        // Pin the crossed coordinate to the grid line and solve for the other.
        let point = match side {
            Side::Vertical => {
                let x = (tile_x + i32::from(step_x < 0)) as f32;
                vec2(x, self.pos.y + (x - self.pos.x) * dir.y / dir.x)
            }
            Side::Horizontal => {
                let y = (tile_y + i32::from(step_y < 0)) as f32;
                vec2(self.pos.x + (y - self.pos.y) * dir.x / dir.y, y)
            }
        };
        FloatHit { point, side, steps }
    }

    /// Displacement projected onto the view direction.
    #[inline]
    pub fn perpendicular(&self, point: Vec2) -> f32 {
        (point - self.pos).dot(self.forward)
    }

    /// Half-height and texture mapping for a perpendicular distance in tiles.
    pub fn project(distance: f32) -> TraceResult {
        let distance = distance.max(MIN_DISTANCE);
        let half = INV_FACTOR / distance;
        let wall = 2.0 * half;
        let texture_step = (STEP_ONE / wall) as u16;
        let screen = SCREEN_HEIGHT as f32;

        if wall > screen {
            let clipped = (wall - screen) / 2.0;
            TraceResult {
                screen_y: HORIZON_HEIGHT as u8,
                texture_y: (clipped * STEP_ONE / wall) as u16,
                texture_step,
                ..TraceResult::default()
            }
        } else {
            TraceResult {
                screen_y: half as u8,
                texture_y: 0,
                texture_step,
                ..TraceResult::default()
            }
        }
    }
}

/// `(tile step, distance to first line, distance between lines)` along one
/// axis, all in units of ray length.
fn axis_setup(pos: f32, tile: i32, dir: f32) -> (i32, f32, f32) {
    if dir == 0.0 {
        return (0, f32::INFINITY, f32::INFINITY);
    }
    let delta = dir.recip().abs();
    if dir < 0.0 {
        (-1, (pos - tile as f32) * delta, delta)
    } else {
        (1, (tile as f32 + 1.0 - pos) * delta, delta)
    }
}

#[inline]
fn snap(v: f32) -> f32 {
    if v.abs() < AXIS_EPSILON { 0.0 } else { v }
}

/// Offset along the wall face in 1/256 tile.
#[inline]
fn face_offset(v: f32) -> u8 {
    (v.rem_euclid(1.0) * 256.0) as u8
}

impl RayCaster for FloatCaster {
    fn start(&mut self, pose: &Pose) {
        self.pos = pose.pos;
        self.heading = pose.heading.rem_euclid(TAU);
        let (s, c) = self.heading.sin_cos();
        self.forward = vec2(s, c);
    }

    fn trace(&self, column: u16) -> TraceResult {
        let hit = self.cast(self.ray_angle(column));
        let (texture_no, along) = match hit.side {
            Side::Horizontal => (0, hit.point.x),
            Side::Vertical => (1, hit.point.y),
        };
        TraceResult {
            texture_no,
            texture_x: face_offset(along),
            ..Self::project(self.perpendicular(hit.point))
        }
    }

    fn variant(&self) -> Variant {
        Variant::Float
    }
}
