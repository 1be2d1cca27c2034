//! Fixed-point caster.
//!
//! Positions are 8.8 (tile in the high byte, sub-tile offset in the low
//! byte), angles are 1024 units per circle, and all trigonometry and
//! perspective division goes through [`Tables`].

use std::sync::Arc;

use crate::engine::fixmath::{invert, mul_s, mul_u};
use crate::engine::tables::{FAR_BREAK, FAR_SHIFT, TABLE_LEN, Tables, radians_to_units, tables};
use crate::engine::types::{
    ANGLE_UNITS, HORIZON_HEIGHT, MIN_DIST, QUADRANT_UNITS, RayCaster, TraceResult, Variant,
    column_index,
};
use crate::world::{Pose, TileMap};

/// Sub-tile units per tile.
const TILE: i32 = 256;

/// Pose in engine units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedPose {
    pub x: u16,
    pub y: u16,
    /// `0..1024`, 0 = north, 256 = east.
    pub heading: u16,
}

impl FixedPose {
    pub fn new(x: u16, y: u16, heading: u16) -> Self {
        Self {
            x,
            y,
            heading: heading % ANGLE_UNITS,
        }
    }

    /// Tile coordinates scale by 256 (saturating), radians map onto the
    /// 1024-unit circle.
    pub fn from_pose(pose: &Pose) -> Self {
        Self::new(
            to_sub_tile(pose.pos.x),
            to_sub_tile(pose.pos.y),
            radians_to_units(pose.heading),
        )
    }

    #[inline]
    fn quadrant(self) -> u8 {
        (self.heading >> 8) as u8
    }

    #[inline]
    fn angle(self) -> u8 {
        self.heading as u8
    }
}

#[inline]
fn to_sub_tile(v: f32) -> u16 {
    // float → int `as` saturates, so negative input lands on 0
    (v * TILE as f32) as u16
}

/// Where a ray met a wall, relative to the viewer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hit {
    pub dx: i16,
    pub dy: i16,
    pub texture_no: u8,
    pub texture_x: u8,
    /// Tiles entered before the wall was found, the wall included.
    pub steps: u32,
}

/// Grid line the walk is trying to cross next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Crossing {
    /// A line of constant x; a wall found here is an east/west face.
    Vertical,
    /// A line of constant y; a wall found here is a north/south face.
    Horizontal,
}

impl Crossing {
    #[inline]
    fn flip(self) -> Self {
        match self {
            Crossing::Vertical => Crossing::Horizontal,
            Crossing::Horizontal => Crossing::Vertical,
        }
    }
}

/// Grid-walk state for one ray.
///
/// `ix` holds the x where the ray crosses the next horizontal line and `iy`
/// the y where it crosses the next vertical line. On the positive side both
/// are kept one tile low so a plain `>> 8` compares against the current
/// tile.
#[derive(Debug)]
struct Walk {
    tile_x: i32,
    tile_y: i32,
    ix: i32,
    iy: i32,
    sx: i32,
    sy: i32,
    step_x: i32,
    step_y: i32,
    steps: u32,
}

impl Walk {
    fn at(pose: FixedPose) -> Self {
        let (x, y) = (i32::from(pose.x), i32::from(pose.y));
        Self {
            tile_x: x >> 8,
            tile_y: y >> 8,
            ix: x,
            iy: y,
            sx: 0,
            sy: 0,
            step_x: 0,
            step_y: 0,
            steps: 0,
        }
    }

    /// Ray exactly along a compass direction.
    fn axis(pose: FixedPose, quadrant: u8) -> Self {
        let mut walk = Self::at(pose);
        match quadrant {
            0 => {
                walk.sy = 1;
                walk.iy -= TILE;
            }
            1 => {
                walk.sx = 1;
                walk.ix -= TILE;
            }
            2 => walk.sy = -1,
            _ => walk.sx = -1,
        }
        walk
    }

    fn slanted(pose: FixedPose, quadrant: u8, angle: u8, t: &Tables) -> Self {
        let mut walk = Self::at(pose);
        let off_x = pose.x as u8;
        let off_y = pose.y as u8;

        if quadrant < 2 {
            walk.sx = 1;
            walk.iy += mul_tan(off_x, true, quadrant, angle, &t.cotan);
            walk.ix -= TILE;
            walk.step_x = abs_tan(quadrant, angle, &t.tan);
        } else {
            walk.sx = -1;
            walk.iy -= mul_tan(off_x, false, quadrant, angle, &t.cotan);
            walk.step_x = -abs_tan(quadrant, angle, &t.tan);
        }

        if quadrant == 0 || quadrant == 3 {
            walk.sy = 1;
            walk.ix += mul_tan(off_y, true, quadrant, angle, &t.tan);
            walk.iy -= TILE;
            walk.step_y = abs_tan(quadrant, angle, &t.cotan);
        } else {
            walk.sy = -1;
            walk.ix -= mul_tan(off_y, false, quadrant, angle, &t.tan);
            walk.step_y = -abs_tan(quadrant, angle, &t.cotan);
        }
        walk
    }

    fn run_axis(&mut self, map: &TileMap) -> Crossing {
        loop {
            self.tile_x += self.sx;
            self.tile_y += self.sy;
            self.steps += 1;
            if map.is_wall(self.tile_x, self.tile_y) {
                return if self.sx == 0 {
                    Crossing::Horizontal
                } else {
                    Crossing::Vertical
                };
            }
        }
    }

    /// Alternate between crossing vertical and horizontal lines, each phase
    /// stepping for as long as its intercept is still inside the current
    /// row or column.
    ///
    /// At an exact grid corner rounding can leave neither phase ready; after
    /// both have passed once in a row the current one steps anyway.
    fn run(&mut self, map: &TileMap) -> Crossing {
        let mut seek = Crossing::Vertical;
        let mut idle = 0;
        loop {
            let ready = match seek {
                Crossing::Vertical => before_edge(self.sy, self.iy, self.tile_y),
                Crossing::Horizontal => before_edge(self.sx, self.ix, self.tile_x),
            };
            if !ready && idle < 2 {
                idle += 1;
                seek = seek.flip();
                continue;
            }
            idle = 0;
            self.steps += 1;
            match seek {
                Crossing::Vertical => {
                    self.tile_x += self.sx;
                    if map.is_wall(self.tile_x, self.tile_y) {
                        return Crossing::Vertical;
                    }
                    self.iy += self.step_y;
                }
                Crossing::Horizontal => {
                    self.tile_y += self.sy;
                    if map.is_wall(self.tile_x, self.tile_y) {
                        return Crossing::Horizontal;
                    }
                    self.ix += self.step_x;
                }
            }
        }
    }

    fn hit(&self, pose: FixedPose, crossing: Crossing) -> Hit {
        let (hit_x, hit_y, texture_no, texture_x) = match crossing {
            Crossing::Horizontal => (
                self.ix + if self.sx == 1 { TILE } else { 0 },
                (self.tile_y << 8) + if self.sy == -1 { TILE } else { 0 },
                0,
                self.ix as u8,
            ),
            Crossing::Vertical => (
                (self.tile_x << 8) + if self.sx == -1 { TILE } else { 0 },
                self.iy + if self.sy == 1 { TILE } else { 0 },
                1,
                self.iy as u8,
            ),
        };
        Hit {
            dx: clamp_i16(hit_x - i32::from(pose.x)),
            dy: clamp_i16(hit_y - i32::from(pose.y)),
            texture_no,
            texture_x,
            steps: self.steps,
        }
    }
}

/// True while the intercept along the stepping axis has not yet left
/// `tile` in direction `step`.
#[inline]
fn before_edge(step: i32, intercept: i32, tile: i32) -> bool {
    if step == 1 {
        intercept >> 8 < tile
    } else {
        intercept >> 8 >= tile
    }
}

/// Table entry for `angle`, mirrored in odd quadrants.
#[inline]
fn slope(quadrant: u8, angle: u8, table: &[u16; TABLE_LEN]) -> u16 {
    let index = if quadrant & 1 == 1 { invert(angle) } else { angle };
    table[usize::from(index)]
}

#[inline]
fn abs_tan(quadrant: u8, angle: u8, table: &[u16; TABLE_LEN]) -> i32 {
    i32::from(slope(quadrant, angle, table))
}

/// Offset along one axis scaled by the slope to the other axis. With
/// `inverse` the offset is measured to the far tile edge instead, and an
/// offset of zero means a whole tile. Odd quadrants flip the sign.
fn mul_tan(value: u8, inverse: bool, quadrant: u8, angle: u8, table: &[u16; TABLE_LEN]) -> i32 {
    let slope = slope(quadrant, angle, table);
    let scaled = if inverse && value == 0 {
        i32::from(slope)
    } else {
        let value = if inverse { invert(value) } else { value };
        i32::from(mul_u(value, slope))
    };
    if quadrant & 1 == 1 { -scaled } else { scaled }
}

#[inline]
fn clamp_i16(v: i32) -> i16 {
    v.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

pub struct FixedCaster {
    map: Arc<TileMap>,
    tables: &'static Tables,
    pose: FixedPose,
}

impl FixedCaster {
    /// Builds the lookup tables on first use.
    pub fn new(map: Arc<TileMap>) -> Self {
        Self {
            map,
            tables: tables(),
            pose: FixedPose::default(),
        }
    }

    /// Like [`RayCaster::start`], for a pose already in engine units.
    pub fn start_fixed(&mut self, pose: FixedPose) {
        self.pose = FixedPose::new(pose.x, pose.y, pose.heading);
    }

    pub fn pose(&self) -> FixedPose {
        self.pose
    }

    /// View heading plus the column's offset, nudged off angles one or two
    /// units away from a quadrant boundary and wrapped into `0..1024`.
    pub fn ray_angle(&self, column: u16) -> u16 {
        let mut ray = self.pose.heading + self.tables.delta_angle[column_index(column)];
        match ray % QUADRANT_UNITS {
            1 | 254 => ray -= 1,
            2 | 255 => ray += 1,
            _ => {}
        }
        ray % ANGLE_UNITS
    }

    /// Walk the grid from the current position along `ray` until a wall.
    pub fn cast(&self, ray: u16) -> Hit {
        let ray = ray % ANGLE_UNITS;
        let quadrant = (ray >> 8) as u8;
        let angle = ray as u8;

        let (walk, crossing) = if angle == 0 {
            let mut walk = Walk::axis(self.pose, quadrant);
            let crossing = walk.run_axis(&self.map);
            (walk, crossing)
        } else {
            let mut walk = Walk::slanted(self.pose, quadrant, angle, self.tables);
            let crossing = walk.run(&self.map);
            (walk, crossing)
        };
        debug_assert!(
            walk.steps as usize <= self.map.width() + self.map.height() + 2,
            "ray {ray} took {} steps",
            walk.steps
        );
        walk.hit(self.pose, crossing)
    }

    /// Displacement projected onto the view direction:
    /// `dy·cos(heading) + dx·sin(heading)`.
    pub fn perpendicular(&self, dx: i16, dy: i16) -> i16 {
        let quadrant = self.pose.quadrant();
        let angle = self.pose.angle();
        let (dx32, dy32) = (i32::from(dx), i32::from(dy));

        let distance = if angle == 0 {
            match quadrant {
                0 => dy32,
                1 => dx32,
                2 => -dy32,
                _ => -dx32,
            }
        } else {
            let index = usize::from(if quadrant & 1 == 1 { invert(angle) } else { angle });
            let ay = i32::from(mul_s(self.tables.cos[index], dy));
            let ax = i32::from(mul_s(self.tables.sin[index], dx));
            match quadrant {
                0 => ay + ax,
                1 => ax - ay,
                2 => -ay - ax,
                _ => ay - ax,
            }
        };
        clamp_i16(distance)
    }

    /// Half-height and texture mapping for a perpendicular distance.
    pub fn project(&self, distance: i16) -> TraceResult {
        let t = self.tables;
        let distance = i32::from(distance);

        if distance >= MIN_DIST {
            let index = ((distance - MIN_DIST) >> 2) as usize;
            let (screen_y, texture_step) = if index < FAR_BREAK {
                (t.near_height[index], t.near_step[index])
            } else {
                let far = (index >> FAR_SHIFT).min(TABLE_LEN - 1);
                (t.far_height[far], t.far_step[far])
            };
            TraceResult {
                screen_y,
                texture_y: 0,
                texture_step,
                ..TraceResult::default()
            }
        } else {
            let index = distance.clamp(0, MIN_DIST - 1) as usize;
            TraceResult {
                screen_y: HORIZON_HEIGHT as u8,
                texture_y: t.overflow_offset[index],
                texture_step: t.overflow_step[index],
                ..TraceResult::default()
            }
        }
    }
}

impl RayCaster for FixedCaster {
    fn start(&mut self, pose: &Pose) {
        self.start_fixed(FixedPose::from_pose(pose));
    }

    fn trace(&self, column: u16) -> TraceResult {
        let hit = self.cast(self.ray_angle(column));
        TraceResult {
            texture_no: hit.texture_no,
            texture_x: hit.texture_x,
            ..self.project(self.perpendicular(hit.dx, hit.dy))
        }
    }

    fn variant(&self) -> Variant {
        Variant::Fixed
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::SCREEN_WIDTH;
    use std::f32::consts::{FRAC_PI_2, TAU};

    const CENTRE: u16 = (SCREEN_WIDTH / 2) as u16;

    fn room() -> Arc<TileMap> {
        Arc::new(TileMap::walled(16, 16).unwrap())
    }

    fn caster_at(map: Arc<TileMap>, x: u16, y: u16, heading: u16) -> FixedCaster {
        let mut caster = FixedCaster::new(map);
        caster.start_fixed(FixedPose::new(x, y, heading));
        caster
    }

    #[test]
    fn from_pose_scales_and_wraps() {
        let pose = FixedPose::from_pose(&Pose::new(8.5, 2.25, FRAC_PI_2));
        assert_eq!(pose, FixedPose::new(2176, 576, 256));
        assert_eq!(FixedPose::from_pose(&Pose::new(-1.0, 1.0, TAU)).x, 0);
        assert_eq!(FixedPose::new(0, 0, 1024 + 5).heading, 5);
    }

    #[test]
    fn axis_rays_hit_expected_faces() {
        let mut map = TileMap::walled(16, 16).unwrap();
        map.set_wall(6, 8, true).unwrap();
        let caster = caster_at(Arc::new(map), 2176, 2176, 0);

        let north = caster.cast(0);
        assert_eq!((north.dx, north.dy), (0, 1664));
        assert_eq!((north.texture_no, north.texture_x), (0, 128));

        let east = caster.cast(256);
        assert_eq!((east.dx, east.dy), (1664, 0));
        assert_eq!((east.texture_no, east.texture_x), (1, 128));

        let south = caster.cast(512);
        assert_eq!((south.dx, south.dy), (0, -1920));
        assert_eq!(south.texture_no, 0);

        let west = caster.cast(768);
        assert_eq!((west.dx, west.dy), (-384, 0));
        assert_eq!(west.texture_no, 1);
        assert_eq!(west.steps, 2);
    }

    #[test]
    fn diagonal_into_corner_terminates() {
        let caster = caster_at(room(), 2176, 2176, 0);
        let hit = caster.cast(128);
        assert!(hit.dx > 1400 && hit.dx <= 1664, "dx {}", hit.dx);
        assert!(hit.dy > 1400 && hit.dy <= 1664, "dy {}", hit.dy);
    }

    #[test]
    fn looking_east_from_mid_room() {
        let mut caster = FixedCaster::new(room());
        caster.start(&Pose::new(8.0, 8.5, FRAC_PI_2));
        assert_eq!(caster.ray_angle(CENTRE), 256);

        let hit = caster.cast(256);
        assert_eq!(hit.dx, 1792);
        assert_eq!(caster.perpendicular(hit.dx, hit.dy), 1792);

        let res = caster.trace(CENTRE);
        assert_eq!(res.screen_y, 13);
        assert_eq!(res.texture_no, 1);
        assert_eq!(res.texture_y, 0);
    }

    #[test]
    fn close_wall_overflows_screen() {
        let caster = caster_at(room(), 2176, 3740, 0);
        let res = caster.trace(CENTRE);
        let t = tables();
        assert_eq!(res.screen_y, HORIZON_HEIGHT as u8);
        assert_eq!(res.texture_y, t.overflow_offset[100]);
        assert_eq!(res.texture_step, t.overflow_step[100]);
        assert!(res.texture_y > 0);
    }

    #[test]
    fn heading_wraps_at_full_circle() {
        let mut a = FixedCaster::new(room());
        let mut b = FixedCaster::new(room());
        a.start(&Pose::new(5.3, 7.7, 0.0));
        b.start(&Pose::new(5.3, 7.7, TAU));
        for column in 0..SCREEN_WIDTH as u16 {
            assert_eq!(a.trace(column), b.trace(column), "column {column}");
        }
    }

    #[test]
    fn near_axis_rays_snap() {
        let caster = caster_at(room(), 2176, 2176, 1);
        assert_eq!(caster.ray_angle(CENTRE), 0);
        let caster = caster_at(room(), 2176, 2176, 255);
        assert_eq!(caster.ray_angle(CENTRE), 256);
        let caster = caster_at(room(), 2176, 2176, 1023);
        assert_eq!(caster.ray_angle(CENTRE), 0);
    }

    #[test]
    fn every_ray_terminates_in_empty_map() {
        let map = Arc::new(TileMap::empty(8, 8).unwrap());
        for &(x, y) in &[(1000, 1000), (1024, 1024), (0, 0), (2047, 2047), (300, 1900)] {
            let caster = caster_at(map.clone(), x, y, 0);
            for ray in 0..ANGLE_UNITS {
                let hit = caster.cast(ray);
                assert!(hit.steps as usize <= 8 + 8 + 2, "ray {ray} from ({x}, {y})");
                let (hx, hy) = (i32::from(x) + i32::from(hit.dx), i32::from(y) + i32::from(hit.dy));
                let inside = (256..=7 * 256).contains(&hx) && (256..=7 * 256).contains(&hy);
                assert!(!inside, "ray {ray} from ({x}, {y}) stopped at ({hx}, {hy})");
            }
        }
    }

    #[test]
    fn distance_tables_pick_near_far_and_clamp() {
        let caster = caster_at(room(), 2176, 2176, 0);
        let t = tables();
        assert_eq!(caster.project(MIN_DIST as i16).screen_y, t.near_height[0]);
        assert_eq!(caster.project(MIN_DIST as i16 + 4 * 300).screen_y, t.far_height[300 >> 3]);
        assert_eq!(caster.project(i16::MAX).screen_y, t.far_height[TABLE_LEN - 1]);
        assert_eq!(caster.project(-40).texture_y, t.overflow_offset[0]);
    }
}
