//! Lookup tables for the fixed-point caster.
//!
//! Conventions shared by every table:
//! * angles: 256 units per quadrant, 1024 per circle;
//! * amplitudes (tan, cot, sin, cos): scaled by 256;
//! * distances: 1/256 tile, measured from [`MIN_DIST`];
//! * texture coordinates: 10 fractional bits over a 64-texel column.
//!
//! Everything is computed once, eagerly, when the first fixed caster is
//! built, and then only read.

use once_cell::sync::Lazy;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, TAU};
use tracing::debug;

use crate::engine::types::{ANGLE_UNITS, INV_FACTOR_INT, MIN_DIST, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Entries per distance or angle table.
pub const TABLE_LEN: usize = 256;

/// Near-table index at which lookups switch to the far table.
pub const FAR_BREAK: usize = TABLE_LEN;
/// Extra right shift from near to far index (near spacing 4, far 32).
pub const FAR_SHIFT: u32 = 3;

/// Texture step meaning "one texel per pixel" times 64 rows: 2^16.
const STEP_ONE: f64 = 65_536.0;

pub struct Tables {
    /// `256·tan(i·90°/256)`.
    pub tan: [u16; TABLE_LEN],
    /// `256/tan(i·90°/256)`; index 0 holds the `u16::MAX` sentinel.
    pub cotan: [u16; TABLE_LEN],
    /// `256·sin(i·90°/256)`.
    pub sin: [u8; TABLE_LEN],
    /// `256·cos(i·90°/256)`, saturated to 255 at index 0.
    pub cos: [u8; TABLE_LEN],
    /// Ray angle offset of each column, wrapped into `0..1024`.
    pub delta_angle: [u16; SCREEN_WIDTH],
    /// Half-heights for distances `MIN_DIST + 4·i`.
    pub near_height: [u8; TABLE_LEN],
    /// Half-heights for distances `MIN_DIST + 32·i`.
    pub far_height: [u8; TABLE_LEN],
    pub near_step: [u16; TABLE_LEN],
    pub far_step: [u16; TABLE_LEN],
    /// First texture row when the wall overflows the screen, by distance.
    pub overflow_offset: [u16; TABLE_LEN],
    pub overflow_step: [u16; TABLE_LEN],
}

static TABLES: Lazy<Tables> = Lazy::new(Tables::build);

/// Process-wide tables, built on first call.
#[inline]
pub fn tables() -> &'static Tables {
    &TABLES
}

impl Tables {
    fn build() -> Self {
        let t = Self {
            tan: build(|i| saturate_u16(256.0 * quadrant_angle(i).tan())),
            cotan: build(|i| {
                let t = quadrant_angle(i).tan();
                if t == 0.0 {
                    u16::MAX
                } else {
                    saturate_u16(256.0 / t)
                }
            }),
            sin: build(|i| saturate_u8(256.0 * quadrant_angle(i).sin())),
            cos: build(|i| saturate_u8(256.0 * quadrant_angle(i).cos())),
            delta_angle: build(column_offset),
            near_height: build(|i| height(i, 2)),
            far_height: build(|i| height(i, 5)),
            near_step: build(|i| step(i, 2)),
            far_step: build(|i| step(i, 5)),
            overflow_offset: build(|i| overflow(i).0),
            overflow_step: build(|i| overflow(i).1),
        };
        debug!(
            columns = SCREEN_WIDTH,
            entries = TABLE_LEN,
            cotan_sentinel = t.cotan[0],
            near_top = t.near_height[0],
            far_bottom = t.far_height[TABLE_LEN - 1],
            "built fixed-point lookup tables"
        );
        t
    }
}

fn build<T: Copy + Default, const N: usize>(f: impl Fn(usize) -> T) -> [T; N] {
    let mut table = [T::default(); N];
    for (i, slot) in table.iter_mut().enumerate() {
        *slot = f(i);
    }
    table
}

#[inline]
fn quadrant_angle(i: usize) -> f64 {
    i as f64 * FRAC_PI_2 / 256.0
}

// `as` saturates float → int casts, which is exactly the clamping we want.
#[inline]
fn saturate_u16(v: f64) -> u16 {
    v as u16
}

#[inline]
fn saturate_u8(v: f64) -> u8 {
    v as u8
}

/// Flat projection plane: the column's displacement from centre, mapped
/// through `atan` so equal pixel steps are equal plane steps.
fn column_offset(column: usize) -> u16 {
    let half = SCREEN_WIDTH as f64 / 2.0;
    let radians = ((column as f64 - half) / half * FRAC_PI_4).atan();
    let units = (radians / FRAC_PI_2 * 256.0) as i32;
    units.rem_euclid(ANGLE_UNITS as i32) as u16
}

/// Integer half-height for table entry `i`.
///
/// `shift` is 2 for the near table (spacing 4) and 5 for the far one
/// (spacing 32); the distance is pre-shifted so the quotient stays in range.
fn height(i: usize, shift: u32) -> u8 {
    let distance = ((i as u32) << shift) + MIN_DIST as u32;
    let scaled = (distance >> shift).max(1);
    u8::try_from((INV_FACTOR_INT / scaled) >> shift).unwrap_or(u8::MAX)
}

/// Texture step for table entry `i`: one texture height over the full wall.
fn step(i: usize, shift: u32) -> u16 {
    let spacing = f64::from(1u32 << shift);
    let distance = (i as f64 * spacing + f64::from(MIN_DIST)) / spacing;
    let wall = f64::from(INV_FACTOR_INT) / distance / spacing * 2.0;
    if wall == 0.0 {
        return u16::MAX;
    }
    saturate_u16(256.0 / wall * 256.0)
}

/// `(offset, step)` for a wall at distance `i` that is taller than the
/// screen: the first visible row skips the clipped top half of the excess.
fn overflow(i: usize) -> (u16, u16) {
    if i == 0 {
        // On the wall plane: the whole screen shows the texture's centre row.
        return ((STEP_ONE / 2.0) as u16, 0);
    }
    let wall = f64::from(INV_FACTOR_INT) / (i as f64 / 2.0);
    let step = STEP_ONE / wall;
    let clipped = (wall - SCREEN_HEIGHT as f64) / 2.0;
    (saturate_u16(clipped * step), saturate_u16(step))
}

/// Heading in radians → fixed angle units in `0..1024`.
pub fn radians_to_units(radians: f32) -> u16 {
    let units = (f64::from(radians) / TAU * f64::from(ANGLE_UNITS)) as i64;
    units.rem_euclid(i64::from(ANGLE_UNITS)) as u16
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trig_tables_hit_known_values() {
        let t = tables();
        assert_eq!(t.tan[0], 0);
        assert!((255..=256).contains(&t.tan[128]));
        assert_eq!(t.cotan[0], u16::MAX);
        assert!((255..=256).contains(&t.cotan[128]));
        assert_eq!(t.sin[0], 0);
        assert_eq!(t.cos[0], 255);
        assert_eq!(t.sin[128], 181);
        assert_eq!(t.cos[128], 181);
        // tan and cot mirror each other around 45°
        for i in 3..=253 {
            let diff = i32::from(t.tan[i]) - i32::from(t.cotan[256 - i]);
            assert!(diff.abs() <= 1, "tan[{i}] vs cotan[{}]", 256 - i);
        }
    }

    #[test]
    fn column_offsets_are_flat_plane_symmetric() {
        let t = tables();
        assert_eq!(t.delta_angle[SCREEN_WIDTH / 2], 0);
        // Left half wraps below 1024, right half is positive.
        assert!(t.delta_angle[0] > 512);
        assert!(t.delta_angle[SCREEN_WIDTH - 1] < 256);
        let left = ANGLE_UNITS - t.delta_angle[1];
        let right = t.delta_angle[SCREEN_WIDTH - 1];
        assert!(left.abs_diff(right) <= 1);
        // Flat plane: offsets grow more slowly towards the edges.
        let centre = t.delta_angle[SCREEN_WIDTH / 2 + 40];
        let edge = t.delta_angle[SCREEN_WIDTH - 1] - t.delta_angle[SCREEN_WIDTH - 41];
        assert!(edge < centre);
    }

    #[test]
    fn heights_fall_with_distance() {
        let t = tables();
        assert_eq!(t.near_height[0], 130);
        assert!(t.near_height.windows(2).all(|w| w[0] >= w[1]));
        assert!(t.far_height.windows(2).all(|w| w[0] >= w[1]));
        assert!(t.near_step.windows(2).all(|w| w[0] <= w[1]));
        assert!(t.far_step.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn near_and_far_tables_meet_at_break() {
        let t = tables();
        let near = t.near_height[FAR_BREAK - 1];
        let far = t.far_height[FAR_BREAK >> FAR_SHIFT];
        assert!(near.abs_diff(far) <= 1, "near {near} vs far {far}");
    }

    #[test]
    fn overflow_tables_shrink_as_wall_recedes() {
        let t = tables();
        let last = MIN_DIST as usize - 1;
        assert!(t.overflow_offset[1] < 32_768);
        assert!(t.overflow_offset[last] < 1_024);
        for i in 1..last {
            assert!(t.overflow_offset[i] >= t.overflow_offset[i + 1]);
            assert!(t.overflow_step[i] <= t.overflow_step[i + 1]);
        }
        // Past MIN_DIST the wall fits on screen and nothing is clipped.
        assert_eq!(t.overflow_offset[200], 0);
    }

    #[test]
    fn radians_wrap_into_units() {
        use std::f32::consts::{FRAC_PI_2, TAU};
        assert_eq!(radians_to_units(0.0), 0);
        assert_eq!(radians_to_units(FRAC_PI_2), 256);
        assert_eq!(radians_to_units(TAU), 0);
        assert_eq!(radians_to_units(-TAU), 0);
        assert_eq!(radians_to_units(-FRAC_PI_2), 768);
    }
}
