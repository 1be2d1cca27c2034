use std::fmt;

use crate::world::Pose;

/// Constants that depend on the frame-buffer, not on the map.
pub const SCREEN_WIDTH: usize = 320;
pub const SCREEN_HEIGHT: usize = 256;
pub const HORIZON_HEIGHT: usize = SCREEN_HEIGHT / 2;

/// Wall half-height at a distance of one sub-tile unit (1/256 tile).
pub const INV_FACTOR_INT: u32 = SCREEN_WIDTH as u32 * 75;
/// Same factor for distances measured in tiles.
pub const INV_FACTOR: f32 = INV_FACTOR_INT as f32 / 256.0;
/// Closest distance (1/256 tile) whose wall still fits on screen.
pub const MIN_DIST: i32 = (150 * SCREEN_WIDTH / SCREEN_HEIGHT) as i32;

/// Fixed-point angle units in a full circle and in a quadrant.
pub const ANGLE_UNITS: u16 = 1024;
pub const QUADRANT_UNITS: u16 = 256;

/// What one screen column's ray struck.
///
/// Both back ends fill the same representation so the renderer does not
/// care which one produced it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraceResult {
    /// Half-height of the wall strip in pixels, symmetric about the horizon.
    pub screen_y: u8,
    /// 0 = horizontal grid line (north/south face), 1 = vertical (east/west).
    pub texture_no: u8,
    /// Hit offset along the wall face, 1/256 tile.
    pub texture_x: u8,
    /// First texture row, 10 fractional bits over a 64-texel column.
    pub texture_y: u16,
    /// Per-pixel increment of `texture_y`.
    pub texture_step: u16,
}

/// Which back end a caster is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    Fixed,
    Float,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Fixed => write!(f, "fixed"),
            Variant::Float => write!(f, "float"),
        }
    }
}

/// Per-frame ray casting contract shared by both back ends.
///
/// `trace` borrows immutably: columns carry no state between calls, so they
/// may be traced in any order or from several threads at once.
pub trait RayCaster {
    /// Snapshot the pose for the upcoming frame.
    fn start(&mut self, pose: &Pose);

    /// Cast the ray of `column` in `0..SCREEN_WIDTH`.
    fn trace(&self, column: u16) -> TraceResult;

    fn variant(&self) -> Variant;
}

/// Column index as a table index. Out-of-range columns are a caller bug:
/// they trip the debug assertion and are clamped in release builds.
#[inline]
pub(crate) fn column_index(column: u16) -> usize {
    debug_assert!(
        (column as usize) < SCREEN_WIDTH,
        "column {column} outside 0..{SCREEN_WIDTH}"
    );
    (column as usize).min(SCREEN_WIDTH - 1)
}
