//! Ray casting back ends.
//!
//! Both engines implement [`RayCaster`]: `start` snapshots the pose once per
//! frame, then `trace` is called for every screen column. They share no
//! state beyond the read-only map, so their outputs can be compared
//! directly.

mod compare;
mod fixed;
mod fixmath;
mod float;
pub mod tables;
mod types;

use std::sync::Arc;

use tracing::debug;

use crate::world::TileMap;

pub use compare::{
    FrameDiff, NEAR_FIELD_HEIGHT, SCREEN_Y_TOLERANCE, compare_frames, trace_columns,
    trace_columns_parallel,
};
pub use fixed::{FixedCaster, FixedPose, Hit};
pub use float::{FloatCaster, FloatHit, Side};
pub use types::{
    ANGLE_UNITS, HORIZON_HEIGHT, INV_FACTOR, INV_FACTOR_INT, MIN_DIST, QUADRANT_UNITS, RayCaster,
    SCREEN_HEIGHT, SCREEN_WIDTH, TraceResult, Variant,
};

/// A caster that can be traced from several threads.
pub type BoxedCaster = Box<dyn RayCaster + Send + Sync>;

/// Build the back end for `variant` over a shared map.
pub fn caster(variant: Variant, map: Arc<TileMap>) -> BoxedCaster {
    debug!(%variant, width = map.width(), height = map.height(), "creating caster");
    match variant {
        Variant::Fixed => Box::new(FixedCaster::new(map)),
        Variant::Float => Box::new(FloatCaster::new(map)),
    }
}
