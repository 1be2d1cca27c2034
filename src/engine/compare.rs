//! Column-by-column agreement between two casters' frames.

use rayon::prelude::*;

use crate::engine::types::{RayCaster, SCREEN_WIDTH, TraceResult};

/// Largest `screen_y` difference still counted as agreement.
pub const SCREEN_Y_TOLERANCE: u8 = 2;

/// Walls drawn at least this tall are near-field: close and usually seen at
/// a grazing angle, where one fixed angle unit moves the hit a long way.
/// They are compared for orientation only.
pub const NEAR_FIELD_HEIGHT: u8 = 48;

/// Agreement statistics for one or more frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameDiff {
    pub columns: usize,
    /// Columns whose rays struck differently oriented faces.
    pub orientation_mismatches: usize,
    /// Same-orientation columns beyond the near field.
    pub far_columns: usize,
    pub max_screen_y_delta: u8,
    /// Far columns whose `screen_y` differs by more than the tolerance.
    pub over_tolerance: usize,
    /// Largest texture offset difference, wrapping at one tile.
    pub max_texture_x_delta: u8,
}

impl FrameDiff {
    #[inline]
    pub fn within_tolerance(&self) -> bool {
        self.over_tolerance == 0
    }

    /// Fold another frame's statistics into this one.
    pub fn merge(&mut self, other: &FrameDiff) {
        self.columns += other.columns;
        self.orientation_mismatches += other.orientation_mismatches;
        self.far_columns += other.far_columns;
        self.over_tolerance += other.over_tolerance;
        self.max_screen_y_delta = self.max_screen_y_delta.max(other.max_screen_y_delta);
        self.max_texture_x_delta = self.max_texture_x_delta.max(other.max_texture_x_delta);
    }
}

/// Compare two frames column by column. Extra columns in the longer slice
/// are ignored.
pub fn compare_frames(reference: &[TraceResult], candidate: &[TraceResult]) -> FrameDiff {
    let mut diff = FrameDiff::default();
    for (r, c) in reference.iter().zip(candidate) {
        diff.columns += 1;
        if r.texture_no != c.texture_no {
            diff.orientation_mismatches += 1;
            continue;
        }
        let tx = r.texture_x.wrapping_sub(c.texture_x);
        diff.max_texture_x_delta = diff.max_texture_x_delta.max(tx.min(tx.wrapping_neg()));

        if r.screen_y >= NEAR_FIELD_HEIGHT || c.screen_y >= NEAR_FIELD_HEIGHT {
            continue;
        }
        diff.far_columns += 1;
        let dy = r.screen_y.abs_diff(c.screen_y);
        diff.max_screen_y_delta = diff.max_screen_y_delta.max(dy);
        if dy > SCREEN_Y_TOLERANCE {
            diff.over_tolerance += 1;
        }
    }
    diff
}

/// Trace every column of the frame `caster` was last started on.
pub fn trace_columns<C>(caster: &C, out: &mut Vec<TraceResult>)
where
    C: RayCaster + ?Sized,
{
    out.clear();
    out.extend((0..SCREEN_WIDTH as u16).map(|column| caster.trace(column)));
}

/// [`trace_columns`] spread over the rayon pool; each worker fills only its
/// own column's slot.
pub fn trace_columns_parallel<C>(caster: &C, out: &mut Vec<TraceResult>)
where
    C: RayCaster + Sync + ?Sized,
{
    out.clear();
    out.resize(SCREEN_WIDTH, TraceResult::default());
    out.par_iter_mut()
        .enumerate()
        .for_each(|(column, slot)| *slot = caster.trace(column as u16));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{FixedCaster, FloatCaster};
    use crate::world::{Pose, TileMap};
    use std::f32::consts::TAU;
    use std::sync::Arc;

    fn result(screen_y: u8, texture_no: u8, texture_x: u8) -> TraceResult {
        TraceResult {
            screen_y,
            texture_no,
            texture_x,
            ..TraceResult::default()
        }
    }

    #[test]
    fn both_variants_see_the_room_walls() {
        use crate::engine::{INV_FACTOR, SCREEN_WIDTH, Variant, caster};
        use std::f32::consts::FRAC_PI_2;

        let map = Arc::new(TileMap::walled(16, 16).unwrap());
        let centre = (SCREEN_WIDTH / 2) as u16;
        let expected = (INV_FACTOR / 7.0) as u8;
        for (heading, texture_no) in [(FRAC_PI_2, 1), (0.0, 0)] {
            for variant in [Variant::Fixed, Variant::Float] {
                let mut c = caster(variant, map.clone());
                c.start(&Pose::new(8.0, 8.0, heading));
                let res = c.trace(centre);
                assert_eq!(res.texture_no, texture_no, "{variant} at {heading}");
                assert!(
                    res.screen_y.abs_diff(expected) <= SCREEN_Y_TOLERANCE,
                    "{variant} at {heading}: {}",
                    res.screen_y
                );
            }
        }
    }

    #[test]
    fn diff_counts_each_kind_of_disagreement() {
        let reference = [result(10, 0, 0), result(10, 0, 250), result(20, 1, 0), result(100, 0, 0)];
        let candidate = [result(12, 0, 0), result(14, 0, 4), result(20, 0, 0), result(90, 0, 0)];
        let diff = compare_frames(&reference, &candidate);

        assert_eq!(diff.columns, 4);
        assert_eq!(diff.orientation_mismatches, 1);
        assert_eq!(diff.far_columns, 2);
        assert_eq!(diff.max_screen_y_delta, 4);
        assert_eq!(diff.over_tolerance, 1);
        assert_eq!(diff.max_texture_x_delta, 10);
        assert!(!diff.within_tolerance());
    }

    #[test]
    fn merge_accumulates() {
        let mut total = FrameDiff::default();
        let one = compare_frames(&[result(10, 0, 0)], &[result(11, 1, 0)]);
        total.merge(&one);
        total.merge(&one);
        assert_eq!(total.columns, 2);
        assert_eq!(total.orientation_mismatches, 2);
        assert!(total.within_tolerance());
    }

    #[test]
    fn parallel_tracing_matches_sequential() {
        let mut caster = FixedCaster::new(Arc::new(TileMap::builtin()));
        caster.start(&Pose::default());
        let (mut seq, mut par) = (Vec::new(), Vec::new());
        trace_columns(&caster, &mut seq);
        trace_columns_parallel(&caster, &mut par);
        assert_eq!(seq.len(), SCREEN_WIDTH);
        assert_eq!(seq, par);
    }

    /// Both engines over a 16×16 room from poses at least half a tile from
    /// any wall. Positions are whole sub-tile units and headings sit just
    /// past a whole angle unit, so both engines see the same logical pose.
    #[test]
    fn fixed_and_float_agree() {
        let map = Arc::new(TileMap::walled(16, 16).unwrap());
        let mut fixed = FixedCaster::new(map.clone());
        let mut float = FloatCaster::new(map);
        let positions: [(u16, u16); 9] = [
            (640, 640),
            (2048, 2048),
            (2125, 968),
            (3085, 2554),
            (1408, 3328),
            (2504, 1567),
            (3500, 600),
            (700, 3300),
            (1111, 2222),
        ];

        let (mut a, mut b) = (Vec::new(), Vec::new());
        let mut total = FrameDiff::default();
        for &(x, y) in &positions {
            for unit in (0..1024).step_by(4) {
                let heading = (unit as f32 + 0.01) * TAU / 1024.0;
                let pose = Pose::new(f32::from(x) / 256.0, f32::from(y) / 256.0, heading);
                fixed.start(&pose);
                float.start(&pose);
                assert_eq!(fixed.pose().heading, unit);

                trace_columns(&fixed, &mut a);
                trace_columns(&float, &mut b);
                let diff = compare_frames(&b, &a);
                assert!(
                    diff.orientation_mismatches <= 8,
                    "pose ({x}, {y}) heading {unit}: {diff:?}"
                );
                total.merge(&diff);
            }
        }
        assert!(total.within_tolerance(), "{total:?}");
        assert!(total.far_columns > total.columns / 2);
    }
}
