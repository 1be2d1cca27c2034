//! Rendering abstraction layer.
//!
//! *The casters never touch a pixel buffer directly.* They produce one
//! [`TraceResult`] per screen column and a type implementing [`Renderer`]
//! turns each into a painted column.
//!
//! * A helper blanket-impl [`RendererExt`] adds `draw_frame` so call-sites
//!   stay short.
//! * [`View`] bundles a caster, a renderer and the per-frame trace buffer:
//!   one per back end in the side-by-side viewer.

use crate::engine::{
    BoxedCaster, SCREEN_HEIGHT, SCREEN_WIDTH, TraceResult, Variant, caster, trace_columns,
    trace_columns_parallel,
};
use crate::world::{Pose, TextureAtlas, TileMap};
use std::sync::Arc;
use tracing::trace;

/// Pixel format of the software frame-buffer (0x00RRGGBB).
pub type Rgba = u32;

/// Grey with all three channels at `intensity`. Every painted pixel, wall
/// or gradient, goes through here.
#[inline]
pub fn shade(intensity: u8) -> Rgba {
    u32::from(intensity) * 0x0001_0101
}

/// A renderer that owns an internal scratch buffer for the whole frame.
///
/// `end_frame` hands the finished buffer to a user-supplied closure.
pub trait Renderer {
    /// (Re)allocate internal scratch for the requested resolution.
    fn begin_frame(&mut self, width: usize, height: usize);

    /// Paint screen column `x` from its trace. Overwrites every pixel of the
    /// column.
    fn draw_column(&mut self, x: usize, trace: &TraceResult, atlas: &TextureAtlas);

    /// Finish the frame and **loan** the finished buffer to `submit`.
    ///
    /// * `submit(&[Rgba], w, h)` is run exactly once per frame.
    /// * Window callers pass `|fb, w, h| window.update_with_buffer(fb, w, h)`.
    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize);
}

/// Convenience blanket-impl with a one-liner `draw_frame` adaptor.
pub trait RendererExt: Renderer {
    fn draw_frame<F>(&mut self, traces: &[TraceResult], atlas: &TextureAtlas, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize),
    {
        self.begin_frame(SCREEN_WIDTH, SCREEN_HEIGHT);
        for (x, t) in traces.iter().enumerate().take(SCREEN_WIDTH) {
            self.draw_column(x, t, atlas);
        }
        self.end_frame(submit);
    }
}
impl<T: Renderer + ?Sized> RendererExt for T {}

/// One back end's half of the screen.
pub struct View {
    caster: BoxedCaster,
    renderer: software::Software,
    traces: Vec<TraceResult>,
}

impl View {
    pub fn new(variant: Variant, map: Arc<TileMap>) -> Self {
        Self {
            caster: caster(variant, map),
            renderer: software::Software::default(),
            traces: Vec::with_capacity(SCREEN_WIDTH),
        }
    }

    pub fn variant(&self) -> Variant {
        self.caster.variant()
    }

    /// Traces of the last rendered frame.
    pub fn traces(&self) -> &[TraceResult] {
        &self.traces
    }

    /// Cast every column from `pose`, optionally across the rayon pool.
    pub fn trace(&mut self, pose: &Pose, parallel: bool) {
        self.caster.start(pose);
        if parallel {
            trace_columns_parallel(self.caster.as_ref(), &mut self.traces);
        } else {
            trace_columns(self.caster.as_ref(), &mut self.traces);
        }
        trace!(
            variant = %self.caster.variant(),
            x = pose.pos.x,
            y = pose.pos.y,
            heading = pose.heading,
            "traced frame"
        );
    }

    /// Trace and paint one frame, then loan the pixels to `submit`.
    pub fn render<F>(&mut self, pose: &Pose, atlas: &TextureAtlas, parallel: bool, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize),
    {
        self.trace(pose, parallel);
        self.renderer.draw_frame(&self.traces, atlas, submit);
    }
}

/// Two equally sized frames next to each other with a `gap`-pixel black
/// separator, left frame first.
pub fn compose_side_by_side(
    left: &[Rgba],
    right: &[Rgba],
    width: usize,
    height: usize,
    gap: usize,
    out: &mut Vec<Rgba>,
) {
    debug_assert_eq!(left.len(), width * height);
    debug_assert_eq!(right.len(), width * height);
    let stride = 2 * width + gap;
    out.clear();
    out.resize(stride * height, 0);
    for (y, row) in out.chunks_exact_mut(stride).enumerate() {
        let src = y * width..(y + 1) * width;
        row[..width].copy_from_slice(&left[src.clone()]);
        row[width + gap..].copy_from_slice(&right[src]);
    }
}

pub mod software;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shade_is_grey() {
        assert_eq!(shade(0), 0);
        assert_eq!(shade(0xFF), 0x00FF_FFFF);
        assert_eq!(shade(0x12), 0x0012_1212);
    }

    #[test]
    fn side_by_side_keeps_gap_black() {
        let (w, h) = (3, 2);
        let left = vec![1; w * h];
        let right = vec![2; w * h];
        let mut out = Vec::new();
        compose_side_by_side(&left, &right, w, h, 1, &mut out);
        assert_eq!(out.len(), (2 * w + 1) * h);
        assert_eq!(&out[..7], &[1, 1, 1, 0, 2, 2, 2]);
        assert_eq!(&out[7..], &[1, 1, 1, 0, 2, 2, 2]);
    }

    #[test]
    fn view_renders_full_frame() {
        let mut view = View::new(Variant::Fixed, Arc::new(TileMap::builtin()));
        let atlas = TextureAtlas::default();
        let mut seen = 0;
        view.render(&Pose::default(), &atlas, false, |fb, w, h| {
            assert_eq!((w, h), (SCREEN_WIDTH, SCREEN_HEIGHT));
            seen = fb.len();
        });
        assert_eq!(seen, SCREEN_WIDTH * SCREEN_HEIGHT);
        assert_eq!(view.traces().len(), SCREEN_WIDTH);
        assert_eq!(view.variant(), Variant::Fixed);
    }
}
