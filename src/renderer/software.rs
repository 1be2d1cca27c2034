//! ---------------------------------------------------------------------------
//! Software (CPU) column renderer
//!
//! * Fills a row-major `Vec<Rgba>` frame-buffer in **0x00RRGGBB** format.
//! * Each column is painted top to bottom in one pass: ceiling gradient,
//!   textured wall strip, floor gradient. Every pixel is written, so the
//!   buffer is never cleared.
//! ---------------------------------------------------------------------------

use crate::{
    engine::TraceResult,
    renderer::{Renderer, Rgba, shade},
    world::{Texture, TextureAtlas},
};

/// Gradient brightness at the horizon; it grows by one per row away from it.
const GRADIENT_BASE: u8 = 96;

/*───────────────────────────────────────────────────────────────────────*/
/*                              Backend                                 */
/*───────────────────────────────────────────────────────────────────────*/

/// Column painter for traced frames.
#[derive(Default)]
pub struct Software {
    scratch: Vec<Rgba>,
    width: usize,
    height: usize,
}

/*──────────────────────── Renderer trait impl ────────────────────────*/
impl Renderer for Software {
    fn begin_frame(&mut self, w: usize, h: usize) {
        // (re)allocate if resolution changed
        if w != self.width || h != self.height {
            self.width = w;
            self.height = h;
            self.scratch.resize(w * h, 0);
        }
    }

    fn draw_column(&mut self, x: usize, trace: &TraceResult, atlas: &TextureAtlas) {
        if x >= self.width {
            return;
        }
        let horizon = self.height / 2;
        let layout = ColumnLayout::new(trace.screen_y, horizon);
        let tex = atlas.slot(trace.texture_no);

        let mut cursor = PixelCursor {
            scratch: &mut self.scratch,
            index: x,
            stride: self.width,
        };

        /* ceiling: darkens towards the horizon -----------------------------*/
        for y in 0..layout.gap {
            cursor.put(gradient(horizon - y));
        }

        /* wall strip ---------------------------------------------------------*/
        paint_wall(&mut cursor, layout.half * 2, trace, tex);

        /* floor: brightens away from the horizon ---------------------------*/
        for y in 0..layout.gap {
            cursor.put(gradient(horizon - (layout.gap - y)));
        }
    }

    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize),
    {
        submit(&self.scratch, self.width, self.height);
    }
}

/*──────────────────────── helper structs ─────────────────────────────*/

/// Vertical split of one column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ColumnLayout {
    /// Ceiling rows, and likewise floor rows.
    gap: usize,
    /// Wall rows above the horizon, and likewise below.
    half: usize,
}

impl ColumnLayout {
    fn new(screen_y: u8, horizon: usize) -> Self {
        let half = usize::from(screen_y).min(horizon);
        Self {
            gap: horizon - half,
            half,
        }
    }
}

/// Walks down one column of a row-major buffer.
struct PixelCursor<'a> {
    scratch: &'a mut [Rgba],
    index: usize,
    stride: usize,
}

impl PixelCursor<'_> {
    #[inline]
    fn put(&mut self, px: Rgba) {
        self.scratch[self.index] = px;
        self.index += self.stride;
    }
}

/*──────────────────────── column rendering ───────────────────────────*/

/// Linear ramp with distance from the horizon, saturating.
#[inline]
fn gradient(rows_from_horizon: usize) -> Rgba {
    let falloff = u8::try_from(rows_from_horizon).unwrap_or(u8::MAX);
    shade(GRADIENT_BASE.saturating_add(falloff))
}

/// `rows` wall pixels sampled at `texture_x`, stepping `texture_y` by
/// `texture_step` (10 fractional bits) per pixel.
fn paint_wall(cursor: &mut PixelCursor<'_>, rows: usize, trace: &TraceResult, tex: &Texture) {
    let u = usize::from(trace.texture_x >> 2);
    let mut v = trace.texture_y;
    let dark = trace.texture_no == 1;
    for _ in 0..rows {
        let mut texel = tex.texel(u, usize::from(v >> 10));
        v = v.wrapping_add(trace.texture_step);
        if dark {
            texel >>= 1;
        }
        cursor.put(shade(texel));
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::{HORIZON_HEIGHT, SCREEN_HEIGHT, SCREEN_WIDTH},
        renderer::RendererExt,
        world::TEXTURE_SIZE,
    };

    /* tiny helpers ---------------------------------------------------*/
    fn flat_atlas(ns: u8, ew: u8) -> TextureAtlas {
        let flat = |v| Texture::from_pixels("FLAT", vec![v; TEXTURE_SIZE * TEXTURE_SIZE]).unwrap();
        TextureAtlas::new(flat(ns), flat(ew))
    }

    fn wall(screen_y: u8, texture_no: u8) -> TraceResult {
        TraceResult {
            screen_y,
            texture_no,
            texture_x: 0,
            texture_y: 0,
            texture_step: 1 << 10,
        }
    }

    fn render(traces: &[TraceResult], atlas: &TextureAtlas) -> Vec<Rgba> {
        let mut sw = Software::default();
        let mut out = Vec::new();
        sw.draw_frame(traces, atlas, |fb, _, _| out.extend_from_slice(fb));
        out
    }

    fn column(fb: &[Rgba], x: usize) -> Vec<Rgba> {
        fb.iter().skip(x).step_by(SCREEN_WIDTH).copied().collect()
    }

    #[test]
    fn same_trace_paints_identical_columns() {
        let atlas = TextureAtlas::default();
        let t = TraceResult {
            screen_y: 40,
            texture_no: 0,
            texture_x: 77,
            texture_y: 0,
            texture_step: 3000,
        };
        let a = render(&[t; SCREEN_WIDTH], &atlas);
        let b = render(&[t; SCREEN_WIDTH], &atlas);
        assert_eq!(a, b);
        assert_eq!(column(&a, 0), column(&a, SCREEN_WIDTH - 1));
    }

    #[test]
    fn every_pixel_is_written() {
        let atlas = flat_atlas(20, 20);
        let mut sw = Software::default();
        // Dirty the scratch with one frame, then paint a different one.
        sw.draw_frame(&[wall(HORIZON_HEIGHT as u8, 0); SCREEN_WIDTH], &atlas, |_, _, _| {});
        let mut fb = Vec::new();
        sw.draw_frame(&[wall(0, 0); SCREEN_WIDTH], &atlas, |px, w, h| {
            assert_eq!((w, h), (SCREEN_WIDTH, SCREEN_HEIGHT));
            fb.extend_from_slice(px);
        });
        assert!(fb.iter().all(|&p| p != shade(20)));
    }

    #[test]
    fn layout_splits_column() {
        let col = column(&render(&[wall(10, 0); SCREEN_WIDTH], &flat_atlas(50, 50)), 3);
        let gap = HORIZON_HEIGHT - 10;
        assert_eq!(col.len(), SCREEN_HEIGHT);
        assert!(col[..gap].iter().all(|&p| p != shade(50)));
        assert!(col[gap..gap + 20].iter().all(|&p| p == shade(50)));
        assert!(col[gap + 20..].iter().all(|&p| p != shade(50)));
        // Both gradients are darkest next to the wall.
        assert_eq!(col[0], shade(224));
        assert_eq!(col[gap - 1], shade(224 - (gap as u8 - 1)));
        assert_eq!(col[gap + 20], shade(224 - gap as u8));
        assert_eq!(col[SCREEN_HEIGHT - 1], shade(223));
    }

    #[test]
    fn oversized_wall_fills_screen() {
        let col = column(&render(&[wall(130, 0); SCREEN_WIDTH], &flat_atlas(50, 50)), 0);
        assert!(col.iter().all(|&p| p == shade(50)));
    }

    #[test]
    fn east_west_faces_are_darker() {
        let fb = render(&[wall(64, 1); SCREEN_WIDTH], &flat_atlas(50, 201));
        assert_eq!(fb[HORIZON_HEIGHT * SCREEN_WIDTH], shade(100));
    }

    #[test]
    fn texture_rows_follow_step() {
        let stripes = Texture::generate("STRIPES", |_, v| v as u8);
        let atlas = TextureAtlas::new(stripes.clone(), stripes);
        let t = TraceResult {
            screen_y: 4,
            texture_no: 0,
            texture_x: 0,
            texture_y: 5 << 10,
            texture_step: 2 << 10,
        };
        let col = column(&render(&[t; SCREEN_WIDTH], &atlas), 0);
        let top = HORIZON_HEIGHT - 4;
        let rows: Vec<Rgba> = col[top..top + 8].to_vec();
        let expected: Vec<Rgba> = (0..8).map(|i| shade(5 + 2 * i)).collect();
        assert_eq!(rows, expected);
    }
}
