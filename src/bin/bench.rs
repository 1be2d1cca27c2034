//! Headless comparison of the two back ends.
//!
//! Turns on the spot through a full circle (optionally walking forward),
//! rendering every frame with both casters, then reports per-variant timing
//! and how closely the fixed-point output tracks the floating-point one, per
//! trace and per pixel.
//!
//! ```bash
//! cargo run --release --bin bench -- --frames 1000 --parallel
//! ```

use clap::Parser;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use raycaster_rs::{
    config::{SceneArgs, Settings, init_logging},
    engine::{
        FrameDiff, SCREEN_HEIGHT, SCREEN_WIDTH, SCREEN_Y_TOLERANCE, Variant, compare_frames,
    },
    renderer::{Rgba, View},
    sim::{Motion, Mover},
    world::TextureAtlas,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    #[command(flatten)]
    scene: SceneArgs,

    /// Frames rendered per variant
    #[arg(long, default_value_t = 600)]
    frames: usize,

    /// Walk forward while turning
    #[arg(long)]
    walk: bool,
}

/// Accumulated wall-clock time of one variant.
#[derive(Default)]
struct Timing {
    total: Duration,
    worst: Duration,
}

impl Timing {
    fn add(&mut self, t: Duration) {
        self.total += t;
        self.worst = self.worst.max(t);
    }

    fn report(&self, variant: Variant, frames: usize) {
        let avg_ms = self.total.as_secs_f64() * 1000.0 / frames.max(1) as f64;
        info!(
            "{variant:>5}: avg {avg_ms:.3} ms  worst {:.3} ms  ({:.1} FPS)",
            self.worst.as_secs_f64() * 1000.0,
            1000.0 / avg_ms
        );
    }
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    init_logging(opts.scene.log_level);

    let mut settings = Settings {
        frames: opts.frames,
        ..Settings::default()
    };
    opts.scene.apply(&mut settings);

    let mut scene = settings.scene()?;
    let atlas = TextureAtlas::default();
    let mover = Mover::default();
    let mut fixed = View::new(Variant::Fixed, scene.map().clone());
    let mut float = View::new(Variant::Float, scene.map().clone());

    // One full turn over the run, unless dt hits the mover's frame clamp.
    let frames = settings.frames.max(1);
    let dt = std::f32::consts::TAU / mover.turn_speed / frames as f32;
    let motion = Motion::new(i8::from(opts.walk), 1);

    let mut fixed_time = Timing::default();
    let mut float_time = Timing::default();
    let mut diff = FrameDiff::default();
    let mut worst_frame = (0usize, FrameDiff::default());
    let mut fixed_px: Vec<Rgba> = Vec::new();
    let mut float_px: Vec<Rgba> = Vec::new();
    let mut differing_px = 0usize;

    info!(frames, parallel = settings.parallel, walk = opts.walk, "benchmark started");
    for frame in 0..frames {
        let pose = scene.pose();

        let t0 = Instant::now();
        fixed.render(&pose, &atlas, settings.parallel, |fb, _, _| {
            fixed_px.clear();
            fixed_px.extend_from_slice(fb);
        });
        fixed_time.add(t0.elapsed());

        let t0 = Instant::now();
        float.render(&pose, &atlas, settings.parallel, |fb, _, _| {
            float_px.clear();
            float_px.extend_from_slice(fb);
        });
        float_time.add(t0.elapsed());

        let frame_diff = compare_frames(float.traces(), fixed.traces());
        if frame_diff.orientation_mismatches + frame_diff.over_tolerance
            > worst_frame.1.orientation_mismatches + worst_frame.1.over_tolerance
        {
            worst_frame = (frame, frame_diff);
        }
        diff.merge(&frame_diff);
        differing_px += fixed_px.iter().zip(&float_px).filter(|(a, b)| a != b).count();

        scene.advance(&mover, motion, dt);
    }

    fixed_time.report(Variant::Fixed, frames);
    float_time.report(Variant::Float, frames);
    info!(
        "agreement: {} columns, {} orientation mismatches, {} of {} far columns beyond ±{} px (max Δ {} px), max texture Δ {}/256",
        diff.columns,
        diff.orientation_mismatches,
        diff.over_tolerance,
        diff.far_columns,
        SCREEN_Y_TOLERANCE,
        diff.max_screen_y_delta,
        diff.max_texture_x_delta,
    );
    if !diff.within_tolerance() {
        warn!(frame = worst_frame.0, worst = ?worst_frame.1, "fixed output drifted past tolerance");
    }
    let total_px = frames * SCREEN_WIDTH * SCREEN_HEIGHT;
    info!(
        "pixels: {differing_px} of {total_px} differ ({:.2}%)",
        100.0 * differing_px as f64 / total_px as f64
    );
    Ok(())
}
