//! Side-by-side viewer: fixed-point caster on the left, floating-point on
//! the right, one pixel apart.
//!
//! ```bash
//! cargo run --release -- [--map level.txt] [--scale 3] [--parallel]
//! ```
//!
//! Arrow keys or WASD move and turn, Esc quits.

use clap::Parser;
use minifb::{Key, Scale, Window, WindowOptions};
use std::time::{Duration, Instant};
use tracing::info;

use raycaster_rs::{
    config::{SceneArgs, Settings, init_logging},
    engine::{SCREEN_HEIGHT, SCREEN_WIDTH, Variant},
    renderer::{Rgba, View, compose_side_by_side},
    sim::{Motion, Mover},
    world::TextureAtlas,
};

/// Pixels between the two views.
const GAP: usize = 1;
const TITLE: &str = "RayCaster [fixed-point vs. floating-point]";

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    #[command(flatten)]
    scene: SceneArgs,

    /// Window magnification (1, 2, 4 or 8)
    #[arg(long, default_value_t = 2)]
    scale: usize,

    /// Frame-rate cap, 0 for none
    #[arg(long, default_value_t = 60)]
    fps: usize,
}

fn window_scale(scale: usize) -> Scale {
    match scale {
        0 | 1 => Scale::X1,
        2 => Scale::X2,
        3 | 4 => Scale::X4,
        _ => Scale::X8,
    }
}

/// Arrow keys and WASD; opposite keys cancel.
fn read_motion(win: &Window) -> Motion {
    let down = |keys: [Key; 2]| keys.iter().any(|&k| win.is_key_down(k));
    let forward = i8::from(down([Key::Up, Key::W])) - i8::from(down([Key::Down, Key::S]));
    let turn = i8::from(down([Key::Right, Key::D])) - i8::from(down([Key::Left, Key::A]));
    Motion::new(forward, turn)
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    init_logging(opts.scene.log_level);

    let mut settings = Settings {
        scale: opts.scale,
        target_fps: opts.fps,
        ..Settings::default()
    };
    opts.scene.apply(&mut settings);

    let mut scene = settings.scene()?;
    let atlas = TextureAtlas::default();
    let mover = Mover::default();
    let mut fixed = View::new(Variant::Fixed, scene.map().clone());
    let mut float = View::new(Variant::Float, scene.map().clone());

    let (win_w, win_h) = (2 * SCREEN_WIDTH + GAP, SCREEN_HEIGHT);
    let mut win = Window::new(
        TITLE,
        win_w,
        win_h,
        WindowOptions {
            scale: window_scale(settings.scale),
            ..WindowOptions::default()
        },
    )?;
    win.set_target_fps(settings.target_fps);

    let mut left: Vec<Rgba> = Vec::with_capacity(SCREEN_WIDTH * SCREEN_HEIGHT);
    let mut right: Vec<Rgba> = Vec::with_capacity(SCREEN_WIDTH * SCREEN_HEIGHT);
    let mut screen: Vec<Rgba> = Vec::with_capacity(win_w * win_h);

    // ────────────────── benchmarking state ──────────────────────────────
    let mut fixed_time = Duration::ZERO;
    let mut float_time = Duration::ZERO;
    let mut acc_frames = 0usize;
    let mut last_print = Instant::now();
    let mut last_frame = Instant::now();

    info!(parallel = settings.parallel, "viewer started");
    while win.is_open() && !win.is_key_down(Key::Escape) {
        let pose = scene.pose();

        let t0 = Instant::now();
        fixed.render(&pose, &atlas, settings.parallel, |fb, _, _| {
            left.clear();
            left.extend_from_slice(fb);
        });
        let t1 = Instant::now();
        float.render(&pose, &atlas, settings.parallel, |fb, _, _| {
            right.clear();
            right.extend_from_slice(fb);
        });
        fixed_time += t1 - t0;
        float_time += t1.elapsed();
        acc_frames += 1;

        compose_side_by_side(&left, &right, SCREEN_WIDTH, SCREEN_HEIGHT, GAP, &mut screen);
        win.update_with_buffer(&screen, win_w, win_h)?;

        // ─────────── report every ~1 s ─────────────────────────────────
        if last_print.elapsed() >= Duration::from_secs(1) {
            let fps = acc_frames as f64 / last_print.elapsed().as_secs_f64();
            let fixed_ms = fixed_time.as_secs_f64() * 1000.0 / acc_frames as f64;
            let float_ms = float_time.as_secs_f64() * 1000.0 / acc_frames as f64;
            info!("{fps:.1} FPS  fixed {fixed_ms:.3} ms  float {float_ms:.3} ms");
            win.set_title(&format!("{TITLE}  {fps:.0} FPS"));
            fixed_time = Duration::ZERO;
            float_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }

        let now = Instant::now();
        scene.advance(&mover, read_motion(&win), (now - last_frame).as_secs_f32());
        last_frame = now;
    }
    Ok(())
}
