//! Run-time settings shared by the binaries.
//!
//! The binaries parse their command lines with `clap`; the options common to
//! all of them live in [`SceneArgs`] and end up in a [`Settings`].

use std::fmt;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use thiserror::Error;
use tracing::info;

use crate::world::{MapError, Pose, Scene, TileMap};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read map file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bad map file {path:?}")]
    Map {
        path: PathBuf,
        #[source]
        source: MapError,
    },

    #[error(transparent)]
    Scene(#[from] MapError),
}

/// Where the tile map comes from.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum MapSource {
    #[default]
    Builtin,
    /// ASCII drawing, see [`TileMap::from_ascii`].
    Ascii(PathBuf),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// Integer window magnification.
    pub scale: usize,
    /// Frame-rate cap for the viewer; 0 leaves it uncapped.
    pub target_fps: usize,
    pub map: MapSource,
    pub start: Pose,
    /// Trace columns on the rayon pool.
    pub parallel: bool,
    /// Frames the headless benchmark renders per variant.
    pub frames: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scale: 2,
            target_fps: 60,
            map: MapSource::Builtin,
            start: Pose::default(),
            parallel: false,
            frames: 600,
        }
    }
}

impl Settings {
    pub fn load_map(&self) -> Result<TileMap, ConfigError> {
        match &self.map {
            MapSource::Builtin => Ok(TileMap::builtin()),
            MapSource::Ascii(path) => load_ascii(path),
        }
    }

    /// Map plus start pose; fails if the pose is inside a wall.
    pub fn scene(&self) -> Result<Scene, ConfigError> {
        let map = self.load_map()?;
        info!(
            width = map.width(),
            height = map.height(),
            walls = map.wall_count(),
            "map loaded"
        );
        Ok(Scene::new(map, self.start)?)
    }
}

fn load_ascii(path: &Path) -> Result<TileMap, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    TileMap::from_ascii(&text).map_err(|source| ConfigError::Map {
        path: path.to_path_buf(),
        source,
    })
}

/// Scene options every binary accepts.
#[derive(Args, Clone, Debug)]
pub struct SceneArgs {
    /// ASCII map file ('#' wall, '.' empty, north row first) [default: built-in map]
    #[arg(long, value_name = "FILE")]
    pub map: Option<PathBuf>,

    /// Start position, x in tiles
    #[arg(long, default_value_t = 2.5)]
    pub x: f32,

    /// Start position, y in tiles
    #[arg(long, default_value_t = 2.5)]
    pub y: f32,

    /// Start heading in degrees, 0 = north, 90 = east
    #[arg(long, default_value_t = 45.0, allow_negative_numbers = true)]
    pub heading: f32,

    /// Trace columns in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Set logging level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl SceneArgs {
    /// Overlay these options on `settings`.
    pub fn apply(&self, settings: &mut Settings) {
        settings.map = self
            .map
            .clone()
            .map_or(MapSource::Builtin, MapSource::Ascii);
        settings.start = Pose::new(self.x, self.y, self.heading.to_radians());
        settings.parallel = self.parallel;
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Install the global `tracing` subscriber. An explicit level wins over
/// `RUST_LOG`, which wins over `info`.
pub fn init_logging(level: Option<LogLevel>) {
    let filter = match level {
        Some(level) => tracing_subscriber::EnvFilter::new(level.to_string()),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
