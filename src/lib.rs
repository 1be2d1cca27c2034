//! Fixed-point vs. floating-point tile raycaster.
//!
//! * [`world`] holds the tile map, the player pose and the wall textures.
//! * [`engine`] implements the two ray casting back ends behind one trait.
//! * [`renderer`] paints traced columns into a frame-buffer.
//! * [`sim`] moves the player between frames.

pub mod config;
pub mod engine;
pub mod renderer;
pub mod sim;
pub mod world;
