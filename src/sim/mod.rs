mod mover;

pub use mover::{MAX_FRAME_TIME, MOVE_SPEED, Motion, Mover, TURN_SPEED};
