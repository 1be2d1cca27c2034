use crate::world::{Pose, TileMap};

pub const MOVE_SPEED: f32 = 2.5; // tiles / second
pub const TURN_SPEED: f32 = 1.5; // rad / second
pub const MAX_FRAME_TIME: f32 = 0.1; // longer stalls are integrated as this

/// Directional input for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Motion {
    pub forward: i8, // -1 back, +1 forward
    pub turn: i8,    // -1 left, +1 right
}

impl Motion {
    /// Any magnitude collapses to its sign.
    pub fn new(forward: i8, turn: i8) -> Self {
        Self {
            forward: forward.signum(),
            turn: turn.signum(),
        }
    }

    #[inline]
    pub fn is_idle(self) -> bool {
        self.forward == 0 && self.turn == 0
    }
}

/// Integrates [`Motion`] into a [`Pose`] with basic wall blocking.
#[derive(Clone, Copy, Debug)]
pub struct Mover {
    pub move_speed: f32,
    pub turn_speed: f32,
}

impl Default for Mover {
    fn default() -> Self {
        Self {
            move_speed: MOVE_SPEED,
            turn_speed: TURN_SPEED,
        }
    }
}

impl Mover {
    /// Turn first, then step along the new heading.
    ///
    /// Each axis is tried on its own so the player slides along walls
    /// instead of sticking to them.
    pub fn advance(&self, pose: &mut Pose, map: &TileMap, motion: Motion, seconds: f32) {
        let dt = seconds.clamp(0.0, MAX_FRAME_TIME);
        if motion.is_idle() || dt == 0.0 {
            return;
        }

        pose.turn(f32::from(motion.turn) * self.turn_speed * dt);

        let step = pose.forward() * (f32::from(motion.forward) * self.move_speed * dt);
        let next_x = pose.pos.x + step.x;
        if !map.is_wall(next_x.floor() as i32, pose.pos.y.floor() as i32) {
            pose.pos.x = next_x;
        }
        let next_y = pose.pos.y + step.y;
        if !map.is_wall(pose.pos.x.floor() as i32, next_y.floor() as i32) {
            pose.pos.y = next_y;
        }
        debug_assert!(pose.pos.is_finite(), "pose diverged: {:?}", pose.pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec2;
    use std::f32::consts::FRAC_PI_2;

    fn room() -> TileMap {
        TileMap::walled(8, 8).unwrap()
    }

    #[test]
    fn motion_collapses_to_sign() {
        assert_eq!(Motion::new(5, -3), Motion { forward: 1, turn: -1 });
        assert!(Motion::new(0, 0).is_idle());
    }

    #[test]
    fn turning_right_increases_heading() {
        let mut pose = Pose::new(4.5, 4.5, 0.0);
        Mover::default().advance(&mut pose, &room(), Motion::new(0, 1), 0.1);
        assert!((pose.heading - TURN_SPEED * 0.1).abs() < 1e-5);
        assert_eq!(pose.pos, vec2(4.5, 4.5));
    }

    #[test]
    fn walls_block_but_allow_sliding() {
        // Facing east, one step from the wall at x = 7, drifting north.
        let mut pose = Pose::new(6.9, 3.5, FRAC_PI_2 - 0.3);
        let mover = Mover::default();
        for _ in 0..10 {
            mover.advance(&mut pose, &room(), Motion::new(1, 0), 0.05);
        }
        assert!(pose.pos.x < 7.0);
        assert!(pose.pos.y > 3.5);
    }

    #[test]
    fn long_stalls_are_clamped() {
        let mut pose = Pose::new(4.5, 1.5, 0.0);
        Mover::default().advance(&mut pose, &room(), Motion::new(1, 0), 10.0);
        assert!((pose.pos.y - (1.5 + MOVE_SPEED * MAX_FRAME_TIME)).abs() < 1e-5);
    }
}
