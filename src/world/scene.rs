use std::sync::Arc;

use tracing::trace;

use crate::sim::{Motion, Mover};
use crate::world::{MapError, Pose, TileMap};

/// Everything the ray casters read each frame: the map and the player.
///
/// The map is shared read-only with the casters; only the mover changes the
/// pose, once per frame.
#[derive(Clone, Debug)]
pub struct Scene {
    map: Arc<TileMap>,
    pose: Pose,
}

impl Scene {
    /// Fails with [`MapError::Blocked`] if `pose` starts inside a wall.
    pub fn new(map: TileMap, pose: Pose) -> Result<Self, MapError> {
        let (x, y) = pose.tile();
        if map.is_wall(x, y) {
            return Err(MapError::Blocked { x, y });
        }
        Ok(Self {
            map: Arc::new(map),
            pose,
        })
    }

    /// Built-in map with the default start pose.
    pub fn builtin() -> Self {
        Self {
            map: Arc::new(TileMap::builtin()),
            pose: Pose::default(),
        }
    }

    #[inline]
    pub fn map(&self) -> &Arc<TileMap> {
        &self.map
    }

    #[inline]
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Integrate one frame of player input.
    pub fn advance(&mut self, mover: &Mover, motion: Motion, seconds: f32) {
        mover.advance(&mut self.pose, &self.map, motion, seconds);
        trace!(x = self.pose.pos.x, y = self.pose.pos.y, heading = self.pose.heading, "pose");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_inside_wall_rejected() {
        let map = TileMap::walled(8, 8).unwrap();
        let err = Scene::new(map, Pose::new(0.5, 3.5, 0.0)).unwrap_err();
        assert_eq!(err, MapError::Blocked { x: 0, y: 3 });
    }

    #[test]
    fn builtin_scene_starts_in_open_cell() {
        let scene = Scene::builtin();
        let (x, y) = scene.pose().tile();
        assert!(!scene.map().is_wall(x, y));
    }

    #[test]
    fn advance_moves_forward() {
        let map = TileMap::walled(8, 8).unwrap();
        let mut scene = Scene::new(map, Pose::new(4.5, 2.5, 0.0)).unwrap();
        scene.advance(&Mover::default(), Motion::new(1, 0), 0.1);
        assert!(scene.pose().pos.y > 2.5);
        assert!((scene.pose().pos.x - 4.5).abs() < 1e-5);
    }
}
