mod map;
mod pose;
mod scene;
mod texture;

pub use map::{MAP_X, MAP_Y, MAX_MAP_DIM, MapError, TileMap, WALL_GLYPH};
pub use pose::Pose;
pub use scene::Scene;
pub use texture::{TEXTURE_SHIFT, TEXTURE_SIZE, Texture, TextureAtlas, TextureError, TextureId};
