// Wall textures as the renderer sees them: square grids of 8-bit intensity.
// Decoding image files is the caller's business; the built-in textures are
// generated procedurally.

/// Side of every wall texture, in texels.
pub const TEXTURE_SIZE: usize = 64;
/// `log2(TEXTURE_SIZE)`, used to turn a row index into a pixel offset.
pub const TEXTURE_SHIFT: usize = 6;

/// Runtime handle for a texture slot in the atlas.
pub type TextureId = u8;

/// One square intensity texture, row-major, `TEXTURE_SIZE²` bytes.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub name: String,
    pixels: Vec<u8>,
}

/// Convenience checkerboard (dark/light grey, 8-texel squares).
impl Default for Texture {
    fn default() -> Self {
        const LIGHT: u8 = 192;
        const DARK: u8 = 64;
        Self::generate("CHECKER", |u, v| {
            if ((u >> 3) ^ (v >> 3)) & 1 == 0 {
                LIGHT
            } else {
                DARK
            }
        })
    }
}

/// Things that can go wrong when using the atlas.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextureError {
    /// Pixel buffer is not `TEXTURE_SIZE × TEXTURE_SIZE`.
    #[error("texture `{name}` has {len} texels, expected {}", TEXTURE_SIZE * TEXTURE_SIZE)]
    BadSize { name: String, len: usize },

    /// Requested slot is outside `0 .. atlas.len()`.
    #[error("texture id {0} out of range")]
    BadId(TextureId),

    /// The atlas already holds 256 textures.
    #[error("texture atlas is full")]
    Full,
}

impl Texture {
    pub fn from_pixels<S: Into<String>>(name: S, pixels: Vec<u8>) -> Result<Self, TextureError> {
        let name = name.into();
        if pixels.len() != TEXTURE_SIZE * TEXTURE_SIZE {
            return Err(TextureError::BadSize {
                name,
                len: pixels.len(),
            });
        }
        Ok(Self { name, pixels })
    }

    /// Build a texture from a `(u, v) -> intensity` function.
    pub fn generate<S, F>(name: S, mut texel: F) -> Self
    where
        S: Into<String>,
        F: FnMut(usize, usize) -> u8,
    {
        let mut pixels = Vec::with_capacity(TEXTURE_SIZE * TEXTURE_SIZE);
        for v in 0..TEXTURE_SIZE {
            for u in 0..TEXTURE_SIZE {
                pixels.push(texel(u, v));
            }
        }
        Self {
            name: name.into(),
            pixels,
        }
    }

    /// Staggered brick courses, 16 texels tall, with mortar joints.
    pub fn bricks() -> Self {
        Self::generate("BRICK", |u, v| {
            let course = v >> 4;
            let shifted = (u + if course & 1 == 1 { 16 } else { 0 }) & (TEXTURE_SIZE - 1);
            if v & 15 == 0 || shifted & 31 == 0 {
                return 48;
            }
            160 + grain(u, v, 31)
        })
    }

    /// Large 32-texel blocks with a lit top-left bevel and shaded bottom-right.
    pub fn stone() -> Self {
        Self::generate("STONE", |u, v| {
            let (bu, bv) = (u & 31, v & 31);
            let base = match (bu, bv) {
                (0, _) | (_, 0) => 224,
                (31, _) | (_, 31) => 72,
                _ => 136,
            };
            base + grain(u, v, 15)
        })
    }

    /// Texel at column `u`, row `v`; both wrap at the texture size.
    #[inline]
    pub fn texel(&self, u: usize, v: usize) -> u8 {
        let u = u & (TEXTURE_SIZE - 1);
        let v = v & (TEXTURE_SIZE - 1);
        self.pixels[(v << TEXTURE_SHIFT) + u]
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// Cheap deterministic per-texel noise in `0..=mask`.
fn grain(u: usize, v: usize, mask: u32) -> u8 {
    let mut h = (u as u32).wrapping_mul(0x9E37_79B9) ^ (v as u32).wrapping_mul(0x85EB_CA6B);
    h ^= h >> 15;
    h = h.wrapping_mul(0x2C1B_3C6D);
    h ^= h >> 12;
    (h & mask) as u8
}

/// Wall textures indexed by `texture_no`.
///
/// * Always holds at least two textures, one per wall orientation.
/// * Slot lookups by trace orientation wrap modulo the slot count.
#[derive(Clone, Debug)]
pub struct TextureAtlas {
    data: Vec<Texture>,
}

impl Default for TextureAtlas {
    fn default() -> Self {
        Self::new(Texture::bricks(), Texture::stone())
    }
}

impl TextureAtlas {
    /// `north_south` paints horizontal-grid-line hits, `east_west` the rest.
    pub fn new(north_south: Texture, east_west: Texture) -> Self {
        Self {
            data: vec![north_south, east_west],
        }
    }

    /// Number of textures stored.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append a texture and return its slot.
    pub fn push(&mut self, tex: Texture) -> Result<TextureId, TextureError> {
        let id = TextureId::try_from(self.data.len()).map_err(|_| TextureError::Full)?;
        self.data.push(tex);
        Ok(id)
    }

    /// Borrow a texture by id, with bounds-checking.
    pub fn texture(&self, id: TextureId) -> Result<&Texture, TextureError> {
        self.data.get(id as usize).ok_or(TextureError::BadId(id))
    }

    /// Texture painted for a trace orientation; never fails.
    #[inline]
    pub fn slot(&self, texture_no: u8) -> &Texture {
        &self.data[texture_no as usize % self.data.len()]
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
