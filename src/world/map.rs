use thiserror::Error;

/// Width of the built-in map, in tiles.
pub const MAP_X: usize = 32;
/// Height of the built-in map, in tiles.
pub const MAP_Y: usize = 32;

/// Largest side the fixed-point engine can address without its `i16`
/// displacements overflowing (64 tiles × 256 sub-tile units).
pub const MAX_MAP_DIM: usize = 64;

/// Glyph for a wall cell in ASCII maps.
pub const WALL_GLYPH: char = '#';

/// Built-in level. The first text row is the northernmost (`y = MAP_Y - 1`).
const BUILTIN: &str = "\
################################
#..............................#
#..............................#
#...................#..........#
#...#..#..#.........#..........#
#...................#..........#
#...................#..........#
#...#..#..#.........#..........#
#...................####.####..#
#...................#..........#
#...#..#..#.........#..........#
#...................#..........#
#...................#..........#
#..............................#
#..............................#
#..............................#
#...............#####..#####...#
#...............#..........#...#
#...............#..........#...#
#...............#..........#...#
#...#...........#..........#...#
#....#.....................#...#
#.....#.........#..........#...#
#......#........#..........#...#
#.......#.......#..........#...#
#........#......#..........#...#
#...............############...#
#..............................#
#..............................#
#..............................#
#..............................#
################################
";

/// Things that can go wrong while building a map.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    /// Either side is zero or larger than [`MAX_MAP_DIM`].
    #[error("map size {width}x{height} outside 1..={MAX_MAP_DIM}")]
    BadSize { width: usize, height: usize },

    /// ASCII row whose length differs from the first row.
    #[error("map row {row} has {len} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        len: usize,
        expected: usize,
    },

    /// ASCII glyph that is neither a wall nor an empty cell.
    #[error("unknown map glyph `{glyph}` at row {row}, column {column}")]
    BadGlyph {
        glyph: char,
        row: usize,
        column: usize,
    },

    /// Cell address outside the map when editing.
    #[error("tile ({x}, {y}) outside the map")]
    OutOfBounds { x: usize, y: usize },

    /// A pose was placed inside a wall tile.
    #[error("tile ({x}, {y}) is a wall")]
    Blocked { x: i32, y: i32 },
}

/// Binary wall/empty grid stored as a bitmap, one bit per cell.
///
/// Bits are MSB-first inside each byte and every row is padded to a whole
/// byte, so cell `(x, y)` lives at bit `7 - (x & 7)` of byte
/// `y * stride + x / 8`.
///
/// Everything outside `[0, width) × [0, height)` reads as a wall, which is
/// what guarantees every ray terminates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    width: usize,
    height: usize,
    stride: usize,
    bits: Vec<u8>,
}

impl TileMap {
    // ---------------------------------------------------------------------
    // Constructors
    // ---------------------------------------------------------------------

    /// All-empty map; only the implicit fence bounds it.
    pub fn empty(width: usize, height: usize) -> Result<Self, MapError> {
        if !(1..=MAX_MAP_DIM).contains(&width) || !(1..=MAX_MAP_DIM).contains(&height) {
            return Err(MapError::BadSize { width, height });
        }
        let stride = width.div_ceil(8);
        Ok(Self {
            width,
            height,
            stride,
            bits: vec![0; stride * height],
        })
    }

    /// Empty room whose outermost ring of tiles is wall.
    pub fn walled(width: usize, height: usize) -> Result<Self, MapError> {
        let mut map = Self::empty(width, height)?;
        for x in 0..width {
            map.set_wall(x, 0, true)?;
            map.set_wall(x, height - 1, true)?;
        }
        for y in 0..height {
            map.set_wall(0, y, true)?;
            map.set_wall(width - 1, y, true)?;
        }
        Ok(map)
    }

    /// Parse an ASCII drawing: `#` is a wall, `.` or space is empty.
    ///
    /// The first non-blank line is the northern edge (highest `y`), so the
    /// text reads like a top-down minimap with north up.
    pub fn from_ascii(text: &str) -> Result<Self, MapError> {
        let rows: Vec<&str> = text
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.trim().is_empty())
            .collect();

        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut map = Self::empty(width, rows.len())?;
        let top = rows.len() - 1;

        for (row, line) in rows.iter().enumerate() {
            let len = line.chars().count();
            if len != width {
                return Err(MapError::RaggedRow {
                    row,
                    len,
                    expected: width,
                });
            }
            for (column, glyph) in line.chars().enumerate() {
                let wall = match glyph {
                    WALL_GLYPH => true,
                    '.' | ' ' => false,
                    _ => return Err(MapError::BadGlyph { glyph, row, column }),
                };
                map.set_wall(column, top - row, wall)?;
            }
        }
        Ok(map)
    }

    /// The 32×32 level shipped with the viewer.
    pub fn builtin() -> Self {
        Self::from_ascii(BUILTIN).expect("built-in map is well formed")
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Wall-occupancy predicate over the whole `i32` plane.
    #[inline]
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return true;
        }
        let (x, y) = (x as usize, y as usize);
        self.bits[y * self.stride + (x >> 3)] & (0x80 >> (x & 7)) != 0
    }

    /// Number of wall cells inside the map (the fence is not counted).
    pub fn wall_count(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    pub fn set_wall(&mut self, x: usize, y: usize, wall: bool) -> Result<(), MapError> {
        if x >= self.width || y >= self.height {
            return Err(MapError::OutOfBounds { x, y });
        }
        let byte = &mut self.bits[y * self.stride + (x >> 3)];
        let mask = 0x80 >> (x & 7);
        if wall {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
        Ok(())
    }

    /// Render back to the ASCII form accepted by [`TileMap::from_ascii`].
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in (0..self.height as i32).rev() {
            for x in 0..self.width as i32 {
                out.push(if self.is_wall(x, y) { WALL_GLYPH } else { '.' });
            }
            out.push('\n');
        }
        out
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
