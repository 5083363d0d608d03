//! Tile types and the static tile grid.
//!
//! The grid is built once when the world loads and never mutated after
//! that. Lookups take signed indices: anything outside the grid reads as
//! `Tile::Empty`, so the hard world-edge clamp in the resolver is what
//! actually keeps the player inside.

use super::geom::Rect;

/// Pixel slack used when converting an edge to a tile index, so that a
/// rectangle whose edge sits on a boundary does not claim the neighbouring
/// tile. Applied inward on both edges: `(col + 1) * tile_size` may round a
/// hair below the true boundary when the tile size is not exact in f32.
pub const EDGE_EPS: f32 = 1e-3;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Empty,
    Solid,
}

impl Tile {
    pub fn is_solid(self) -> bool {
        matches!(self, Tile::Solid)
    }
}

#[derive(Clone, Debug)]
pub struct TileGrid {
    cols: usize,
    rows: usize,
    tile_size: f32,
    cells: Vec<Tile>,
}

impl TileGrid {
    /// An all-empty grid.
    pub fn new(cols: usize, rows: usize, tile_size: f32) -> Self {
        TileGrid {
            cols,
            rows,
            tile_size,
            cells: vec![Tile::Empty; cols * rows],
        }
    }

    /// Build from text rows: `#` is solid, anything else empty.
    /// Short rows are padded with empty tiles.
    pub fn from_rows(rows: &[&str], tile_size: f32) -> Self {
        let cols = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut grid = TileGrid::new(cols, rows.len(), tile_size);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    grid.set(x, y, Tile::Solid);
                }
            }
        }
        grid
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn world_width(&self) -> f32 {
        self.cols as f32 * self.tile_size
    }

    pub fn world_height(&self) -> f32 {
        self.rows as f32 * self.tile_size
    }

    /// Bounds-checked lookup. Out-of-grid reads as empty.
    #[inline]
    pub fn get(&self, col: i32, row: i32) -> Tile {
        if col < 0 || row < 0 || col as usize >= self.cols || row as usize >= self.rows {
            return Tile::Empty;
        }
        self.cells[row as usize * self.cols + col as usize]
    }

    #[inline]
    pub fn is_solid(&self, col: i32, row: i32) -> bool {
        self.get(col, row).is_solid()
    }

    pub fn set(&mut self, col: usize, row: usize, tile: Tile) {
        if col < self.cols && row < self.rows {
            self.cells[row * self.cols + col] = tile;
        }
    }

    /// Tile index containing a world coordinate.
    #[inline]
    pub fn index_of(&self, coord: f32) -> i32 {
        (coord / self.tile_size).floor() as i32
    }

    /// Inclusive tile range covered by the half-open span `[start, start + len)`.
    pub fn span(&self, start: f32, len: f32) -> (i32, i32) {
        let first = self.index_of((start + EDGE_EPS).min(start + len * 0.5));
        let last = self.index_of(start + len - EDGE_EPS).max(first);
        (first, last)
    }

    /// Does the rectangle cover any solid tile?
    pub fn overlaps_solid(&self, rect: &Rect) -> bool {
        let (c0, c1) = self.span(rect.x, rect.w);
        let (r0, r1) = self.span(rect.y, rect.h);
        (r0..=r1).any(|row| (c0..=c1).any(|col| self.is_solid(col, row)))
    }
}
