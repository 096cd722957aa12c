//! Tile layers

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::TileRef;

/// A named `width x height` grid of resolved tiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    pub id: Uuid,
    pub name: String,
    pub visible: bool,
    width: u32,
    height: u32,
    /// Row-major tiles - None means empty
    tiles: Vec<Option<TileRef>>,
}

impl TileLayer {
    /// Create a new empty tile layer
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            visible: true,
            width,
            height,
            tiles: vec![None; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tiles(&self) -> &[Option<TileRef>] {
        &self.tiles
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Tile at `(x, y)`; out-of-bounds cells are empty
    pub fn get(&self, x: i32, y: i32) -> Option<TileRef> {
        self.index(x, y).and_then(|idx| self.tiles[idx])
    }

    /// Set the tile at `(x, y)`. Returns `false` if the cell is out of bounds.
    pub fn set(&mut self, x: i32, y: i32, tile: Option<TileRef>) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.tiles[idx] = tile;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self, x: i32, y: i32) -> bool {
        self.set(x, y, None)
    }

    pub fn clear_all(&mut self) {
        self.tiles.fill(None);
    }

    /// Resize, keeping tiles in the overlapping area
    pub fn resize(&mut self, width: u32, height: u32) {
        let mut tiles = vec![None; width as usize * height as usize];
        for y in 0..height.min(self.height) {
            for x in 0..width.min(self.width) {
                let (x, y) = (x as usize, y as usize);
                tiles[y * width as usize + x] = self.tiles[y * self.width as usize + x];
            }
        }
        self.width = width;
        self.height = height;
        self.tiles = tiles;
    }

    /// Check if every cell is empty
    pub fn is_empty(&self) -> bool {
        self.tiles.iter().all(Option::is_none)
    }
}
