//! Per-layer grids of resolved tile names

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// An inclusive rectangle of map cells, `(x1, y1)..=(x2, y2)`.
///
/// Corners may lie outside the map; every pass clamps before touching cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Region {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Grow by `n` cells on every side
    pub fn expanded(&self, n: i32) -> Self {
        Self::new(
            self.x1.saturating_sub(n),
            self.y1.saturating_sub(n),
            self.x2.saturating_add(n),
            self.y2.saturating_add(n),
        )
    }

    /// Intersect with a `width x height` map. `None` if nothing is left.
    pub fn clamped(&self, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let clamped = Self::new(
            self.x1.max(0),
            self.y1.max(0),
            self.x2.min(i32::try_from(width).unwrap_or(i32::MAX) - 1),
            self.y2.min(i32::try_from(height).unwrap_or(i32::MAX) - 1),
        );
        (clamped.x1 <= clamped.x2 && clamped.y1 <= clamped.y2).then_some(clamped)
    }

    /// Smallest region covering both
    pub fn union(&self, other: &Region) -> Self {
        Self::new(
            self.x1.min(other.x1),
            self.y1.min(other.y1),
            self.x2.max(other.x2),
            self.y2.max(other.y2),
        )
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    /// Every cell, row by row
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> {
        let Self { x1, y1, x2, y2 } = *self;
        (y1..=y2).flat_map(move |y| (x1..=x2).map(move |x| (x, y)))
    }
}

/// A `width x height` grid of tile names. The empty string is "no tile".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileNameGrid {
    width: u32,
    height: u32,
    cells: Vec<String>,
}

impl TileNameGrid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![String::new(); width as usize * height as usize],
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Tile name at `(x, y)`; empty outside the grid
    pub fn get(&self, x: i32, y: i32) -> &str {
        self.index(x, y).map_or("", |idx| self.cells[idx].as_str())
    }

    pub fn set(&mut self, x: i32, y: i32, name: &str) {
        if let Some(idx) = self.index(x, y) {
            let cell = &mut self.cells[idx];
            cell.clear();
            cell.push_str(name);
        }
    }

    pub fn clear(&mut self, x: i32, y: i32) {
        if let Some(idx) = self.index(x, y) {
            self.cells[idx].clear();
        }
    }

    /// Rows of tile names, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.cells.chunks(self.width.max(1) as usize)
    }
}

/// One [`TileNameGrid`] per output layer, all sized to the map.
#[derive(Debug, Clone, Default)]
pub(crate) struct GridStore {
    width: u32,
    height: u32,
    grids: HashMap<String, TileNameGrid>,
}

impl GridStore {
    pub fn new<'a>(width: u32, height: u32, layers: impl IntoIterator<Item = &'a str>) -> Self {
        let grids = layers
            .into_iter()
            .map(|name| (name.to_string(), TileNameGrid::new(width, height)))
            .collect();
        Self {
            width,
            height,
            grids,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn grid(&self, layer: &str) -> Option<&TileNameGrid> {
        self.grids.get(layer)
    }

    /// Tile name at `(x, y)` on `layer`; empty for unknown layers or cells
    pub fn tile_name(&self, layer: &str, x: i32, y: i32) -> &str {
        self.grids.get(layer).map_or("", |grid| grid.get(x, y))
    }

    pub fn set(&mut self, layer: &str, x: i32, y: i32, name: &str) {
        if let Some(grid) = self.grids.get_mut(layer) {
            grid.set(x, y, name);
        }
    }

    pub fn clear(&mut self, layer: &str, x: i32, y: i32) {
        if let Some(grid) = self.grids.get_mut(layer) {
            grid.clear(x, y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_clamp_to_map() {
        let region = Region::new(-5, -5, 14, 14);
        assert_eq!(region.clamped(10, 8), Some(Region::new(0, 0, 9, 7)));
    }

    #[test]
    fn region_clamp_outside_or_empty_map() {
        assert_eq!(Region::new(20, 20, 30, 30).clamped(10, 10), None);
        assert_eq!(Region::new(0, 0, 5, 5).clamped(0, 10), None);
        assert_eq!(Region::new(5, 0, 4, 3).clamped(10, 10), None);
    }

    #[test]
    fn region_clamp_to_map_wider_than_i32() {
        let region = Region::new(0, 0, i32::MAX, 5);
        assert_eq!(
            region.clamped(u32::MAX, 10),
            Some(Region::new(0, 0, i32::MAX - 1, 5))
        );
    }

    #[test]
    fn region_union_is_bounding_box() {
        let a = Region::new(1, 4, 2, 5);
        let b = Region::new(3, 0, 6, 1);
        assert_eq!(a.union(&b), Region::new(1, 0, 6, 5));
        assert_eq!(a.union(&a), a);
    }

    #[test]
    fn region_expand_and_cells() {
        let region = Region::new(3, 3, 3, 3).expanded(1);
        assert_eq!(region, Region::new(2, 2, 4, 4));
        assert_eq!(region.cells().count(), 9);
        assert_eq!(region.cells().next(), Some((2, 2)));
        assert!(region.contains(4, 2));
        assert!(!region.contains(5, 2));
    }

    #[test]
    fn grid_set_get_clear() {
        let mut grid = TileNameGrid::new(3, 2);
        grid.set(2, 1, "grass_0");
        assert_eq!(grid.get(2, 1), "grass_0");
        grid.set(2, 1, "dirt_1");
        assert_eq!(grid.get(2, 1), "dirt_1");
        grid.clear(2, 1);
        assert_eq!(grid.get(2, 1), "");
    }

    #[test]
    fn grid_out_of_bounds_is_empty() {
        let mut grid = TileNameGrid::new(2, 2);
        grid.set(-1, 0, "grass_0");
        grid.set(0, 2, "grass_0");
        assert_eq!(grid.get(-1, 0), "");
        assert_eq!(grid.get(0, 2), "");
        assert!(grid.rows().flatten().all(String::is_empty));
    }

    #[test]
    fn store_ignores_unknown_layers() {
        let mut store = GridStore::new(2, 2, ["0_Floor"]);
        store.set("0_Floor", 1, 1, "grass_0");
        store.set("0_Missing", 1, 1, "grass_0");
        assert_eq!(store.tile_name("0_Floor", 1, 1), "grass_0");
        assert_eq!(store.tile_name("0_Missing", 1, 1), "");
        assert!(store.grid("0_Missing").is_none());
    }
}
