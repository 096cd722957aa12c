//! Tileset configuration and the registry of loaded tilesets

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{format_tile_name, split_tile_name, MapError};

/// A resolved tile: one index inside one loaded tileset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRef {
    pub tileset_id: Uuid,
    pub index: u32,
}

/// Tileset configuration - a single image cut into a `columns x rows` grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tileset {
    pub id: Uuid,
    /// Name used as the prefix of tile names (`"<name>_<index>"`)
    pub name: String,
    /// Tile size in pixels (assumes square tiles)
    pub tile_size: u32,
    pub columns: u32,
    pub rows: u32,
    /// Path to the image file, if the tileset has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Tileset {
    /// Create a new tileset without an image
    pub fn new(name: impl Into<String>, tile_size: u32, columns: u32, rows: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            tile_size,
            columns,
            rows,
            path: None,
        }
    }

    /// Set the image path for this tileset
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Total number of tiles in this tileset
    pub fn tile_count(&self) -> u32 {
        self.columns * self.rows
    }

    /// Get the tile at `index`, or `None` if the index is out of range
    pub fn tile(&self, index: u32) -> Option<TileRef> {
        (index < self.tile_count()).then_some(TileRef {
            tileset_id: self.id,
            index,
        })
    }

    /// Convert a tile index to (column, row) within the image
    pub fn index_to_grid(&self, index: u32) -> Option<(u32, u32)> {
        if index >= self.tile_count() {
            return None;
        }
        Some((index % self.columns, index / self.columns))
    }
}

/// The set of currently loaded tilesets, addressed by name
#[derive(Debug, Clone, Default)]
pub struct TilesetRegistry {
    tilesets: Vec<Tileset>,
    by_name: HashMap<String, usize>,
}

impl TilesetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a tileset. Names must be unique.
    pub fn insert(&mut self, tileset: Tileset) -> Result<Uuid, MapError> {
        if self.by_name.contains_key(&tileset.name) {
            return Err(MapError::DuplicateTileset(tileset.name));
        }
        let id = tileset.id;
        self.by_name.insert(tileset.name.clone(), self.tilesets.len());
        self.tilesets.push(tileset);
        Ok(id)
    }

    /// Unload a tileset by name
    pub fn remove(&mut self, name: &str) -> Option<Tileset> {
        let pos = self.by_name.remove(name)?;
        let removed = self.tilesets.remove(pos);
        for idx in self.by_name.values_mut() {
            if *idx > pos {
                *idx -= 1;
            }
        }
        Some(removed)
    }

    pub fn get(&self, name: &str) -> Option<&Tileset> {
        self.by_name.get(name).map(|&idx| &self.tilesets[idx])
    }

    pub fn get_by_id(&self, id: Uuid) -> Option<&Tileset> {
        self.tilesets.iter().find(|ts| ts.id == id)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tileset> {
        self.tilesets.iter()
    }

    pub fn len(&self) -> usize {
        self.tilesets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tilesets.is_empty()
    }

    /// Resolve a `"<tileset>_<index>"` name against the loaded tilesets
    pub fn resolve(&self, tile_name: &str) -> Option<TileRef> {
        let (tileset, index) = split_tile_name(tile_name)?;
        self.get(tileset)?.tile(index)
    }

    /// The canonical name of a resolved tile, if its tileset is still loaded
    pub fn tile_name(&self, tile: TileRef) -> Option<String> {
        self.get_by_id(tile.tileset_id)
            .map(|ts| format_tile_name(&ts.name, tile.index))
    }
}
