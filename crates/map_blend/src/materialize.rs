//! Materialization: tile names to renderable tile layers.

use std::collections::BTreeSet;

use map_blend_core::{split_tile_name, TileLayer, TilesetRegistry};
use tracing::warn;

use crate::grid::{GridStore, Region};

/// Write the tile-name grids inside `area` into `layers`.
///
/// `layers` holds one layer per grid, matched by name. Names whose tileset
/// is not loaded leave the cell empty and are recorded in `missing`.
pub(crate) fn tile_names_to_layers(
    grids: &GridStore,
    layers: &mut [TileLayer],
    tilesets: &TilesetRegistry,
    area: Region,
    missing: &mut BTreeSet<String>,
) {
    let Some(area) = area.clamped(grids.width(), grids.height()) else {
        return;
    };

    for layer in layers.iter_mut() {
        let Some(grid) = grids.grid(&layer.name) else {
            continue;
        };
        for (x, y) in area.cells() {
            let name = grid.get(x, y);
            if name.is_empty() {
                layer.clear(x, y);
                continue;
            }
            let tile = tilesets.resolve(name);
            if tile.is_none() {
                note_missing(name, tilesets, missing);
            }
            layer.set(x, y, tile);
        }
    }
}

/// Record an unresolved tile name by the tileset it refers to
fn note_missing(name: &str, tilesets: &TilesetRegistry, missing: &mut BTreeSet<String>) {
    let key = match split_tile_name(name) {
        Some((tileset, _)) if !tilesets.contains(tileset) => tileset,
        // Loaded tileset with an out-of-range index, or not a tile name at all
        _ => name,
    };
    if !missing.contains(key) {
        warn!("tile '{}' does not resolve against the loaded tilesets", name);
        missing.insert(key.to_string());
    }
}
