//! Edge blending: neighbor-conditioned overlays on the blend layers.

use crate::grid::{GridStore, Region};
use crate::{Blend, BlendSet};

/// Recompute every blend layer inside `area`, clamped to the grids.
///
/// Each cell is tested against the resolved tile names of `floor_layer`.
/// Cells with no floor tile get no overlay on any blend layer.
pub(crate) fn blend(grids: &mut GridStore, blends: &BlendSet, floor_layer: &str, area: Region) {
    let Some(area) = area.clamped(grids.width(), grids.height()) else {
        return;
    };

    for (x, y) in area.cells() {
        let tile_name = grids.tile_name(floor_layer, x, y).to_string();
        for layer in blends.layer_names() {
            if tile_name.is_empty() {
                grids.clear(layer, x, y);
                continue;
            }
            let overlay = blend_rule_for(grids, blends, floor_layer, x, y, &tile_name, layer)
                .map(|blend| blend.blend_tile.clone())
                .unwrap_or_default();
            grids.set(layer, x, y, &overlay);
        }
    }
}

/// The blend that decides `layer` at `(x, y)` for a cell holding `tile_name`.
///
/// Blends are tried in declaration order and the last one that matches wins,
/// so a general blend can be refined by a more specific one further down.
pub(crate) fn blend_rule_for<'b>(
    grids: &GridStore,
    blends: &'b BlendSet,
    floor_layer: &str,
    x: i32,
    y: i32,
    tile_name: &str,
    layer: &str,
) -> Option<&'b Blend> {
    let mut last_match = None;
    for blend in blends.blends_for_layer(layer) {
        if blend.target_layer != layer {
            continue;
        }
        // A tile never blends with itself
        if tile_name == blend.main_tile || blend.exclusions.contains(tile_name) {
            continue;
        }
        let neighbors_match = blend
            .direction
            .offsets()
            .iter()
            .all(|(dx, dy)| {
                // Off-map and unresolved neighbors are empty and match nothing
                let neighbor = grids.tile_name(floor_layer, x + dx, y + dy);
                !neighbor.is_empty() && neighbor == blend.main_tile
            });
        if neighbors_match {
            last_match = Some(blend);
        }
    }
    last_match
}
