//! JSON export of the generated tile layers.

use map_blend::BmpBlender;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RenderOutput {
    pub width: u32,
    pub height: u32,
    pub layers: Vec<LayerOutput>,
    /// Tilesets referenced by the tables but not loaded
    pub missing_tilesets: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct LayerOutput {
    pub name: String,
    /// Cells that resolved to a tile of a loaded tileset
    pub resolved: usize,
    /// Row-major tile names, empty for no tile
    pub rows: Vec<Vec<String>>,
}

impl RenderOutput {
    pub fn from_blender(blender: &BmpBlender, width: u32, height: u32) -> Self {
        let layers = blender
            .tile_layer_names()
            .iter()
            .filter_map(|name| {
                let grid = blender.tile_name_grid(name)?;
                let resolved = blender
                    .tile_layer(name)
                    .map_or(0, |layer| layer.tiles().iter().flatten().count());
                Some(LayerOutput {
                    name: name.clone(),
                    resolved,
                    rows: grid.rows().map(<[String]>::to_vec).collect(),
                })
            })
            .collect();
        Self {
            width,
            height,
            layers,
            missing_tilesets: blender.missing_tilesets().iter().cloned().collect(),
        }
    }
}
