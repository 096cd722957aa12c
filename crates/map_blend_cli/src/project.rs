//! Project files: which bitmaps, tables and tilesets make up one map.
//!
//! ```toml
//! rules = "Rules.txt"
//! blends = "Blends.txt"
//!
//! [main]
//! path = "main.png"
//! seed = 1
//!
//! [vegetation]
//! path = "vegetation.png"
//! seed = 2
//!
//! [settings]
//! floor_layer = "0_Floor"
//!
//! [[tileset]]
//! name = "floors_exterior_natural_01"
//! columns = 8
//! rows = 16
//! ```

use std::path::{Path, PathBuf};

use map_blend::BlenderSettings;
use map_blend_core::{Bitmap, BlendMap, Rgb, Tileset};
use serde::Deserialize;
use tracing::debug;

use crate::error::CliError;

fn default_tile_size() -> u32 {
    32
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    pub rules: PathBuf,
    pub blends: PathBuf,
    pub main: BitmapConfig,
    pub vegetation: BitmapConfig,
    #[serde(default)]
    pub settings: BlenderSettings,
    #[serde(default)]
    pub tileset: Vec<TilesetConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BitmapConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub seed: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TilesetConfig {
    pub name: String,
    pub columns: u32,
    pub rows: u32,
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    /// Tileset image, kept for consumers of the export
    #[serde(default)]
    pub image: Option<String>,
}

impl ProjectConfig {
    /// Read a project file; relative paths in it resolve against its directory.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: ProjectConfig =
            toml::from_str(&text).map_err(|source| CliError::Project {
                path: path.to_path_buf(),
                source,
            })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.resolve_paths(base);
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        for path in [
            &mut self.rules,
            &mut self.blends,
            &mut self.main.path,
            &mut self.vegetation.path,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Load both bitmaps and register the tilesets
    pub fn build_map(&self) -> Result<BlendMap, CliError> {
        let main = load_bitmap(&self.main)?;
        let vegetation = load_bitmap(&self.vegetation)?;
        let mut map = BlendMap::from_bitmaps(main, vegetation)?;
        for tileset in &self.tileset {
            let mut entry = Tileset::new(
                tileset.name.clone(),
                tileset.tile_size,
                tileset.columns,
                tileset.rows,
            );
            if let Some(image) = &tileset.image {
                entry = entry.with_path(image.clone());
            }
            map.tilesets.insert(entry)?;
        }
        Ok(map)
    }
}

fn load_bitmap(config: &BitmapConfig) -> Result<Bitmap, CliError> {
    let image = image::open(&config.path)
        .map_err(|source| CliError::Image {
            path: config.path.clone(),
            source,
        })?
        .to_rgb8();
    let (width, height) = image.dimensions();
    debug!("loaded {} ({}x{})", config.path.display(), width, height);
    let pixels = image.pixels().map(|p| Rgb::from(p.0)).collect();
    Ok(Bitmap::from_pixels(width, height, pixels, config.seed)?)
}
