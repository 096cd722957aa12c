//! The map the blend engine reads from

use crate::{Bitmap, BmpIndex, MapError, Rgb, TileLayer, TilesetRegistry};

/// A map: its size, both bitmaps, hand-authored tile layers and the loaded tilesets.
///
/// The blend engine only ever reads from a `BlendMap`. Its own output layers
/// live in the engine, not here.
#[derive(Debug, Clone)]
pub struct BlendMap {
    width: u32,
    height: u32,
    bitmaps: [Bitmap; 2],
    /// Tile layers painted by hand, e.g. a legacy `0_Floor` layer
    layers: Vec<TileLayer>,
    pub tilesets: TilesetRegistry,
}

impl BlendMap {
    /// Create a map with two all-black bitmaps
    pub fn new(width: u32, height: u32, main_seed: u64, vegetation_seed: u64) -> Self {
        Self {
            width,
            height,
            bitmaps: [
                Bitmap::new(width, height, main_seed),
                Bitmap::new(width, height, vegetation_seed),
            ],
            layers: Vec::new(),
            tilesets: TilesetRegistry::new(),
        }
    }

    /// Create a map from existing bitmaps. Both must have the same size.
    pub fn from_bitmaps(main: Bitmap, vegetation: Bitmap) -> Result<Self, MapError> {
        let (width, height) = (main.width(), main.height());
        if vegetation.width() != width || vegetation.height() != height {
            return Err(MapError::SizeMismatch {
                what: "vegetation bitmap".to_string(),
                got_width: vegetation.width(),
                got_height: vegetation.height(),
                width,
                height,
            });
        }
        Ok(Self {
            width,
            height,
            bitmaps: [main, vegetation],
            layers: Vec::new(),
            tilesets: TilesetRegistry::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    pub fn bitmap(&self, index: BmpIndex) -> &Bitmap {
        &self.bitmaps[index.as_usize()]
    }

    pub fn bitmap_mut(&mut self, index: BmpIndex) -> &mut Bitmap {
        &mut self.bitmaps[index.as_usize()]
    }

    pub fn pixel(&self, index: BmpIndex, x: i32, y: i32) -> Rgb {
        self.bitmap(index).pixel(x, y)
    }

    pub fn rand(&self, index: BmpIndex, x: i32, y: i32) -> u32 {
        self.bitmap(index).rand(x, y)
    }

    /// Resize both bitmaps and every hand-authored layer.
    ///
    /// Seeds are kept, so cells that existed before keep their random numbers
    /// only if the width is unchanged.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        for bitmap in &mut self.bitmaps {
            bitmap.resize(width, height);
        }
        for layer in &mut self.layers {
            layer.resize(width, height);
        }
    }

    /// Add a hand-authored tile layer. It must match the map size.
    pub fn add_layer(&mut self, layer: TileLayer) -> Result<usize, MapError> {
        if layer.width() != self.width || layer.height() != self.height {
            return Err(MapError::SizeMismatch {
                what: format!("layer '{}'", layer.name),
                got_width: layer.width(),
                got_height: layer.height(),
                width: self.width,
                height: self.height,
            });
        }
        self.layers.push(layer);
        Ok(self.layers.len() - 1)
    }

    pub fn layers(&self) -> &[TileLayer] {
        &self.layers
    }

    pub fn layer(&self, name: &str) -> Option<&TileLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn layer_mut(&mut self, name: &str) -> Option<&mut TileLayer> {
        self.layers.iter_mut().find(|l| l.name == name)
    }

    /// Name of the hand-authored tile at `(x, y)` in `layer`, if any
    pub fn tile_name_at(&self, layer: &str, x: i32, y: i32) -> Option<String> {
        let tile = self.layer(layer)?.get(x, y)?;
        self.tilesets.tile_name(tile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tileset;

    #[test]
    fn test_new_map() {
        let map = BlendMap::new(6, 4, 1, 2);
        assert_eq!(map.width(), 6);
        assert_eq!(map.height(), 4);
        assert_eq!(map.bitmap(BmpIndex::Main).seed(), 1);
        assert_eq!(map.bitmap(BmpIndex::Vegetation).seed(), 2);
        assert!(map.contains(5, 3));
        assert!(!map.contains(6, 3));
    }

    #[test]
    fn test_from_bitmaps_size_mismatch() {
        let result = BlendMap::from_bitmaps(Bitmap::new(4, 4, 0), Bitmap::new(4, 5, 0));
        assert!(matches!(result, Err(MapError::SizeMismatch { .. })));
    }

    #[test]
    fn test_add_layer_checks_size() {
        let mut map = BlendMap::new(4, 4, 0, 0);
        assert!(map.add_layer(TileLayer::new("0_Floor", 4, 4)).is_ok());
        assert!(map.add_layer(TileLayer::new("1_Floor", 3, 4)).is_err());
        assert_eq!(map.layers().len(), 1);
    }

    #[test]
    fn test_resize_map() {
        let mut map = BlendMap::new(4, 4, 3, 4);
        map.add_layer(TileLayer::new("0_Floor", 4, 4)).unwrap();
        map.bitmap_mut(BmpIndex::Main).set_pixel(3, 3, Rgb::new(0, 255, 0));

        map.resize(6, 2);
        assert_eq!((map.width(), map.height()), (6, 2));
        assert_eq!(map.bitmap(BmpIndex::Vegetation).width(), 6);
        assert_eq!(map.bitmap(BmpIndex::Main).seed(), 3);
        assert_eq!(map.layer("0_Floor").unwrap().height(), 2);
        assert!(map.pixel(BmpIndex::Main, 3, 3).is_black());
        assert!(map.add_layer(TileLayer::new("1_Floor", 6, 2)).is_ok());
    }

    #[test]
    fn test_tile_name_at() {
        let mut map = BlendMap::new(4, 4, 0, 0);
        map.tilesets
            .insert(Tileset::new("floors_exterior_natural_01", 32, 8, 8))
            .unwrap();
        map.add_layer(TileLayer::new("0_Floor", 4, 4)).unwrap();

        let tile = map.tilesets.resolve("floors_exterior_natural_01_2").unwrap();
        map.layer_mut("0_Floor").unwrap().set(1, 1, Some(tile));

        assert_eq!(
            map.tile_name_at("0_Floor", 1, 1).as_deref(),
            Some("floors_exterior_natural_01_2")
        );
        assert_eq!(map.tile_name_at("0_Floor", 0, 0), None);
        assert_eq!(map.tile_name_at("1_Floor", 1, 1), None);
    }
}
