//! Canonical `"<tileset>_<index>"` tile names

/// Split a tile name into its tileset name and tile index.
///
/// The tileset name is everything before the last underscore, so tilesets
/// may themselves contain underscores (`"blends_natural_01_16"` is tile 16 of
/// `"blends_natural_01"`). Returns `None` for names without a numeric suffix.
pub fn split_tile_name(name: &str) -> Option<(&str, u32)> {
    let (tileset, index) = name.rsplit_once('_')?;
    if tileset.is_empty() || index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    index.parse().ok().map(|index| (tileset, index))
}

/// Build the canonical name for tile `index` of `tileset`
pub fn format_tile_name(tileset: &str, index: u32) -> String {
    format!("{tileset}_{index}")
}
