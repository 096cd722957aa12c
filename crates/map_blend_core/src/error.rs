use thiserror::Error;

/// Errors raised while assembling map data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("bitmap has {actual} pixels, expected {expected} for a {width}x{height} bitmap")]
    PixelCount {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("{what} is {got_width}x{got_height}, map is {width}x{height}")]
    SizeMismatch {
        what: String,
        got_width: u32,
        got_height: u32,
        width: u32,
        height: u32,
    },
    #[error("a tileset named '{0}' is already loaded")]
    DuplicateTileset(String),
}
