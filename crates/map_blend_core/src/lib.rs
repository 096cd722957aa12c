//! Core map data for map_blend
//!
//! This crate provides the plain data the blend engine reads and writes:
//! - `Bitmap` - A painter-authored color grid with a seeded per-cell random table
//! - `Tileset` / `TilesetRegistry` - Loaded tilesets, addressed by name
//! - `TileLayer` - A grid of resolved tile references
//! - `BlendMap` - The map: size, both bitmaps, hand-authored layers and tilesets
//!
//! Tiles are named `"<tileset>_<index>"` throughout; see [`split_tile_name`].

mod bitmap;
mod color;
mod error;
mod layer;
mod map;
mod tile_name;
mod tileset;

pub use bitmap::{Bitmap, BmpIndex};
pub use color::Rgb;
pub use error::MapError;
pub use layer::TileLayer;
pub use map::BlendMap;
pub use tile_name::{format_tile_name, split_tile_name};
pub use tileset::{TileRef, Tileset, TilesetRegistry};
