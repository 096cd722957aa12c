//! Bitmap-to-tile-layer rule and blend engine.
//!
//! The primary entry point is [`BmpBlender`], which turns the Main and
//! Vegetation bitmaps of a [`BlendMap`](map_blend_core::BlendMap) into named
//! tile layers in three passes:
//!
//! 1. classification - each cell's colors pick tiles on the rule layers
//! 2. blending - neighbor tests on the floor layer pick overlay tiles
//! 3. materialization - tile names resolve against the loaded tilesets
//!
//! Tables come from a line-oriented rule file ([`parse_rules`]) and a
//! block-structured blend file ([`parse_blends`]).
//!
//! # Example
//!
//! ```rust,ignore
//! use map_blend::{BmpBlender, BlenderSettings};
//! use map_blend_core::{BlendMap, BmpIndex, Rgb};
//!
//! let mut map = BlendMap::new(64, 64, 1, 2);
//! let mut blender = BmpBlender::new(BlenderSettings::default());
//! blender.read("Rules.txt".as_ref(), "Blends.txt".as_ref())?;
//! blender.recreate(&map);
//!
//! // Paint, then recompute only the touched cells
//! map.bitmap_mut(BmpIndex::Main).set_pixel(3, 3, Rgb::new(0, 255, 0));
//! blender.update(&map, 3, 3, 3, 3);
//! ```

mod blend;
mod blender;
mod blends_file;
mod classify;
mod error;
mod grid;
mod materialize;
mod rules_file;
mod types;

pub use blender::{BlenderEvent, BmpBlender};
pub use blends_file::{load_blends, parse_blends};
pub use error::LoadError;
pub use grid::{Region, TileNameGrid};
pub use rules_file::{load_rules, parse_rules};
pub use types::{
    Blend, BlendSet, BlenderSettings, Direction, Rule, RuleSet, DEFAULT_FLOOR_LAYER,
};

// Re-export map_blend_core
pub use map_blend_core;
