//! The update coordinator: runs classification, blending and materialization
//! over a map region, for both full rebuilds and incremental updates.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use map_blend_core::{BlendMap, Rgb, TileLayer};
use tracing::{debug, info};

use crate::blend::blend;
use crate::classify::Classifier;
use crate::grid::{GridStore, Region, TileNameGrid};
use crate::materialize::tile_names_to_layers;
use crate::{
    load_blends, load_rules, parse_blends, parse_rules, BlendSet, BlenderSettings, LoadError,
    RuleSet,
};

/// Notifications for whoever renders or references the output layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlenderEvent {
    /// The output tile layers were created anew; references to older layers are stale.
    LayersRecreated,
    /// Output inside this region (already clamped to the map) may have changed.
    RegionAltered(Region),
}

/// Turns a map's Main and Vegetation bitmaps into named tile layers.
///
/// Output is a pure function of the bitmaps, their seeds, the hand-authored
/// floor layer and the tables, so [`update`](Self::update) over a region gives
/// the same cells there as a full [`recreate`](Self::recreate).
#[derive(Debug)]
pub struct BmpBlender {
    settings: BlenderSettings,
    rules: RuleSet,
    blends: BlendSet,
    floor_colors: HashMap<String, Rgb>,
    /// Rule layers, then blend-only layers, each in first-seen order
    layer_names: Vec<String>,
    grids: GridStore,
    /// One per entry of `layer_names`, same order. Empty until first materialized.
    tile_layers: Vec<TileLayer>,
    /// Set when the tables or settings changed since the last full rebuild
    stale: bool,
    missing_tilesets: BTreeSet<String>,
    events: Vec<BlenderEvent>,
}

impl Default for BmpBlender {
    fn default() -> Self {
        Self::new(BlenderSettings::default())
    }
}

impl BmpBlender {
    /// Create a blender with empty tables
    pub fn new(settings: BlenderSettings) -> Self {
        Self {
            settings,
            rules: RuleSet::default(),
            blends: BlendSet::default(),
            floor_colors: HashMap::new(),
            layer_names: Vec::new(),
            grids: GridStore::default(),
            tile_layers: Vec::new(),
            stale: true,
            missing_tilesets: BTreeSet::new(),
            events: Vec::new(),
        }
    }

    /// Create a blender with the given tables
    pub fn with_tables(settings: BlenderSettings, rules: RuleSet, blends: BlendSet) -> Self {
        let mut blender = Self::new(settings);
        blender.set_tables(rules, blends);
        blender
    }

    /// Create a blender and build every layer for `map`
    pub fn from_map(
        map: &BlendMap,
        settings: BlenderSettings,
        rules: RuleSet,
        blends: BlendSet,
    ) -> Self {
        let mut blender = Self::with_tables(settings, rules, blends);
        blender.recreate(map);
        blender
    }

    // ─── Tables ──────────────────────────────────────────────────────────────

    /// Load the rule and blend files.
    ///
    /// Both files are parsed before anything is replaced; on error the current
    /// tables stay active.
    pub fn read(&mut self, rules_path: &Path, blends_path: &Path) -> Result<(), LoadError> {
        let rules = load_rules(rules_path)?;
        let blends = load_blends(blends_path)?;
        self.set_tables(rules, blends);
        Ok(())
    }

    /// Like [`read`](Self::read), from in-memory text
    pub fn read_from_str(&mut self, rules_text: &str, blends_text: &str) -> Result<(), LoadError> {
        let rules = parse_rules(rules_text)?;
        let blends = parse_blends(blends_text)?;
        self.set_tables(rules, blends);
        Ok(())
    }

    /// Replace both tables. The next update rebuilds every layer.
    pub fn set_tables(&mut self, rules: RuleSet, blends: BlendSet) {
        self.rules = rules;
        self.blends = blends;
        self.reset();
        info!(
            "loaded {} rules and {} blends across {} layers",
            self.rules.len(),
            self.blends.len(),
            self.layer_names.len()
        );
    }

    /// Replace the settings. The next update rebuilds every layer.
    pub fn set_settings(&mut self, settings: BlenderSettings) {
        self.settings = settings;
        self.reset();
    }

    fn reset(&mut self) {
        self.floor_colors = self.rules.floor_tile_colors(&self.settings.floor_layer);

        let mut names: Vec<String> = self.rules.layer_names().to_vec();
        for layer in self.blends.layer_names() {
            if !names.iter().any(|name| name == layer) {
                names.push(layer.to_string());
            }
        }
        self.layer_names = names;

        self.grids = GridStore::default();
        self.tile_layers.clear();
        self.stale = true;
    }

    pub fn settings(&self) -> &BlenderSettings {
        &self.settings
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn blends(&self) -> &BlendSet {
        &self.blends
    }

    // ─── Updates ─────────────────────────────────────────────────────────────

    /// Drop every grid and tile layer and rebuild the whole map
    pub fn recreate(&mut self, map: &BlendMap) {
        self.grids = GridStore::new(
            map.width(),
            map.height(),
            self.layer_names.iter().map(String::as_str),
        );
        self.tile_layers.clear();
        self.missing_tilesets.clear();
        self.stale = false;
        let (width, height) = (
            i32::try_from(map.width()).unwrap_or(i32::MAX),
            i32::try_from(map.height()).unwrap_or(i32::MAX),
        );
        self.run(map, Region::new(0, 0, width, height));
    }

    /// Recompute the inclusive region `(x1, y1)..=(x2, y2)` after its pixels changed.
    ///
    /// Coordinates outside the map are clamped. If the tables, settings or map
    /// size changed since the last rebuild, the whole map is rebuilt instead.
    pub fn update(&mut self, map: &BlendMap, x1: i32, y1: i32, x2: i32, y2: i32) {
        if self.stale || self.grids.width() != map.width() || self.grids.height() != map.height()
        {
            debug!("blend grids are out of date, rebuilding the whole map");
            self.recreate(map);
            return;
        }
        self.run(map, Region::new(x1, y1, x2, y2));
    }

    fn run(&mut self, map: &BlendMap, area: Region) {
        debug!(?area, "blending region");

        Classifier {
            map,
            rules: &self.rules,
            floor_colors: &self.floor_colors,
            settings: &self.settings,
        }
        .run(&mut self.grids, area);

        // A changed pixel can flip the blend one cell outside the region
        let halo = area.expanded(1);
        blend(
            &mut self.grids,
            &self.blends,
            &self.settings.floor_layer,
            halo,
        );

        self.ensure_tile_layers();
        tile_names_to_layers(
            &self.grids,
            &mut self.tile_layers,
            &map.tilesets,
            halo,
            &mut self.missing_tilesets,
        );

        if let Some(altered) = halo.clamped(map.width(), map.height()) {
            self.push_altered(altered);
        }
    }

    /// Queue a `RegionAltered`, folding it into an undrained one at the back
    fn push_altered(&mut self, altered: Region) {
        match self.events.last_mut() {
            Some(BlenderEvent::RegionAltered(pending)) => *pending = pending.union(&altered),
            _ => self.events.push(BlenderEvent::RegionAltered(altered)),
        }
    }

    fn ensure_tile_layers(&mut self) {
        if !self.tile_layers.is_empty() || self.layer_names.is_empty() {
            return;
        }
        let (width, height) = (self.grids.width(), self.grids.height());
        self.tile_layers = self
            .layer_names
            .iter()
            .map(|name| TileLayer::new(name.as_str(), width, height))
            .collect();
        self.events.push(BlenderEvent::LayersRecreated);
    }

    // ─── Output ──────────────────────────────────────────────────────────────

    /// All output layer names: rule layers, then blend-only layers
    pub fn tile_layer_names(&self) -> &[String] {
        &self.layer_names
    }

    pub fn rule_layer_names(&self) -> &[String] {
        self.rules.layer_names()
    }

    pub fn blend_layer_names(&self) -> impl Iterator<Item = &str> {
        self.blends.layer_names()
    }

    /// The materialized layers, in [`tile_layer_names`](Self::tile_layer_names) order
    pub fn tile_layers(&self) -> &[TileLayer] {
        &self.tile_layers
    }

    pub fn tile_layer(&self, name: &str) -> Option<&TileLayer> {
        self.tile_layers.iter().find(|layer| layer.name == name)
    }

    pub fn tile_name_grid(&self, layer: &str) -> Option<&TileNameGrid> {
        self.grids.grid(layer)
    }

    /// Resolved tile name at `(x, y)` on `layer`; empty if none
    pub fn tile_name_at(&self, layer: &str, x: i32, y: i32) -> &str {
        self.grids.tile_name(layer, x, y)
    }

    /// Non-empty blend-layer tile names at `(x, y)`, in blend layer order
    pub fn blend_tiles_at(&self, x: i32, y: i32) -> Vec<&str> {
        self.blends
            .layer_names()
            .map(|layer| self.grids.tile_name(layer, x, y))
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Tilesets (or unparseable tile names) that failed to resolve since the last rebuild
    pub fn missing_tilesets(&self) -> &BTreeSet<String> {
        &self.missing_tilesets
    }

    /// Drain pending notifications.
    ///
    /// Altered regions queued since the last drain are merged into one
    /// bounding rectangle.
    pub fn take_events(&mut self) -> Vec<BlenderEvent> {
        std::mem::take(&mut self.events)
    }
}
