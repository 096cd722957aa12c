//! Data types for the rule and blend tables.
//!
//! A [`RuleSet`] maps bitmap colors to tile names; a [`BlendSet`] refines
//! cell boundaries from the resolved tile names of neighboring cells. Both
//! are immutable once built and are only ever replaced wholesale.

use std::collections::{HashMap, HashSet};

use map_blend_core::{BmpIndex, Rgb};
use serde::{Deserialize, Serialize};

/// Default reference layer for blending and the legacy floor override
pub const DEFAULT_FLOOR_LAYER: &str = "0_Floor";

// ─── Settings ────────────────────────────────────────────────────────────────

/// Engine settings shared by every pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlenderSettings {
    /// Layer whose resolved tile names drive blending. Also the hand-authored
    /// layer consulted by the legacy floor override.
    pub floor_layer: String,
    /// Treat a hand-painted floor tile on an unpainted cell as if its rule's
    /// color had been painted.
    pub legacy_floor_override: bool,
}

impl Default for BlenderSettings {
    fn default() -> Self {
        Self {
            floor_layer: DEFAULT_FLOOR_LAYER.to_string(),
            legacy_floor_override: true,
        }
    }
}

// ─── Rule ────────────────────────────────────────────────────────────────────

/// Maps one color in one bitmap to a random choice of tiles on a target layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub bitmap: BmpIndex,
    pub color: Rgb,
    /// Never empty. An empty string is the "no tile" choice.
    pub tile_choices: Vec<String>,
    pub target_layer: String,
    /// Required Main color for Vegetation rules. Black means unconditional.
    pub condition: Rgb,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Rule {
    pub fn new(
        bitmap: BmpIndex,
        color: Rgb,
        tile_choices: Vec<String>,
        target_layer: impl Into<String>,
    ) -> Self {
        Self {
            bitmap,
            color,
            tile_choices,
            target_layer: target_layer.into(),
            condition: Rgb::BLACK,
            label: None,
        }
    }

    pub fn with_condition(mut self, condition: Rgb) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Pick a tile using a cell's random number
    pub fn choose(&self, rand: u32) -> &str {
        if self.tile_choices.is_empty() {
            return "";
        }
        &self.tile_choices[rand as usize % self.tile_choices.len()]
    }

    /// Whether a Vegetation rule applies on top of this Main color
    pub fn condition_allows(&self, main: Rgb) -> bool {
        self.condition == main || self.condition.is_black()
    }
}

/// Ordered rules, indexed by color.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    /// Indices into `rules`, declaration order preserved per color
    by_color: HashMap<Rgb, Vec<usize>>,
    /// Distinct target layers, first-seen order
    layers: Vec<String>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        let mut by_color: HashMap<Rgb, Vec<usize>> = HashMap::new();
        let mut layers: Vec<String> = Vec::new();
        for (idx, rule) in rules.iter().enumerate() {
            by_color.entry(rule.color).or_default().push(idx);
            if !layers.contains(&rule.target_layer) {
                layers.push(rule.target_layer.clone());
            }
        }
        Self {
            rules,
            by_color,
            layers,
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The rule layers, in first-seen order
    pub fn layer_names(&self) -> &[String] {
        &self.layers
    }

    /// Rules painted with `color`, in declaration order
    pub fn rules_for_color(&self, color: Rgb) -> impl Iterator<Item = &Rule> {
        self.by_color
            .get(&color)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.rules[idx])
    }

    /// Map each tile name a Main rule can place on `floor_layer` to that rule's color.
    ///
    /// When several rules list the same tile, the first declared one wins.
    pub fn floor_tile_colors(&self, floor_layer: &str) -> HashMap<String, Rgb> {
        let mut colors = HashMap::new();
        for rule in &self.rules {
            if rule.bitmap != BmpIndex::Main || rule.target_layer != floor_layer {
                continue;
            }
            for choice in rule.tile_choices.iter().filter(|c| !c.is_empty()) {
                colors.entry(choice.clone()).or_insert(rule.color);
            }
        }
        colors
    }
}

// ─── Blend ───────────────────────────────────────────────────────────────────

/// Which neighbors of a cell a blend inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::S,
        Direction::E,
        Direction::W,
        Direction::NE,
        Direction::NW,
        Direction::SE,
        Direction::SW,
    ];

    /// Parse a blend file token (`n`, `s`, `e`, `w`, `ne`, `nw`, `se`, `sw`)
    pub fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "n" => Direction::N,
            "s" => Direction::S,
            "e" => Direction::E,
            "w" => Direction::W,
            "ne" => Direction::NE,
            "nw" => Direction::NW,
            "se" => Direction::SE,
            "sw" => Direction::SW,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::N => "n",
            Direction::S => "s",
            Direction::E => "e",
            Direction::W => "w",
            Direction::NE => "ne",
            Direction::NW => "nw",
            Direction::SE => "se",
            Direction::SW => "sw",
        }
    }

    /// Orthogonal neighbor offsets that must all hold the main tile.
    /// Diagonals require both of their orthogonal neighbors, never the corner cell.
    pub fn offsets(self) -> &'static [(i32, i32)] {
        const N: (i32, i32) = (0, -1);
        const S: (i32, i32) = (0, 1);
        const E: (i32, i32) = (1, 0);
        const W: (i32, i32) = (-1, 0);
        match self {
            Direction::N => &[N],
            Direction::S => &[S],
            Direction::E => &[E],
            Direction::W => &[W],
            Direction::NE => &[N, E],
            Direction::NW => &[N, W],
            Direction::SE => &[S, E],
            Direction::SW => &[S, W],
        }
    }
}

/// Overlays `blend_tile` on a cell whose neighbor(s) in `direction` hold `main_tile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blend {
    pub target_layer: String,
    pub main_tile: String,
    pub blend_tile: String,
    pub direction: Direction,
    /// Cell tiles this blend never applies to
    #[serde(default)]
    pub exclusions: HashSet<String>,
}

impl Blend {
    pub fn new(
        target_layer: impl Into<String>,
        main_tile: impl Into<String>,
        blend_tile: impl Into<String>,
        direction: Direction,
    ) -> Self {
        Self {
            target_layer: target_layer.into(),
            main_tile: main_tile.into(),
            blend_tile: blend_tile.into(),
            direction,
            exclusions: HashSet::new(),
        }
    }

    pub fn with_exclusions<I, S>(mut self, tiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusions.extend(tiles.into_iter().map(Into::into));
        self
    }
}

/// Ordered blends, grouped by target layer.
#[derive(Debug, Clone, Default)]
pub struct BlendSet {
    blends: Vec<Blend>,
    /// (layer, indices into `blends`), first-seen layer order
    by_layer: Vec<(String, Vec<usize>)>,
}

impl BlendSet {
    pub fn new(blends: Vec<Blend>) -> Self {
        let mut by_layer: Vec<(String, Vec<usize>)> = Vec::new();
        for (idx, blend) in blends.iter().enumerate() {
            match by_layer
                .iter_mut()
                .find(|(layer, _)| *layer == blend.target_layer)
            {
                Some((_, indices)) => indices.push(idx),
                None => by_layer.push((blend.target_layer.clone(), vec![idx])),
            }
        }
        Self { blends, by_layer }
    }

    pub fn blends(&self) -> &[Blend] {
        &self.blends
    }

    pub fn len(&self) -> usize {
        self.blends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blends.is_empty()
    }

    /// The blend layers, in first-seen order
    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.by_layer.iter().map(|(layer, _)| layer.as_str())
    }

    /// Blends targeting `layer`, in declaration order
    pub fn blends_for_layer(&self, layer: &str) -> impl Iterator<Item = &Blend> {
        self.by_layer
            .iter()
            .find(|(name, _)| name == layer)
            .into_iter()
            .flat_map(|(_, indices)| indices.iter())
            .map(move |&idx| &self.blends[idx])
    }
}
