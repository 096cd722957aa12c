//! Pixel classification: bitmap colors to tile names on the rule layers.

use std::collections::HashMap;

use map_blend_core::{BlendMap, BmpIndex, Rgb};

use crate::grid::{GridStore, Region};
use crate::{BlenderSettings, RuleSet};

/// Offsets of the 8 cells around a cell
const NEIGHBORS_8: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Inputs shared by every classified cell
pub(crate) struct Classifier<'a> {
    pub map: &'a BlendMap,
    pub rules: &'a RuleSet,
    /// Floor tile name -> color of the first Main rule that can place it
    pub floor_colors: &'a HashMap<String, Rgb>,
    pub settings: &'a BlenderSettings,
}

impl Classifier<'_> {
    /// Reclassify `area` grown by one cell, clamped to the map.
    ///
    /// Only rule-layer grids are written; cells with no matching rule end up empty.
    pub fn run(&self, grids: &mut GridStore, area: Region) {
        let Some(area) = area
            .expanded(1)
            .clamped(self.map.width(), self.map.height())
        else {
            return;
        };

        for (x, y) in area.cells() {
            for layer in self.rules.layer_names() {
                grids.clear(layer, x, y);
            }

            let main = self.map.pixel(BmpIndex::Main, x, y);
            let vegetation = self.map.pixel(BmpIndex::Vegetation, x, y);

            let effective_main = if main.is_black() {
                self.legacy_floor_color(x, y).unwrap_or(main)
            } else {
                main
            };

            for rule in self.rules.rules_for_color(effective_main) {
                if rule.bitmap != BmpIndex::Main {
                    continue;
                }
                let tile = rule.choose(self.map.rand(BmpIndex::Main, x, y));
                grids.set(&rule.target_layer, x, y, tile);
            }

            if vegetation.is_black() {
                continue;
            }
            for rule in self.rules.rules_for_color(vegetation) {
                if rule.bitmap != BmpIndex::Vegetation || !rule.condition_allows(main) {
                    continue;
                }
                let tile = rule.choose(self.map.rand(BmpIndex::Vegetation, x, y));
                grids.set(&rule.target_layer, x, y, tile);
            }
        }
    }

    /// Color implied by a hand-painted floor tile on an unpainted cell.
    ///
    /// Applies only next to painted cells, so an isolated hand-made floor stays
    /// untouched by the rules.
    fn legacy_floor_color(&self, x: i32, y: i32) -> Option<Rgb> {
        if !self.settings.legacy_floor_override || self.floor_colors.is_empty() {
            return None;
        }
        let painted_nearby = NEIGHBORS_8.iter().any(|(dx, dy)| {
            BmpIndex::ALL
                .iter()
                .any(|&bmp| !self.map.pixel(bmp, x + dx, y + dy).is_black())
        });
        if !painted_nearby {
            return None;
        }
        let tile_name = self.map.tile_name_at(&self.settings.floor_layer, x, y)?;
        self.floor_colors.get(&tile_name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rule;
    use map_blend_core::{TileLayer, Tileset};

    const GREEN: Rgb = Rgb::new(0, 255, 0);
    const RED: Rgb = Rgb::new(255, 0, 0);
    const BLUE: Rgb = Rgb::new(0, 0, 255);

    fn choices(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn classify(map: &BlendMap, rules: &RuleSet, area: Region) -> GridStore {
        let settings = BlenderSettings::default();
        let floor_colors = rules.floor_tile_colors(&settings.floor_layer);
        let layers = rules.layer_names().iter().map(String::as_str);
        let mut grids = GridStore::new(map.width(), map.height(), layers);
        Classifier {
            map,
            rules,
            floor_colors: &floor_colors,
            settings: &settings,
        }
        .run(&mut grids, area);
        grids
    }

    #[test]
    fn green_cell_picks_choice_by_cell_random() {
        let mut map = BlendMap::new(8, 8, 1234, 99);
        map.bitmap_mut(BmpIndex::Main).set_pixel(3, 3, GREEN);
        let rules = RuleSet::new(vec![Rule::new(
            BmpIndex::Main,
            GREEN,
            choices(&["grass1", "grass2"]),
            "0_Floor",
        )]);

        let grids = classify(&map, &rules, Region::new(3, 3, 3, 3));

        let expected = ["grass1", "grass2"][map.rand(BmpIndex::Main, 3, 3) as usize % 2];
        assert_eq!(grids.tile_name("0_Floor", 3, 3), expected);
        assert_eq!(grids.tile_name("0_Floor", 2, 3), "");
    }

    #[test]
    fn one_color_writes_every_target_layer() {
        let mut map = BlendMap::new(4, 4, 0, 0);
        map.bitmap_mut(BmpIndex::Main).set_pixel(1, 1, GREEN);
        let rules = RuleSet::new(vec![
            Rule::new(BmpIndex::Main, GREEN, choices(&["grass_0"]), "0_Floor"),
            Rule::new(BmpIndex::Main, GREEN, choices(&["grime_0"]), "0_Grime"),
        ]);

        let grids = classify(&map, &rules, Region::new(0, 0, 3, 3));
        assert_eq!(grids.tile_name("0_Floor", 1, 1), "grass_0");
        assert_eq!(grids.tile_name("0_Grime", 1, 1), "grime_0");
    }

    #[test]
    fn duplicate_rules_last_declared_wins() {
        let mut map = BlendMap::new(4, 4, 0, 0);
        map.bitmap_mut(BmpIndex::Main).set_pixel(1, 1, GREEN);
        let rules = RuleSet::new(vec![
            Rule::new(BmpIndex::Main, GREEN, choices(&["first_0"]), "0_Floor"),
            Rule::new(BmpIndex::Main, GREEN, choices(&["second_0"]), "0_Floor"),
        ]);

        let grids = classify(&map, &rules, Region::new(1, 1, 1, 1));
        assert_eq!(grids.tile_name("0_Floor", 1, 1), "second_0");
    }

    #[test]
    fn vegetation_rules_respect_condition() {
        let mut map = BlendMap::new(4, 4, 0, 0);
        map.bitmap_mut(BmpIndex::Main).set_pixel(0, 0, GREEN);
        map.bitmap_mut(BmpIndex::Main).set_pixel(1, 0, RED);
        map.bitmap_mut(BmpIndex::Vegetation).fill_rect(0, 0, 2, 0, BLUE);

        let rules = RuleSet::new(vec![
            Rule::new(BmpIndex::Vegetation, BLUE, choices(&["tree_0"]), "0_Vegetation")
                .with_condition(GREEN),
            Rule::new(BmpIndex::Vegetation, BLUE, choices(&["bush_0"]), "0_Bushes"),
        ]);

        let grids = classify(&map, &rules, Region::new(0, 0, 3, 3));
        assert_eq!(grids.tile_name("0_Vegetation", 0, 0), "tree_0");
        assert_eq!(grids.tile_name("0_Vegetation", 1, 0), "");
        assert_eq!(grids.tile_name("0_Vegetation", 2, 0), "");
        assert_eq!(grids.tile_name("0_Bushes", 0, 0), "bush_0");
        assert_eq!(grids.tile_name("0_Bushes", 1, 0), "bush_0");
        assert_eq!(grids.tile_name("0_Bushes", 2, 0), "bush_0");
    }

    #[test]
    fn main_rules_ignore_vegetation_bitmap() {
        let mut map = BlendMap::new(4, 4, 0, 0);
        map.bitmap_mut(BmpIndex::Vegetation).set_pixel(1, 1, GREEN);
        let rules = RuleSet::new(vec![Rule::new(
            BmpIndex::Main,
            GREEN,
            choices(&["grass_0"]),
            "0_Floor",
        )]);

        let grids = classify(&map, &rules, Region::new(0, 0, 3, 3));
        assert_eq!(grids.tile_name("0_Floor", 1, 1), "");
    }

    #[test]
    fn null_choice_leaves_cell_empty() {
        let mut map = BlendMap::new(2, 2, 0, 0);
        map.bitmap_mut(BmpIndex::Main).set_pixel(0, 0, GREEN);
        let rules = RuleSet::new(vec![Rule::new(
            BmpIndex::Main,
            GREEN,
            vec![String::new()],
            "0_Floor",
        )]);

        let grids = classify(&map, &rules, Region::new(0, 0, 1, 1));
        assert_eq!(grids.tile_name("0_Floor", 0, 0), "");
    }

    #[test]
    fn reclassify_clears_erased_pixels() {
        let mut map = BlendMap::new(4, 4, 0, 0);
        map.bitmap_mut(BmpIndex::Main).set_pixel(2, 2, GREEN);
        let rules = RuleSet::new(vec![Rule::new(
            BmpIndex::Main,
            GREEN,
            choices(&["grass_0"]),
            "0_Floor",
        )]);
        let settings = BlenderSettings::default();
        let floor_colors = HashMap::new();
        let mut grids = GridStore::new(4, 4, ["0_Floor"]);
        let area = Region::new(2, 2, 2, 2);

        Classifier { map: &map, rules: &rules, floor_colors: &floor_colors, settings: &settings }
            .run(&mut grids, area);
        assert_eq!(grids.tile_name("0_Floor", 2, 2), "grass_0");

        map.bitmap_mut(BmpIndex::Main).set_pixel(2, 2, Rgb::BLACK);
        Classifier { map: &map, rules: &rules, floor_colors: &floor_colors, settings: &settings }
            .run(&mut grids, area);
        assert_eq!(grids.tile_name("0_Floor", 2, 2), "");
    }

    fn map_with_hand_painted_floor() -> BlendMap {
        let mut map = BlendMap::new(5, 5, 7, 8);
        map.tilesets
            .insert(Tileset::new("floors_exterior_natural_01", 32, 8, 8))
            .unwrap();
        let mut floor = TileLayer::new("0_Floor", 5, 5);
        let dirt = map.tilesets.resolve("floors_exterior_natural_01_4").unwrap();
        floor.set(2, 2, Some(dirt));
        map.add_layer(floor).unwrap();
        map
    }

    fn dirt_rules() -> RuleSet {
        RuleSet::new(vec![
            Rule::new(
                BmpIndex::Main,
                RED,
                choices(&["floors_exterior_natural_01_4"]),
                "0_Floor",
            ),
            Rule::new(BmpIndex::Main, RED, choices(&["dirt_grime_0"]), "0_Grime"),
        ])
    }

    #[test]
    fn hand_painted_floor_acts_as_painted_color() {
        let mut map = map_with_hand_painted_floor();
        map.bitmap_mut(BmpIndex::Vegetation).set_pixel(3, 2, BLUE);

        let grids = classify(&map, &dirt_rules(), Region::new(2, 2, 2, 2));
        assert_eq!(
            grids.tile_name("0_Floor", 2, 2),
            "floors_exterior_natural_01_4"
        );
        assert_eq!(grids.tile_name("0_Grime", 2, 2), "dirt_grime_0");
    }

    #[test]
    fn hand_painted_floor_needs_painted_neighbor() {
        let map = map_with_hand_painted_floor();
        let grids = classify(&map, &dirt_rules(), Region::new(2, 2, 2, 2));
        assert_eq!(grids.tile_name("0_Floor", 2, 2), "");
    }

    #[test]
    fn hand_painted_floor_override_can_be_disabled() {
        let mut map = map_with_hand_painted_floor();
        map.bitmap_mut(BmpIndex::Main).set_pixel(1, 1, GREEN);
        let rules = dirt_rules();
        let settings = BlenderSettings {
            legacy_floor_override: false,
            ..Default::default()
        };
        let floor_colors = rules.floor_tile_colors(&settings.floor_layer);
        let mut grids = GridStore::new(5, 5, ["0_Floor", "0_Grime"]);

        Classifier { map: &map, rules: &rules, floor_colors: &floor_colors, settings: &settings }
            .run(&mut grids, Region::new(2, 2, 2, 2));
        assert_eq!(grids.tile_name("0_Floor", 2, 2), "");
    }
}
