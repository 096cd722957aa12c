//! Reader for the line-oriented rule file.
//!
//! Each non-blank line is one rule:
//!
//! ```text
//! # bitmap, r, g, b, choices, layer [, cond r, cond g, cond b]
//! 0, 0, 255, 0, grass_0 grass_1 grass_2, 0_Floor
//! 1, 255, 0, 0, bush_0 null, 0_Vegetation, 0, 255, 0
//! ```
//!
//! A choice of `null` is the empty tile.

use std::path::Path;

use map_blend_core::{BmpIndex, Rgb};

use crate::{LoadError, Rule, RuleSet};

const NULL_TILE: &str = "null";

/// Read and parse a rule file
pub fn load_rules(path: &Path) -> Result<RuleSet, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_rules(&text)
}

/// Parse rule file text. The first bad line fails the whole parse.
pub fn parse_rules(text: &str) -> Result<RuleSet, LoadError> {
    let mut rules = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }
        rules.push(parse_rule_line(line, idx + 1)?);
    }
    Ok(RuleSet::new(rules))
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_rule_line(line: &str, line_no: usize) -> Result<Rule, LoadError> {
    let malformed = |reason: String| LoadError::MalformedRuleLine {
        line: line_no,
        reason,
    };

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 6 && fields.len() != 9 {
        return Err(malformed(format!(
            "expected 6 or 9 comma-separated fields, found {}",
            fields.len()
        )));
    }

    let bitmap = fields[0]
        .parse::<u32>()
        .ok()
        .and_then(BmpIndex::from_index)
        .ok_or_else(|| malformed(format!("bitmap index must be 0 or 1, found '{}'", fields[0])))?;

    let color = parse_color(&fields[1..4]).map_err(&malformed)?;

    let tile_choices: Vec<String> = fields[4]
        .split_whitespace()
        .map(|choice| {
            if choice == NULL_TILE {
                String::new()
            } else {
                choice.to_string()
            }
        })
        .collect();
    if tile_choices.is_empty() {
        return Err(malformed("no tile choices".to_string()));
    }

    let target_layer = fields[5];
    if target_layer.is_empty() {
        return Err(malformed("empty target layer".to_string()));
    }

    let mut rule = Rule::new(bitmap, color, tile_choices, target_layer);
    if fields.len() == 9 {
        rule = rule.with_condition(parse_color(&fields[6..9]).map_err(&malformed)?);
    }
    Ok(rule)
}

fn parse_color(fields: &[&str]) -> Result<Rgb, String> {
    let mut rgb = [0u8; 3];
    for (slot, field) in rgb.iter_mut().zip(fields) {
        *slot = field
            .parse::<u8>()
            .map_err(|_| format!("color component must be 0-255, found '{field}'"))?;
    }
    Ok(Rgb::from(rgb))
}
