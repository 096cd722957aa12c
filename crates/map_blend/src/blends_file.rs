//! Reader for the block-structured blend file.
//!
//! ```text
//! blend
//! {
//!     layer = 0_FloorOverlay
//!     mainTile = blends_natural_01_0
//!     blendTile = blends_natural_01_5
//!     dir = n
//!     exclude = floors_exterior_street_01_0 floors_exterior_street_01_1
//! }
//! ```
//!
//! The opening brace may also sit on the `blend` line. `exclude` is optional
//! and may repeat; everything else is required. A top-level `version = N`
//! line is accepted and ignored.

use std::path::Path;

use crate::{Blend, BlendSet, Direction, LoadError};

const BLOCK_NAME: &str = "blend";

/// Read and parse a blend file
pub fn load_blends(path: &Path) -> Result<BlendSet, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_blends(&text)
}

/// Parse blend file text. Any unknown block, attribute or direction fails the whole parse.
pub fn parse_blends(text: &str) -> Result<BlendSet, LoadError> {
    let mut blends = Vec::new();
    let mut state = State::TopLevel;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        state = match state {
            State::TopLevel => parse_top_level(line, line_no)?,
            State::ExpectOpen(pending) => {
                if line != "{" {
                    return Err(LoadError::UnexpectedToken {
                        line: line_no,
                        text: line.to_string(),
                    });
                }
                State::InBlock(pending)
            }
            State::InBlock(mut pending) => {
                if line == "}" {
                    blends.push(pending.finish()?);
                    State::TopLevel
                } else {
                    pending.apply(line, line_no)?;
                    State::InBlock(pending)
                }
            }
        };
    }

    match state {
        State::TopLevel => Ok(BlendSet::new(blends)),
        State::ExpectOpen(pending) | State::InBlock(pending) => Err(LoadError::UnterminatedBlock {
            line: pending.start_line,
        }),
    }
}

enum State {
    TopLevel,
    ExpectOpen(PendingBlend),
    InBlock(PendingBlend),
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_top_level(line: &str, line_no: usize) -> Result<State, LoadError> {
    if let Some((key, _)) = line.split_once('=') {
        let key = key.trim();
        return if key == "version" {
            Ok(State::TopLevel)
        } else {
            Err(LoadError::UnknownKey {
                line: line_no,
                key: key.to_string(),
            })
        };
    }

    let (name, opened) = match line.strip_suffix('{') {
        Some(name) => (name.trim(), true),
        None => (line, false),
    };
    if name.is_empty() || name == "}" {
        return Err(LoadError::UnexpectedToken {
            line: line_no,
            text: line.to_string(),
        });
    }
    if name != BLOCK_NAME {
        return Err(LoadError::UnknownBlock {
            line: line_no,
            name: name.to_string(),
        });
    }

    let pending = PendingBlend::new(line_no);
    Ok(if opened {
        State::InBlock(pending)
    } else {
        State::ExpectOpen(pending)
    })
}

/// A blend block whose closing brace has not been seen yet
#[derive(Default)]
struct PendingBlend {
    start_line: usize,
    layer: Option<String>,
    main_tile: Option<String>,
    blend_tile: Option<String>,
    direction: Option<Direction>,
    exclude: Vec<String>,
}

impl PendingBlend {
    fn new(start_line: usize) -> Self {
        Self {
            start_line,
            ..Default::default()
        }
    }

    fn apply(&mut self, line: &str, line_no: usize) -> Result<(), LoadError> {
        let Some((key, value)) = line.split_once('=') else {
            // Anything that is not `key = value` inside a block is a nested block
            let name = line.trim_end_matches('{').trim();
            return Err(if name.is_empty() {
                LoadError::UnexpectedToken {
                    line: line_no,
                    text: line.to_string(),
                }
            } else {
                LoadError::UnknownBlock {
                    line: line_no,
                    name: name.to_string(),
                }
            });
        };
        let key = key.trim();
        let value = value.trim();

        match key {
            "layer" => self.layer = non_empty(value),
            "mainTile" => self.main_tile = non_empty(value),
            "blendTile" => self.blend_tile = non_empty(value),
            "dir" => {
                let direction =
                    Direction::parse(value).ok_or_else(|| LoadError::UnknownDirection {
                        line: line_no,
                        value: value.to_string(),
                    })?;
                self.direction = Some(direction);
            }
            "exclude" => self
                .exclude
                .extend(value.split_whitespace().map(str::to_string)),
            _ => {
                return Err(LoadError::UnknownKey {
                    line: line_no,
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<Blend, LoadError> {
        let line = self.start_line;
        let missing = |key: &'static str| LoadError::MissingKey { line, key };

        let layer = self.layer.ok_or_else(|| missing("layer"))?;
        let main_tile = self.main_tile.ok_or_else(|| missing("mainTile"))?;
        let blend_tile = self.blend_tile.ok_or_else(|| missing("blendTile"))?;
        let direction = self.direction.ok_or_else(|| missing("dir"))?;

        Ok(Blend::new(layer, main_tile, blend_tile, direction).with_exclusions(self.exclude))
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
