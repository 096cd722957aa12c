use std::path::PathBuf;

use map_blend::LoadError;
use map_blend_core::MapError;
use thiserror::Error;

/// Exit codes
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_INVALID_INPUT: u8 = 2;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid project file {}: {source}", path.display())]
    Project {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to load bitmap {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Bad input files map to a distinct exit code from I/O failures
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Io { .. } | CliError::Json(_) => EXIT_ERROR,
            CliError::Project { .. }
            | CliError::Image { .. }
            | CliError::Load(_)
            | CliError::Map(_) => EXIT_INVALID_INPUT,
        }
    }
}
