use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading rule or blend tables.
///
/// Line numbers are 1-based. A failed load never replaces the tables that
/// are already active.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: malformed rule: {reason}")]
    MalformedRuleLine { line: usize, reason: String },
    #[error("line {line}: unknown block '{name}'")]
    UnknownBlock { line: usize, name: String },
    #[error("line {line}: unknown attribute '{key}'")]
    UnknownKey { line: usize, key: String },
    #[error("line {line}: unknown direction '{value}'")]
    UnknownDirection { line: usize, value: String },
    #[error("line {line}: block is missing required attribute '{key}'")]
    MissingKey { line: usize, key: &'static str },
    #[error("line {line}: unexpected '{text}'")]
    UnexpectedToken { line: usize, text: String },
    #[error("line {line}: block is never closed")]
    UnterminatedBlock { line: usize },
}

impl LoadError {
    /// The offending line, for errors that have one
    pub fn line(&self) -> Option<usize> {
        match self {
            LoadError::Io { .. } => None,
            LoadError::MalformedRuleLine { line, .. }
            | LoadError::UnknownBlock { line, .. }
            | LoadError::UnknownKey { line, .. }
            | LoadError::UnknownDirection { line, .. }
            | LoadError::MissingKey { line, .. }
            | LoadError::UnexpectedToken { line, .. }
            | LoadError::UnterminatedBlock { line } => Some(*line),
        }
    }
}
