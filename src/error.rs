//! Error type for the analysis pipeline.

use std::path::PathBuf;

use crate::config::ConfigError;

/// Errors that abort an analysis run.
///
/// Per-opening game-theory failures are not represented here; they are
/// absorbed into the equilibria report (see [`crate::game::SolveError`]).
#[derive(Debug)]
pub enum ReportError {
    /// The input path does not exist.
    InputNotFound(PathBuf),
    /// The input path exists but is not a regular file.
    NotAFile(PathBuf),
    /// The CSV could not be read or parsed.
    Csv(csv::Error),
    /// A filesystem operation failed.
    Io(std::io::Error),
    /// The equilibria report could not be (de)serialized.
    Json(serde_json::Error),
    /// An output directory could not be created.
    OutputDir(PathBuf, std::io::Error),
    /// A chart could not be rendered.
    Plot(String),
    /// The configuration failed validation.
    Config(ConfigError),
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::InputNotFound(path) => {
                write!(f, "Input CSV file not found at '{}'", path.display())
            }
            ReportError::NotAFile(path) => {
                write!(f, "Provided path '{}' is not a file", path.display())
            }
            ReportError::Csv(e) => write!(f, "Error reading or processing CSV file: {}", e),
            ReportError::Io(e) => write!(f, "I/O error: {}", e),
            ReportError::Json(e) => write!(f, "JSON error: {}", e),
            ReportError::OutputDir(path, e) => {
                write!(f, "Error creating output directory '{}': {}", path.display(), e)
            }
            ReportError::Plot(msg) => write!(f, "Rendering failed: {}", msg),
            ReportError::Config(e) => write!(f, "Invalid configuration: {}", e),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportError::Csv(e) => Some(e),
            ReportError::Io(e) | ReportError::OutputDir(_, e) => Some(e),
            ReportError::Json(e) => Some(e),
            ReportError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<csv::Error> for ReportError {
    fn from(e: csv::Error) -> Self {
        ReportError::Csv(e)
    }
}

impl From<std::io::Error> for ReportError {
    fn from(e: std::io::Error) -> Self {
        ReportError::Io(e)
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        ReportError::Json(e)
    }
}

impl From<ConfigError> for ReportError {
    fn from(e: ConfigError) -> Self {
        ReportError::Config(e)
    }
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, ReportError>;
