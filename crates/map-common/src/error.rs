//! Error types for the map rendering pipeline.

use thiserror::Error;

/// Result type alias using MapError.
pub type MapResult<T> = Result<T, MapError>;

/// Primary error type for map rendering operations.
#[derive(Debug, Error)]
pub enum MapError {
    // === Configuration Errors ===
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // === Data Errors ===
    #[error("Feature source failed: {0}")]
    FeatureSource(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    // === Asset Errors ===
    #[error("Failed to load icon '{name}': {message}")]
    IconLoad { name: String, message: String },

    #[error("Failed to load font: {0}")]
    FontLoad(String),

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    RenderError(String),

    #[error("Image encoding failed: {0}")]
    EncodeError(String),

    // === Infrastructure Errors ===
    #[error("I/O error: {0}")]
    Io(String),
}

/// Coarse classification of errors, deciding how far a failure reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad category names or settings. Fatal to the affected pass.
    Configuration,
    /// Missing or undecodable assets. The single item is skipped.
    Asset,
    /// Feature acquisition failures. The whole render aborts.
    Data,
    /// Canvas, encoding and I/O failures. The whole render aborts.
    Render,
}

impl MapError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MapError::UnknownCategory(_)
            | MapError::InvalidConfig(_)
            | MapError::InvalidRequest(_) => ErrorKind::Configuration,

            MapError::IconLoad { .. } | MapError::FontLoad(_) => ErrorKind::Asset,

            MapError::FeatureSource(_) | MapError::InvalidGeometry(_) => ErrorKind::Data,

            MapError::RenderError(_) | MapError::EncodeError(_) | MapError::Io(_) => {
                ErrorKind::Render
            }
        }
    }

    /// Whether the pipeline may skip the affected item and carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, MapError::IconLoad { .. })
    }
}

// Conversion from common error types
impl From<std::io::Error> for MapError {
    fn from(err: std::io::Error) -> Self {
        MapError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for MapError {
    fn from(err: serde_json::Error) -> Self {
        MapError::InvalidConfig(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for MapError {
    fn from(err: serde_yaml::Error) -> Self {
        MapError::InvalidConfig(format!("YAML error: {}", err))
    }
}
