//! Error taxonomy for catalogs and extraction runs.

use sf_ir::{MalformedInputError, WindowConfigError};
use thiserror::Error;

/// The catalog is structurally invalid. Always fatal, and raised before any
/// window is extracted (or, for output widths only observable at run time,
/// as soon as the offending value is produced).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("feature '{0}' is registered more than once")]
    DuplicateFeature(String),

    #[error("feature '{feature}' depends on unknown feature '{dependency}'")]
    UnknownDependency { feature: String, dependency: String },

    #[error("no feature named '{0}' in the catalog")]
    UnknownFeature(String),

    #[error("feature '{feature}' depends on '{dependency}' at future offset {offset}")]
    PositiveOffset {
        feature: String,
        dependency: String,
        offset: i32,
    },

    #[error("feature '{0}' declares zero fixed dimensions")]
    ZeroDimensions(String),

    #[error("same-window dependency cycle among: {}", .0.join(", "))]
    Cycle(Vec<String>),

    #[error("feature '{feature}' produced {actual} values but declares {expected}")]
    DimensionMismatch {
        feature: String,
        expected: usize,
        actual: usize,
    },
}

/// A single extractor failed on valid input.
///
/// Recovered by the engine: recorded against the feature while every other
/// feature keeps extracting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("feature '{feature}' failed: {message}")]
pub struct FeatureComputationError {
    pub feature: String,
    pub message: String,
    /// Window being extracted, `None` for the whole-piece pass
    pub window: Option<usize>,
}

impl FeatureComputationError {
    pub fn new(feature: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            feature: feature.into(),
            message: message.into(),
            window: None,
        }
    }

    pub fn in_window(mut self, window: Option<usize>) -> Self {
        self.window = window;
        self
    }
}

/// Invalid extraction configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid window configuration: {0}")]
    Window(#[from] WindowConfigError),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Fatal outcome of an extraction run; nothing is produced.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("malformed input: {0}")]
    Malformed(#[from] MalformedInputError),

    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("extraction cancelled before window {window}")]
    Cancelled { window: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_feature() {
        let err = CatalogError::Cycle(vec!["A".into(), "B".into()]);
        assert_eq!(err.to_string(), "same-window dependency cycle among: A, B");

        let err = FeatureComputationError::new("Range", "bad histogram").in_window(Some(2));
        assert_eq!(err.window, Some(2));
        assert_eq!(err.to_string(), "feature 'Range' failed: bad histogram");
    }

    #[test]
    fn extraction_error_wraps_sources() {
        let err: ExtractionError = MalformedInputError::ZeroTicksPerBeat.into();
        assert!(matches!(err, ExtractionError::Malformed(_)));
        let err: ExtractionError = CatalogError::UnknownFeature("X".into()).into();
        assert_eq!(err.to_string(), "invalid catalog: no feature named 'X' in the catalog");
    }
}
