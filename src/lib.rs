//! Symbolic music feature extraction.
//!
//! Provides a [`Session`] that ties configuration, the standard feature
//! catalog and the extraction engine together, so hosts only hand over an
//! event stream.

use std::sync::Arc;

use tracing::debug;

// Re-export common types so callers don't need the member crates directly.
pub use sf_engine::{
    CancellationFlag, Catalog, CatalogBuilder, CatalogError, ConfigError, Dependency,
    DependencyValues, Dimensions, ExtractionConfig, ExtractionEngine, ExtractionError,
    FeatureComputationError, FeatureDefinition, FeatureEntry, FeatureExtractor, FeatureMatrix,
    FeatureOutcome, FeatureValue, FeatureValues, FnExtractor, InputConfig, LegacyRows, SENTINEL,
};
pub use sf_features::{create_extractor, standard_builder, standard_catalog, STANDARD_FEATURES};
pub use sf_ir::{
    build, BuildOptions, Event, EventPayload, EventStream, IntermediateRepresentation,
    MalformedInputError, NoteSpan, NoteSummary, Timestamp, Window, WindowConfig,
};

/// One configured extraction setup, reusable across inputs.
pub struct Session {
    config: ExtractionConfig,
    engine: ExtractionEngine,
}

impl Session {
    /// A session over the standard catalog.
    pub fn new(config: ExtractionConfig) -> Result<Self, ExtractionError> {
        Self::with_catalog(config, standard_catalog()?)
    }

    /// A session over `catalog`, narrowed to the configured features and
    /// their dependencies.
    pub fn with_catalog(
        config: ExtractionConfig,
        catalog: Arc<Catalog>,
    ) -> Result<Self, ExtractionError> {
        config.validate()?;
        let catalog = match &config.enabled {
            Some(names) => Arc::new(catalog.select(names)?),
            None => catalog,
        };
        debug!(features = catalog.len(), parallel = config.parallel, "session ready");
        let engine = ExtractionEngine::new(catalog).with_parallelism(config.parallel);
        Ok(Self { config, engine })
    }

    /// A session over the standard catalog configured from TOML.
    pub fn from_toml_str(text: &str) -> Result<Self, ExtractionError> {
        Self::new(ExtractionConfig::from_toml_str(text)?)
    }

    pub fn with_cancellation(self, flag: CancellationFlag) -> Self {
        let Self { config, engine } = self;
        Self {
            config,
            engine: engine.with_cancellation(flag),
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        self.engine.catalog()
    }

    /// Build the representation of `stream` and extract every feature.
    ///
    /// An empty stream is not an error: every feature comes back
    /// unavailable.
    pub fn extract(&self, stream: &EventStream) -> Result<FeatureMatrix, ExtractionError> {
        let representation = build(stream, &self.config.build_options())?;
        if representation.is_none() {
            debug!("empty event stream, no representation");
        }
        self.engine.run(stream, representation.as_ref())
    }
}
