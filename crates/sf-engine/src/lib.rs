//! Feature extraction engine for symfeat.
//!
//! Holds feature definitions and extractors in a validated [`Catalog`],
//! orders them by their declared dependencies and drives them over the
//! windows of an intermediate representation, producing a
//! [`FeatureMatrix`].

mod catalog;
mod config;
mod definition;
mod dependency;
mod engine;
mod error;
mod extractor;
mod matrix;
mod value;

pub use catalog::{Catalog, CatalogBuilder, FeatureKey};
pub use config::{ExtractionConfig, InputConfig};
pub use definition::{Dependency, Dimensions, FeatureDefinition};
pub use dependency::DependencyValues;
pub use engine::{CancellationFlag, ExtractionEngine};
pub use error::{CatalogError, ConfigError, ExtractionError, FeatureComputationError};
pub use extractor::{FeatureExtractor, FnExtractor};
pub use matrix::{FeatureEntry, FeatureMatrix, FeatureOutcome, FeatureValues, LegacyRows};
pub use value::{FeatureValue, SENTINEL};
