//! The extractor capability implemented by every feature.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use sf_ir::{EventStream, NoteSummary};

use crate::definition::FeatureDefinition;
use crate::dependency::DependencyValues;
use crate::error::FeatureComputationError;
use crate::value::FeatureValue;

/// Computes one feature from the shared representation.
///
/// Implementations are stateless and may be invoked concurrently for
/// different windows. When `representation` is `None` they must return
/// [`FeatureValue::Unavailable`] rather than fail. Dependency values arrive
/// already resolved, in the order declared by the definition; an extractor
/// never looks other features up by name.
pub trait FeatureExtractor: Send + Sync {
    fn definition(&self) -> &FeatureDefinition;

    fn extract(
        &self,
        sequence: &EventStream,
        representation: Option<&NoteSummary>,
        dependencies: &DependencyValues<'_>,
    ) -> Result<FeatureValue, FeatureComputationError>;
}

/// An extractor backed by a closure, for one-off features.
pub struct FnExtractor<F> {
    definition: FeatureDefinition,
    extract: F,
}

impl<F> FnExtractor<F>
where
    F: Fn(
            &EventStream,
            Option<&NoteSummary>,
            &DependencyValues<'_>,
        ) -> Result<FeatureValue, FeatureComputationError>
        + Send
        + Sync,
{
    pub fn new(definition: FeatureDefinition, extract: F) -> Self {
        Self {
            definition,
            extract,
        }
    }
}

impl<F> FeatureExtractor for FnExtractor<F>
where
    F: Fn(
            &EventStream,
            Option<&NoteSummary>,
            &DependencyValues<'_>,
        ) -> Result<FeatureValue, FeatureComputationError>
        + Send
        + Sync,
{
    fn definition(&self) -> &FeatureDefinition {
        &self.definition
    }

    fn extract(
        &self,
        sequence: &EventStream,
        representation: Option<&NoteSummary>,
        dependencies: &DependencyValues<'_>,
    ) -> Result<FeatureValue, FeatureComputationError> {
        (self.extract)(sequence, representation, dependencies)
    }
}

/// Run `extractor`, turning a panic into a computation error for its
/// feature. Extractors hold no state a panic could leave inconsistent.
pub(crate) fn extract_guarded(
    extractor: &dyn FeatureExtractor,
    sequence: &EventStream,
    representation: Option<&NoteSummary>,
    dependencies: &DependencyValues<'_>,
) -> Result<FeatureValue, FeatureComputationError> {
    catch_unwind(AssertUnwindSafe(|| {
        extractor.extract(sequence, representation, dependencies)
    }))
    .unwrap_or_else(|payload| {
        Err(FeatureComputationError::new(
            extractor.definition().name(),
            format!("extractor panicked: {}", panic_message(payload.as_ref())),
        ))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown cause"
    }
}
