//! Built-in features for symfeat.
//!
//! Provides the standard catalog: a representative set of pitch, dynamics,
//! density and channel features registered in a fixed order. Hosts that
//! need more can start from [`standard_builder`] and register their own
//! extractors before building.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use sf_engine::{Catalog, CatalogBuilder, CatalogError};

pub mod extractors;

pub use extractors::{create_extractor, STANDARD_FEATURES};

static STANDARD_CATALOG: OnceCell<Arc<Catalog>> = OnceCell::new();

/// A catalog builder with every built-in feature registered.
pub fn standard_builder() -> CatalogBuilder {
    STANDARD_FEATURES
        .iter()
        .filter_map(|&name| extractors::create_extractor(name))
        .fold(Catalog::builder(), |builder, extractor| {
            builder.register_shared(Arc::from(extractor))
        })
}

/// The standard catalog, validated on first use and shared afterwards.
pub fn standard_catalog() -> Result<Arc<Catalog>, CatalogError> {
    STANDARD_CATALOG
        .get_or_try_init(|| {
            let catalog = standard_builder().build()?;
            tracing::debug!(features = catalog.len(), "standard catalog built");
            Ok::<_, CatalogError>(Arc::new(catalog))
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_engine::Dimensions;

    #[test]
    fn standard_catalog_builds_once() {
        let a = standard_catalog().unwrap();
        let b = standard_catalog().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), STANDARD_FEATURES.len());
    }

    #[test]
    fn declared_dimensions() {
        let catalog = standard_catalog().unwrap();
        let dims = |name: &str| catalog.definition(name).unwrap().dimensions();
        assert_eq!(dims(extractors::BASIC_PITCH_HISTOGRAM), Dimensions::Fixed(128));
        assert_eq!(dims(extractors::PITCH_CLASS_DISTRIBUTION), Dimensions::Fixed(12));
        assert_eq!(dims(extractors::RANGE), Dimensions::Fixed(1));
        assert_eq!(dims(extractors::CHANNEL_LOUDNESS_AVERAGES), Dimensions::Variable);
    }

    #[test]
    fn range_change_follows_range() {
        let catalog = standard_catalog().unwrap();
        let order = catalog.topological_order();
        let pos = |name: &str| order.iter().position(|&n| n == name).unwrap();
        assert!(pos(extractors::RANGE) < pos(extractors::RANGE_CHANGE));
        assert_eq!(catalog.max_lookback(), 1);
        assert!(catalog.has_sequential());
    }

    #[test]
    fn builder_rejects_duplicate_builtin() {
        let catalog = standard_builder()
            .register(extractors::Range::new())
            .build();
        assert!(matches!(catalog, Err(CatalogError::DuplicateFeature(name)) if name == "Range"));
    }
}
