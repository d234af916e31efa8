//! Feature output values.

use crate::definition::Dimensions;

/// Legacy marker for "feature undefined due to absent source data".
pub const SENTINEL: f64 = -1.0;

/// The output of one feature for one window (or the whole piece).
///
/// Absence is explicit all the way through the engine; it only becomes
/// [`SENTINEL`] at the export boundary via [`FeatureValue::to_legacy`].
#[derive(Clone, Debug, PartialEq)]
pub enum FeatureValue {
    Available(Vec<f64>),
    Unavailable,
}

impl FeatureValue {
    /// A single-element value.
    pub fn scalar(value: f64) -> Self {
        Self::Available(vec![value])
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn values(&self) -> Option<&[f64]> {
        match self {
            Self::Available(v) => Some(v),
            Self::Unavailable => None,
        }
    }

    /// First element, for scalar features.
    pub fn first(&self) -> Option<f64> {
        self.values().and_then(|v| v.first().copied())
    }

    /// Project to the legacy numeric form: unavailable values become a
    /// sentinel-filled vector of the declared dimension.
    pub fn to_legacy(&self, dimensions: Dimensions) -> Vec<f64> {
        match self {
            Self::Available(v) => v.clone(),
            Self::Unavailable => vec![SENTINEL; dimensions.legacy_len()],
        }
    }
}

impl From<Vec<f64>> for FeatureValue {
    fn from(values: Vec<f64>) -> Self {
        Self::Available(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_accessors() {
        let v = FeatureValue::scalar(3.5);
        assert!(v.is_available());
        assert_eq!(v.first(), Some(3.5));
        assert_eq!(v.values(), Some(&[3.5][..]));
    }

    #[test]
    fn unavailable_projects_to_sentinel() {
        let v = FeatureValue::Unavailable;
        assert_eq!(v.first(), None);
        assert_eq!(v.to_legacy(Dimensions::Fixed(1)), vec![-1.0]);
        assert_eq!(v.to_legacy(Dimensions::Fixed(3)), vec![-1.0; 3]);
        assert_eq!(v.to_legacy(Dimensions::Variable), vec![-1.0]);
    }

    #[test]
    fn available_passes_through_legacy() {
        let v = FeatureValue::from(vec![1.0, 2.0]);
        assert_eq!(v.to_legacy(Dimensions::Fixed(2)), vec![1.0, 2.0]);
    }
}
