//! Static feature metadata.

/// Output width of a feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dimensions {
    /// Exactly this many values
    Fixed(usize),
    /// Width depends on the input (e.g. one value per active channel)
    Variable,
}

impl Dimensions {
    /// Returns true if an output of `len` values is allowed.
    pub fn accepts(self, len: usize) -> bool {
        match self {
            Dimensions::Fixed(n) => n == len,
            Dimensions::Variable => true,
        }
    }

    /// Width of a sentinel-filled output.
    pub fn legacy_len(self) -> usize {
        match self {
            Dimensions::Fixed(n) => n,
            Dimensions::Variable => 1,
        }
    }
}

/// A declared dependency on another feature's value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dependency {
    /// Name of the feature depended on
    pub name: String,
    /// Window offset: 0 = same window, -n = n windows earlier
    pub offset: i32,
}

/// Immutable description of one feature.
///
/// Dependencies are kept as `(name, offset)` pairs so the two can never
/// disagree in length. Offsets are checked when the feature is registered
/// in a catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureDefinition {
    name: String,
    description: String,
    is_sequential: bool,
    dimensions: Dimensions,
    dependencies: Vec<Dependency>,
}

impl FeatureDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        is_sequential: bool,
        dimensions: Dimensions,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            is_sequential,
            dimensions,
            dependencies: Vec::new(),
        }
    }

    /// Declare a dependency on `name` at window `offset`.
    pub fn with_dependency(mut self, name: impl Into<String>, offset: i32) -> Self {
        self.dependencies.push(Dependency {
            name: name.into(),
            offset,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_sequential(&self) -> bool {
        self.is_sequential
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// How many past windows this feature reads.
    pub fn lookback(&self) -> usize {
        self.dependencies
            .iter()
            .map(|d| d.offset.min(0).unsigned_abs() as usize)
            .max()
            .unwrap_or(0)
    }
}
