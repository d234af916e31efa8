//! Feature catalog: the registration table of definitions and extractors.
//!
//! A catalog is validated and ordered once when it is built and is
//! read-only afterwards. Every structural problem (duplicate names, unknown
//! dependencies, future offsets, same-window cycles, wrong output widths)
//! surfaces here, before any extraction work starts.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap, HashSet};
use std::sync::Arc;

use sf_ir::{EventStream, NoteSummary};
use slotmap::{SecondaryMap, SlotMap};
use tracing::debug;

use crate::definition::{Dimensions, FeatureDefinition};
use crate::dependency::DependencyValues;
use crate::error::CatalogError;
use crate::extractor::{extract_guarded, FeatureExtractor};
use crate::value::FeatureValue;

slotmap::new_key_type! {
    /// Handle for a registered feature.
    pub struct FeatureKey;
}

pub(crate) struct Entry {
    pub(crate) extractor: Arc<dyn FeatureExtractor>,
    /// Resolved `(dependency, offset)` pairs in declaration order
    pub(crate) dependencies: Vec<(FeatureKey, i32)>,
    /// Position in registration order
    declared: usize,
}

impl Entry {
    pub(crate) fn definition(&self) -> &FeatureDefinition {
        self.extractor.definition()
    }
}

/// Collects extractors in registration order.
#[derive(Default)]
pub struct CatalogBuilder {
    extractors: Vec<Arc<dyn FeatureExtractor>>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<E: FeatureExtractor + 'static>(self, extractor: E) -> Self {
        self.register_shared(Arc::new(extractor))
    }

    pub fn register_shared(mut self, extractor: Arc<dyn FeatureExtractor>) -> Self {
        self.extractors.push(extractor);
        self
    }

    /// Validate and order the registered features.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        let mut entries: SlotMap<FeatureKey, Entry> = SlotMap::with_key();
        let mut declared = Vec::with_capacity(self.extractors.len());
        let mut by_name: HashMap<String, FeatureKey> =
            HashMap::with_capacity(self.extractors.len());

        for (index, extractor) in self.extractors.into_iter().enumerate() {
            let def = extractor.definition();
            if def.dimensions() == Dimensions::Fixed(0) {
                return Err(CatalogError::ZeroDimensions(def.name().to_string()));
            }
            if by_name.contains_key(def.name()) {
                return Err(CatalogError::DuplicateFeature(def.name().to_string()));
            }
            let name = def.name().to_string();
            let key = entries.insert(Entry {
                extractor,
                dependencies: Vec::new(),
                declared: index,
            });
            by_name.insert(name, key);
            declared.push(key);
        }

        for &key in &declared {
            let resolved = resolve_dependencies(entries[key].definition(), &by_name)?;
            entries[key].dependencies = resolved;
        }

        let (order, levels) = topological_order(&entries, &declared)?;
        let max_lookback = declared
            .iter()
            .map(|&k| entries[k].definition().lookback())
            .max()
            .unwrap_or(0);

        let catalog = Catalog {
            entries,
            declared,
            by_name,
            order,
            levels,
            max_lookback,
        };
        catalog.probe_dimensions()?;

        debug!(
            features = catalog.len(),
            max_lookback = catalog.max_lookback,
            "catalog built"
        );
        Ok(catalog)
    }
}

/// A validated, dependency-ordered set of features.
pub struct Catalog {
    entries: SlotMap<FeatureKey, Entry>,
    declared: Vec<FeatureKey>,
    by_name: HashMap<String, FeatureKey>,
    /// Topological order over same-window dependencies
    order: Vec<FeatureKey>,
    /// Longest chain of same-window dependencies below each feature
    levels: SecondaryMap<FeatureKey, usize>,
    max_lookback: usize,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.declared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn definition(&self, name: &str) -> Option<&FeatureDefinition> {
        self.by_name
            .get(name)
            .map(|&key| self.entries[key].definition())
    }

    /// Definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &FeatureDefinition> + '_ {
        self.declared.iter().map(|&key| self.entries[key].definition())
    }

    /// Feature names in evaluation order.
    pub fn topological_order(&self) -> Vec<&str> {
        self.order
            .iter()
            .map(|&key| self.entries[key].definition().name())
            .collect()
    }

    pub fn has_sequential(&self) -> bool {
        self.definitions().any(FeatureDefinition::is_sequential)
    }

    /// Deepest negative offset declared by any feature.
    pub fn max_lookback(&self) -> usize {
        self.max_lookback
    }

    /// A catalog holding `names` plus everything they depend on,
    /// transitively, in the original registration order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Catalog, CatalogError> {
        let roots = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.by_name
                    .get(name)
                    .copied()
                    .ok_or_else(|| CatalogError::UnknownFeature(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let members = self.closure(roots);

        self.declared
            .iter()
            .filter(|&key| members.contains(key))
            .fold(CatalogBuilder::new(), |builder, &key| {
                builder.register_shared(Arc::clone(&self.entries[key].extractor))
            })
            .build()
    }

    pub(crate) fn entry(&self, key: FeatureKey) -> &Entry {
        &self.entries[key]
    }

    pub(crate) fn declared(&self) -> &[FeatureKey] {
        &self.declared
    }

    /// `roots` and all of their dependencies at any offset.
    pub(crate) fn closure(
        &self,
        roots: impl IntoIterator<Item = FeatureKey>,
    ) -> HashSet<FeatureKey> {
        let mut members = HashSet::new();
        let mut stack: Vec<FeatureKey> = roots.into_iter().collect();
        while let Some(key) = stack.pop() {
            if members.insert(key) {
                stack.extend(self.entries[key].dependencies.iter().map(|&(dep, _)| dep));
            }
        }
        members
    }

    /// Group `members` into evaluation levels: every same-window dependency
    /// of a feature sits in an earlier level. Within a level, features keep
    /// topological order.
    pub(crate) fn levels_for(&self, members: &HashSet<FeatureKey>) -> Vec<Vec<FeatureKey>> {
        let mut grouped: BTreeMap<usize, Vec<FeatureKey>> = BTreeMap::new();
        for &key in self.order.iter().filter(|&key| members.contains(key)) {
            grouped.entry(self.levels[key]).or_default().push(key);
        }
        grouped.into_values().collect()
    }

    /// Run each extractor once against an empty slice so a wrong fixed
    /// width is reported before extraction. Extractor errors are ignored
    /// here; they surface per feature during the run.
    fn probe_dimensions(&self) -> Result<(), CatalogError> {
        let sequence = EventStream::new(PROBE_TICKS_PER_BEAT);
        let summary = NoteSummary::empty(0.0, 0.0, &[]);
        for &key in &self.order {
            let entry = &self.entries[key];
            let deps = DependencyValues::unavailable(entry.dependencies.len());
            if let Ok(value) =
                extract_guarded(entry.extractor.as_ref(), &sequence, Some(&summary), &deps)
            {
                check_dimensions(entry.definition(), &value)?;
            }
        }
        Ok(())
    }
}

const PROBE_TICKS_PER_BEAT: u16 = 480;

/// Fail if an available value doesn't match the declared fixed width.
pub(crate) fn check_dimensions(
    definition: &FeatureDefinition,
    value: &FeatureValue,
) -> Result<(), CatalogError> {
    if let (Dimensions::Fixed(expected), Some(values)) = (definition.dimensions(), value.values()) {
        if values.len() != expected {
            return Err(CatalogError::DimensionMismatch {
                feature: definition.name().to_string(),
                expected,
                actual: values.len(),
            });
        }
    }
    Ok(())
}

fn resolve_dependencies(
    definition: &FeatureDefinition,
    by_name: &HashMap<String, FeatureKey>,
) -> Result<Vec<(FeatureKey, i32)>, CatalogError> {
    definition
        .dependencies()
        .iter()
        .map(|dep| {
            if dep.offset > 0 {
                return Err(CatalogError::PositiveOffset {
                    feature: definition.name().to_string(),
                    dependency: dep.name.clone(),
                    offset: dep.offset,
                });
            }
            by_name
                .get(&dep.name)
                .map(|&key| (key, dep.offset))
                .ok_or_else(|| CatalogError::UnknownDependency {
                    feature: definition.name().to_string(),
                    dependency: dep.name.clone(),
                })
        })
        .collect()
}

/// Topological sort via Kahn's algorithm.
///
/// Only offset-0 edges constrain the order: a negative offset reads a
/// window that has already completed. Ties are broken by registration
/// order, so the result is deterministic.
fn topological_order(
    entries: &SlotMap<FeatureKey, Entry>,
    declared: &[FeatureKey],
) -> Result<(Vec<FeatureKey>, SecondaryMap<FeatureKey, usize>), CatalogError> {
    let n = declared.len();

    let mut in_degree = vec![0usize; n];
    let mut consumers: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (index, &key) in declared.iter().enumerate() {
        for &(dep, offset) in &entries[key].dependencies {
            if offset == 0 {
                in_degree[index] += 1;
                consumers[entries[dep].declared].push(index);
            }
        }
    }

    // Min-heap on registration index
    let mut ready: BinaryHeap<Reverse<usize>> = (0..n)
        .filter(|&i| in_degree[i] == 0)
        .map(Reverse)
        .collect();

    let mut order = Vec::with_capacity(n);
    let mut levels = SecondaryMap::new();

    while let Some(Reverse(index)) = ready.pop() {
        let key = declared[index];
        let level = entries[key]
            .dependencies
            .iter()
            .filter(|&&(_, offset)| offset == 0)
            .map(|&(dep, _)| levels[dep] + 1)
            .max()
            .unwrap_or(0);
        levels.insert(key, level);
        order.push(key);

        for &consumer in &consumers[index] {
            in_degree[consumer] -= 1;
            if in_degree[consumer] == 0 {
                ready.push(Reverse(consumer));
            }
        }
    }

    if order.len() < n {
        let blocked = (0..n)
            .filter(|&i| in_degree[i] > 0)
            .map(|i| entries[declared[i]].definition().name().to_string())
            .collect();
        return Err(CatalogError::Cycle(blocked));
    }

    Ok((order, levels))
}
