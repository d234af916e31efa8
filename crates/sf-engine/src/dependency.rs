//! Dependency value table.
//!
//! Values for the window being extracted live in a per-window map that is
//! filled level by level; once a window completes its map is settled into
//! the table and never touched again. Only as many settled windows are kept
//! as the deepest declared offset needs.

use std::collections::VecDeque;

use slotmap::SecondaryMap;

use crate::catalog::FeatureKey;
use crate::value::FeatureValue;

static UNAVAILABLE: FeatureValue = FeatureValue::Unavailable;

/// Values of every feature computed so far in one window.
pub(crate) type WindowValues = SecondaryMap<FeatureKey, FeatureValue>;

/// Resolved dependency values handed to an extractor, in the order its
/// definition declares them.
#[derive(Clone, Debug, Default)]
pub struct DependencyValues<'a> {
    values: Vec<&'a FeatureValue>,
}

impl<'a> DependencyValues<'a> {
    pub fn new(values: Vec<&'a FeatureValue>) -> Self {
        Self { values }
    }

    /// No dependencies.
    pub fn none() -> Self {
        Self { values: Vec::new() }
    }

    /// `count` dependencies, all unavailable.
    pub fn unavailable(count: usize) -> Self {
        Self {
            values: vec![&UNAVAILABLE; count],
        }
    }

    /// Value of the `index`-th declared dependency; unavailable if the
    /// index is out of range.
    pub fn get(&self, index: usize) -> &'a FeatureValue {
        self.values.get(index).copied().unwrap_or(&UNAVAILABLE)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a FeatureValue> + '_ {
        self.values.iter().copied()
    }
}

/// Settled values of past windows.
pub(crate) struct DependencyTable {
    retained: usize,
    settled: VecDeque<WindowValues>,
}

impl DependencyTable {
    pub(crate) fn new(retained: usize) -> Self {
        Self {
            retained,
            settled: VecDeque::new(),
        }
    }

    /// Look up `key` at `offset` relative to the window whose values so far
    /// are `current`. Offsets reaching before window 0 are unavailable.
    pub(crate) fn resolve<'a>(
        &'a self,
        current: &'a WindowValues,
        key: FeatureKey,
        offset: i32,
    ) -> &'a FeatureValue {
        if offset == 0 {
            return current.get(key).unwrap_or(&UNAVAILABLE);
        }
        if offset > 0 {
            return &UNAVAILABLE;
        }
        let back = offset.unsigned_abs() as usize;
        if back > self.settled.len() {
            return &UNAVAILABLE;
        }
        self.settled[self.settled.len() - back]
            .get(key)
            .unwrap_or(&UNAVAILABLE)
    }

    /// Append a completed window.
    pub(crate) fn settle(&mut self, values: WindowValues) {
        if self.retained == 0 {
            return;
        }
        if self.settled.len() == self.retained {
            self.settled.pop_front();
        }
        self.settled.push_back(values);
    }

    pub(crate) fn settled_windows(&self) -> usize {
        self.settled.len()
    }
}
