use ahash::RandomState;
use indexmap::IndexMap;
use indexmap::map::Entry;
use rowagg_error::Result;

use super::key::{GroupKey, KeySelector};
use crate::arrays::row::Row;
use crate::execution::aggregate::initializer::{Accumulator, AccumulatorInitializer};
use crate::execution::aggregate::updater::AccumulatorUpdater;
use crate::hash::HASH_RANDOM_STATE;

/// Groups for a single grouping set.
///
/// Groups are kept in the order they were first seen.
#[derive(Debug)]
pub struct GroupingSetHashTable {
    selector: KeySelector,
    groups: IndexMap<GroupKey, Accumulator, RandomState>,
}

impl GroupingSetHashTable {
    pub fn new(selector: KeySelector, capacity: usize) -> Self {
        GroupingSetHashTable {
            selector,
            groups: IndexMap::with_capacity_and_hasher(capacity, HASH_RANDOM_STATE),
        }
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    /// Fold a row into the group for its key, creating the group if needed.
    pub fn insert_row(
        &mut self,
        row: &Row,
        initializer: &AccumulatorInitializer,
        updater: &AccumulatorUpdater,
    ) -> Result<()> {
        let key = self.selector.select(row)?;
        let acc = match self.groups.entry(key) {
            Entry::Occupied(ent) => ent.into_mut(),
            Entry::Vacant(ent) => ent.insert(initializer.new_accumulator()?),
        };
        updater.update(acc, row)
    }

    pub fn into_groups(self) -> impl Iterator<Item = (GroupKey, Accumulator)> {
        self.groups.into_iter()
    }
}
