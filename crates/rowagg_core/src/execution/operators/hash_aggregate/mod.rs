pub mod grouping_set_hash_table;
pub mod key;

use std::sync::Arc;

use grouping_set_hash_table::GroupingSetHashTable;
use key::{GroupKey, KeySelector};
use rowagg_error::Result;
use tracing::trace;

use crate::arrays::row::Row;
use crate::execution::aggregate::initializer::{Accumulator, AccumulatorInitializer};
use crate::execution::aggregate::projector::ResultProjector;
use crate::execution::aggregate::updater::AccumulatorUpdater;
use crate::execution::source::RowStream;
use crate::explain::explainable::{ColumnIndexes, ExplainConfig, ExplainEntry, Explainable};

/// Hash aggregate over one or more grouping sets.
///
/// The input is read once. Every row is inserted into one hash table per
/// grouping set, and once the input is exhausted the groups of each table are
/// emitted in grouping set order.
///
/// Output layout: [KEY_VALS, INDICATORS, AGG_RESULTS]
#[derive(Debug, Clone)]
pub struct PhysicalHashAggregate {
    /// One selector per grouping set.
    selectors: Arc<[KeySelector]>,
    initializer: AccumulatorInitializer,
    updater: AccumulatorUpdater,
    projector: ResultProjector,
    initial_capacity: usize,
}

impl PhysicalHashAggregate {
    pub fn new(
        selectors: impl IntoIterator<Item = KeySelector>,
        initializer: AccumulatorInitializer,
        updater: AccumulatorUpdater,
        projector: ResultProjector,
        initial_capacity: usize,
    ) -> Self {
        PhysicalHashAggregate {
            selectors: selectors.into_iter().collect(),
            initializer,
            updater,
            projector,
            initial_capacity,
        }
    }

    pub fn num_grouping_sets(&self) -> usize {
        self.selectors.len()
    }

    pub fn execute(&self, input: RowStream) -> RowStream {
        Box::new(HashAggregateStream {
            operator: self.clone(),
            state: HashAggregateState::Aggregating { input },
        })
    }

    /// Consume the entire input, returning every group across all tables.
    fn build_tables(&self, input: RowStream) -> Result<Vec<(GroupKey, Accumulator)>> {
        let mut tables: Vec<_> = self
            .selectors
            .iter()
            .map(|selector| GroupingSetHashTable::new(selector.clone(), self.initial_capacity))
            .collect();

        for row in input {
            let row = row?;
            for table in &mut tables {
                table.insert_row(&row, &self.initializer, &self.updater)?;
            }
        }

        let num_groups: usize = tables.iter().map(|t| t.num_groups()).sum();
        trace!(
            num_groups,
            num_grouping_sets = tables.len(),
            "hash aggregate finished building"
        );

        let mut groups = Vec::with_capacity(num_groups);
        for table in tables {
            groups.extend(table.into_groups());
        }

        Ok(groups)
    }
}

impl Explainable for PhysicalHashAggregate {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        let mut ent = ExplainEntry::new("HashAggregate")
            .with_value("grouping_sets", self.num_grouping_sets());

        if conf.verbose {
            let sets: Vec<Vec<usize>> = self
                .selectors
                .iter()
                .map(|s| s.set_columns().collect())
                .collect();
            ent = ent.with_values(
                "grouping_set_columns",
                sets.iter().map(|set| format!("({})", ColumnIndexes(set))),
            );
        }

        ent
    }
}

enum HashAggregateState {
    /// Input not yet consumed.
    Aggregating { input: RowStream },
    /// Emitting finished groups.
    Producing {
        groups: std::vec::IntoIter<(GroupKey, Accumulator)>,
    },
    /// All groups emitted, or an error was returned.
    Finished,
}

struct HashAggregateStream {
    operator: PhysicalHashAggregate,
    state: HashAggregateState,
}

impl Iterator for HashAggregateStream {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.state, HashAggregateState::Finished) {
                HashAggregateState::Aggregating { input } => {
                    match self.operator.build_tables(input) {
                        Ok(groups) => {
                            self.state = HashAggregateState::Producing {
                                groups: groups.into_iter(),
                            };
                            // Continue, now producing.
                        }
                        Err(e) => return Some(Err(e)),
                    }
                }
                HashAggregateState::Producing { mut groups } => {
                    let (key, acc) = groups.next()?;
                    let result = self.operator.projector.project(Some(key), &acc);
                    if result.is_ok() {
                        self.state = HashAggregateState::Producing { groups };
                    }
                    return Some(result);
                }
                HashAggregateState::Finished => return None,
            }
        }
    }
}
