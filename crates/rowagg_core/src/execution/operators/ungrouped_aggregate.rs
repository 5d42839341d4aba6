use rowagg_error::Result;
use tracing::trace;

use crate::arrays::row::Row;
use crate::execution::aggregate::initializer::AccumulatorInitializer;
use crate::execution::aggregate::projector::ResultProjector;
use crate::execution::aggregate::updater::AccumulatorUpdater;
use crate::execution::source::RowStream;
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};

/// Aggregate with no group columns.
///
/// Always produces exactly one row, even when the input is empty.
#[derive(Debug, Clone)]
pub struct PhysicalUngroupedAggregate {
    initializer: AccumulatorInitializer,
    updater: AccumulatorUpdater,
    projector: ResultProjector,
}

impl PhysicalUngroupedAggregate {
    pub fn new(
        initializer: AccumulatorInitializer,
        updater: AccumulatorUpdater,
        projector: ResultProjector,
    ) -> Self {
        PhysicalUngroupedAggregate {
            initializer,
            updater,
            projector,
        }
    }

    pub fn execute(&self, input: RowStream) -> RowStream {
        Box::new(UngroupedAggregateStream {
            operator: self.clone(),
            state: UngroupedAggregateState::Aggregating { input },
        })
    }

    fn aggregate_all(&self, input: RowStream) -> Result<Row> {
        let mut acc = self.initializer.new_accumulator()?;
        let mut num_rows = 0;
        for row in input {
            self.updater.update(&mut acc, &row?)?;
            num_rows += 1;
        }
        trace!(num_rows, "ungrouped aggregate finished");

        self.projector.project(None, &acc)
    }
}

impl Explainable for PhysicalUngroupedAggregate {
    fn explain_entry(&self, _conf: ExplainConfig) -> ExplainEntry {
        ExplainEntry::new("UngroupedAggregate")
    }
}

enum UngroupedAggregateState {
    /// Input not yet consumed.
    Aggregating { input: RowStream },
    /// Output row produced, or an error was returned.
    Finished,
}

struct UngroupedAggregateStream {
    operator: PhysicalUngroupedAggregate,
    state: UngroupedAggregateState,
}

impl Iterator for UngroupedAggregateStream {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match std::mem::replace(&mut self.state, UngroupedAggregateState::Finished) {
            UngroupedAggregateState::Aggregating { input } => {
                Some(self.operator.aggregate_all(input))
            }
            UngroupedAggregateState::Finished => None,
        }
    }
}
