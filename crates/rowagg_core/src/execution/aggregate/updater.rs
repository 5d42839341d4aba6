use std::sync::Arc;

use rowagg_error::Result;

use super::initializer::Accumulator;
use super::layout::AccumulatorStateLayout;
use crate::arrays::row::Row;
use crate::functions::aggregate::state::StateSlotsMut;

/// Folds input rows into an accumulator.
#[derive(Debug, Clone)]
pub struct AccumulatorUpdater {
    layout: Arc<AccumulatorStateLayout>,
}

impl AccumulatorUpdater {
    pub fn new(layout: Arc<AccumulatorStateLayout>) -> Self {
        AccumulatorUpdater { layout }
    }

    /// Fold a single row into every aggregate's slots.
    ///
    /// Aggregates are updated independently, each seeing only its own slots
    /// and its own argument columns.
    pub fn update(&self, acc: &mut Accumulator, row: &Row) -> Result<()> {
        let mut args = Vec::new();

        for agg in &self.layout.aggregates {
            args.clear();
            for &col in &agg.aggregate.args {
                args.push(row.try_column(col)?);
            }

            let ctx = &agg.aggregate.context;
            let mut state =
                StateSlotsMut::new(&ctx.function_name, &mut acc.slots[agg.slots.clone()]);
            agg.aggregate.function.add(ctx, &mut state, &args)?;
        }

        Ok(())
    }
}
