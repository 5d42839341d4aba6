use std::sync::Arc;

use rowagg_error::Result;

use super::initializer::Accumulator;
use super::layout::AccumulatorStateLayout;
use crate::arrays::row::Row;
use crate::execution::operators::hash_aggregate::key::GroupKey;
use crate::functions::aggregate::state::StateSlots;

/// Produces output rows from finished groups.
#[derive(Debug, Clone)]
pub struct ResultProjector {
    layout: Arc<AccumulatorStateLayout>,
}

impl ResultProjector {
    pub fn new(layout: Arc<AccumulatorStateLayout>) -> Self {
        ResultProjector { layout }
    }

    /// Build the output row for a group.
    ///
    /// Output layout: [KEY_VALS, AGG_RESULTS]. `key` is None for a global
    /// aggregate.
    pub fn project(&self, key: Option<GroupKey>, acc: &Accumulator) -> Result<Row> {
        let mut columns = match key {
            Some(key) => key.into_values(),
            None => Vec::new(),
        };
        columns.reserve(self.layout.aggregates.len());

        for agg in &self.layout.aggregates {
            let ctx = &agg.aggregate.context;
            let state = StateSlots::new(&ctx.function_name, &acc.slots[agg.slots.clone()]);
            columns.push(agg.aggregate.function.result(ctx, &state)?);
        }

        Ok(Row::new(columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::datatype::DataType;
    use crate::arrays::scalar::ScalarValue;
    use crate::execution::aggregate::initializer::AccumulatorInitializer;
    use crate::execution::aggregate::updater::AccumulatorUpdater;
    use crate::execution::aggregate::validate::validate_aggregate;
    use crate::functions::registry::FunctionRegistry;
    use crate::logical::logical_aggregate::{AggregateCallSpec, GroupSpec, LogicalAggregate};

    fn layout() -> Arc<AccumulatorStateLayout> {
        let registry = FunctionRegistry::with_builtins().unwrap();
        let agg = LogicalAggregate::new(
            GroupSpec::simple([0]),
            vec![
                AggregateCallSpec::new("count", vec![], DataType::Int64),
                AggregateCallSpec::new("sum", vec![1], DataType::Int64),
                AggregateCallSpec::new("max", vec![1], DataType::Int64),
            ],
        );
        let bound =
            validate_aggregate(&agg, &[DataType::Int32, DataType::Int64], &registry).unwrap();
        Arc::new(AccumulatorStateLayout::new(bound))
    }

    #[test]
    fn fold_then_project() {
        let layout = layout();
        let init = AccumulatorInitializer::new(layout.clone());
        let updater = AccumulatorUpdater::new(layout.clone());
        let projector = ResultProjector::new(layout);

        let mut acc = init.new_accumulator().unwrap();
        for sal in [100, 200] {
            let row = Row::new(vec![ScalarValue::Int32(10), ScalarValue::Int64(sal)]);
            updater.update(&mut acc, &row).unwrap();
        }

        let key = GroupKey(vec![ScalarValue::Int32(10)]);
        let out = projector.project(Some(key), &acc).unwrap();
        assert_eq!(
            Row::new(vec![
                ScalarValue::Int32(10),
                ScalarValue::Int64(2),
                ScalarValue::Int64(300),
                ScalarValue::Int64(200),
            ]),
            out
        );
    }

    #[test]
    fn project_fresh_accumulator_without_key() {
        let layout = layout();
        let init = AccumulatorInitializer::new(layout.clone());
        let projector = ResultProjector::new(layout);

        let acc = init.new_accumulator().unwrap();
        let out = projector.project(None, &acc).unwrap();
        assert_eq!(
            Row::new(vec![
                ScalarValue::Int64(0),
                ScalarValue::Null,
                ScalarValue::Null,
            ]),
            out
        );
    }

    #[test]
    fn update_missing_argument_column_errors() {
        let layout = layout();
        let init = AccumulatorInitializer::new(layout.clone());
        let updater = AccumulatorUpdater::new(layout);

        let mut acc = init.new_accumulator().unwrap();
        let short_row = Row::new(vec![ScalarValue::Int32(10)]);
        updater.update(&mut acc, &short_row).unwrap_err();
    }
}
