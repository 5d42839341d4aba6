use std::ops::Range;

use super::validate::BoundAggregate;
use crate::arrays::datatype::DataType;

/// A bound aggregate and the contiguous range of accumulator slots it owns.
#[derive(Debug, Clone)]
pub struct SlottedAggregate {
    pub aggregate: BoundAggregate,
    pub slots: Range<usize>,
}

/// Describes the combined state record for a single group.
///
/// Slots are partitioned per aggregate in call order. An aggregate declaring
/// no state owns an empty range and contributes no storage.
#[derive(Debug, Clone)]
pub struct AccumulatorStateLayout {
    /// Types of every slot in the record.
    pub(crate) slot_types: Vec<DataType>,
    /// Aggregates in call order.
    pub(crate) aggregates: Vec<SlottedAggregate>,
}

impl AccumulatorStateLayout {
    pub fn new(aggregates: impl IntoIterator<Item = BoundAggregate>) -> Self {
        let mut slot_types = Vec::new();

        let aggregates = aggregates
            .into_iter()
            .map(|aggregate| {
                let start = slot_types.len();
                slot_types.extend(aggregate.function.state_types(&aggregate.context));
                SlottedAggregate {
                    aggregate,
                    slots: start..slot_types.len(),
                }
            })
            .collect();

        AccumulatorStateLayout {
            slot_types,
            aggregates,
        }
    }

    pub fn num_slots(&self) -> usize {
        self.slot_types.len()
    }

    pub fn slot_types(&self) -> &[DataType] {
        &self.slot_types
    }

    pub fn aggregates(&self) -> &[SlottedAggregate] {
        &self.aggregates
    }

    /// Declared result type of each aggregate, in call order.
    pub fn result_types(&self) -> impl Iterator<Item = DataType> + '_ {
        self.aggregates
            .iter()
            .map(|agg| agg.aggregate.context.return_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::aggregate::validate::validate_aggregate;
    use crate::functions::registry::FunctionRegistry;
    use crate::logical::logical_aggregate::{AggregateCallSpec, GroupSpec, LogicalAggregate};

    #[test]
    fn slot_count_is_sum_of_state_types() {
        let registry = FunctionRegistry::with_builtins().unwrap();
        let input = [DataType::Int32, DataType::Int64];
        let agg = LogicalAggregate::new(
            GroupSpec::simple([0]),
            vec![
                AggregateCallSpec::new("count", vec![], DataType::Int64),
                AggregateCallSpec::new("sum", vec![1], DataType::Int64),
                AggregateCallSpec::new("avg", vec![1], DataType::Float64),
                AggregateCallSpec::new("min", vec![0], DataType::Int32),
            ],
        );

        let bound = validate_aggregate(&agg, &input, &registry).unwrap();
        let expected: usize = bound
            .iter()
            .map(|b| b.function.state_types(&b.context).len())
            .sum();

        let layout = AccumulatorStateLayout::new(bound);
        assert_eq!(expected, layout.num_slots());
        assert_eq!(
            vec![
                DataType::Int64,
                DataType::Int64,
                DataType::Boolean,
                DataType::Float64,
                DataType::Int64,
                DataType::Int32,
            ],
            layout.slot_types()
        );

        let ranges: Vec<_> = layout.aggregates().iter().map(|a| a.slots.clone()).collect();
        assert_eq!(vec![0..1, 1..3, 3..5, 5..6], ranges);
    }

    #[test]
    fn no_aggregates_no_slots() {
        let layout = AccumulatorStateLayout::new([]);
        assert_eq!(0, layout.num_slots());
        assert!(layout.aggregates().is_empty());
    }
}
