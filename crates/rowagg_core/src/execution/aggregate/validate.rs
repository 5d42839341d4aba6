use std::fmt;
use std::sync::Arc;

use rowagg_error::{DbError, Result, ResultExt};

use crate::arrays::datatype::DataType;
use crate::functions::aggregate::{AggregateContext, AggregateFunction};
use crate::functions::registry::FunctionRegistry;
use crate::logical::logical_aggregate::{AggregateCallSpec, GroupSpec, LogicalAggregate};

/// An aggregate call resolved to its strategy.
#[derive(Debug, Clone)]
pub struct BoundAggregate {
    pub function: Arc<dyn AggregateFunction>,
    pub context: AggregateContext,
    /// Input columns to pass as arguments, in argument order.
    pub args: Vec<usize>,
}

impl fmt::Display for BoundAggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.context.function_name)?;
        for (idx, col) in self.args.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "#{col}")?;
        }
        write!(f, ") -> {}", self.context.return_type)
    }
}

/// Check that a logical aggregate can be compiled against an input with the
/// given column types, binding every call to its registered strategy.
///
/// Nothing is built unless every check passes. Calls are checked in
/// declaration order and the first failure is returned.
pub fn validate_aggregate(
    agg: &LogicalAggregate,
    input_types: &[DataType],
    registry: &FunctionRegistry,
) -> Result<Vec<BoundAggregate>> {
    validate_group(&agg.group, input_types.len())?;

    agg.aggregates
        .iter()
        .enumerate()
        .map(|(idx, call)| {
            bind_call(call, input_types, registry)
                .map_err(|e| e.with_field("aggregate_idx", idx))
        })
        .collect()
}

fn validate_group(group: &GroupSpec, num_columns: usize) -> Result<()> {
    if let Some(&col) = group.group_set.iter().find(|&&col| col >= num_columns) {
        return Err(DbError::invalid_input("Group column out of range for input")
            .with_field("column", col)
            .with_field("num_columns", num_columns));
    }

    if let Some(sets) = &group.grouping_sets {
        if sets.is_empty() {
            return Err(DbError::invalid_input(
                "Grouping sets must contain at least one set",
            ));
        }

        for (idx, set) in sets.iter().enumerate() {
            if !set.is_subset(&group.group_set) {
                return Err(DbError::invalid_input(
                    "Grouping set is not a subset of the group key",
                )
                .with_field("grouping_set_idx", idx)
                .with_field("grouping_set", set)
                .with_field("group_set", &group.group_set));
            }
        }
    }

    Ok(())
}

fn bind_call(
    call: &AggregateCallSpec,
    input_types: &[DataType],
    registry: &FunctionRegistry,
) -> Result<BoundAggregate> {
    if call.distinct {
        return Err(DbError::unsupported_aggregation(
            "distinct aggregation not supported",
        ));
    }

    let function = registry.get_aggregate(&call.function).ok_or_else(|| {
        DbError::unsupported_aggregation(format!("aggregation {} not supported", call.function))
    })?;

    let arg_types = call
        .args
        .iter()
        .map(|&col| {
            input_types.get(col).copied().ok_or_else(|| {
                DbError::invalid_input("Aggregate argument column out of range for input")
                    .with_field("column", col)
                    .with_field("num_columns", input_types.len())
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let context = AggregateContext {
        function_name: call.function.clone(),
        return_type: call.return_type,
        arg_types,
    };

    function
        .check_arguments(&context)
        .context_fn(|| format!("Invalid call to aggregate '{}'", call.function))?;

    Ok(BoundAggregate {
        function: function.clone(),
        context,
        args: call.args.clone(),
    })
}
