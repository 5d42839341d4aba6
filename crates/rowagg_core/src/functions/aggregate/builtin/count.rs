use rowagg_error::Result;

use crate::arrays::datatype::DataType;
use crate::arrays::scalar::ScalarValue;
use crate::functions::aggregate::state::{StateSlots, StateSlotsMut};
use crate::functions::aggregate::{AggregateContext, AggregateFunction, plan_check_return_type};
use crate::functions::documentation::{Category, Documentation};
use crate::functions::function_set::AggregateFunctionSet;

pub const FUNCTION_SET_COUNT: AggregateFunctionSet = AggregateFunctionSet {
    name: "count",
    aliases: &[],
    doc: Some(&Documentation {
        category: Category::GENERAL_PURPOSE_AGGREGATE,
        description: "Return the count of rows where every input is non-NULL. Counts all rows when called with no inputs.",
        arguments: &["inputs"],
    }),
    function: &Count,
};

/// COUNT(*) when called without arguments, COUNT(a, b, ...) otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Count;

impl AggregateFunction for Count {
    fn check_arguments(&self, ctx: &AggregateContext) -> Result<()> {
        plan_check_return_type(ctx, DataType::is_integer)
    }

    fn state_types(&self, _ctx: &AggregateContext) -> Vec<DataType> {
        vec![DataType::Int64]
    }

    fn reset(&self, _ctx: &AggregateContext, state: &mut StateSlotsMut) -> Result<()> {
        state.set(0, ScalarValue::Int64(0))
    }

    fn add(
        &self,
        _ctx: &AggregateContext,
        state: &mut StateSlotsMut,
        args: &[&ScalarValue],
    ) -> Result<()> {
        if args.iter().any(|arg| arg.is_null()) {
            return Ok(());
        }

        let count = state.get_mut(0)?;
        *count = count.checked_add(&ScalarValue::Int64(1))?;
        Ok(())
    }

    fn result(&self, ctx: &AggregateContext, state: &StateSlots) -> Result<ScalarValue> {
        state.get(0)?.try_cast(ctx.return_type)
    }
}
