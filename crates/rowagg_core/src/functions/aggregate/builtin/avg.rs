use rowagg_error::Result;

use crate::arrays::datatype::DataType;
use crate::arrays::scalar::ScalarValue;
use crate::functions::aggregate::state::{StateSlots, StateSlotsMut};
use crate::functions::aggregate::{
    AggregateContext,
    AggregateFunction,
    plan_check_arg_type,
    plan_check_num_args,
    plan_check_return_type,
};
use crate::functions::documentation::{Category, Documentation};
use crate::functions::function_set::AggregateFunctionSet;

pub const FUNCTION_SET_AVG: AggregateFunctionSet = AggregateFunctionSet {
    name: "avg",
    aliases: &["mean"],
    doc: Some(&Documentation {
        category: Category::STATISTICAL_AGGREGATE,
        description: "Return the average value from the inputs.",
        arguments: &["input"],
    }),
    function: &Avg,
};

/// State: [running sum as f64, count of non-null inputs]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Avg;

impl AggregateFunction for Avg {
    fn check_arguments(&self, ctx: &AggregateContext) -> Result<()> {
        plan_check_num_args(ctx, 1)?;
        plan_check_arg_type(ctx, 0, DataType::is_numeric)?;
        plan_check_return_type(ctx, DataType::is_float)
    }

    fn state_types(&self, _ctx: &AggregateContext) -> Vec<DataType> {
        vec![DataType::Float64, DataType::Int64]
    }

    fn reset(&self, _ctx: &AggregateContext, state: &mut StateSlotsMut) -> Result<()> {
        state.set(0, ScalarValue::Float64(0.0))?;
        state.set(1, ScalarValue::Int64(0))
    }

    fn add(
        &self,
        _ctx: &AggregateContext,
        state: &mut StateSlotsMut,
        args: &[&ScalarValue],
    ) -> Result<()> {
        let input = args[0];
        if input.is_null() {
            return Ok(());
        }

        let sum = state.get(0)?.try_as_f64()? + input.try_as_f64()?;
        state.set(0, ScalarValue::Float64(sum))?;

        let count = state.get_mut(1)?;
        *count = count.checked_add(&ScalarValue::Int64(1))?;

        Ok(())
    }

    fn result(&self, ctx: &AggregateContext, state: &StateSlots) -> Result<ScalarValue> {
        let count = state.get(1)?.try_as_i64()?;
        if count == 0 {
            return Ok(ScalarValue::Null);
        }

        let sum = state.get(0)?.try_as_f64()?;
        ScalarValue::Float64(sum / count as f64).try_cast(ctx.return_type)
    }
}
