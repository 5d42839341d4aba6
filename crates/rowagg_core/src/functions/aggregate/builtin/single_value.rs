use rowagg_error::{DbError, Result};

use crate::arrays::datatype::DataType;
use crate::arrays::scalar::ScalarValue;
use crate::functions::aggregate::state::{StateSlots, StateSlotsMut};
use crate::functions::aggregate::{AggregateContext, AggregateFunction, plan_check_num_args};
use crate::functions::documentation::{Category, Documentation};
use crate::functions::function_set::AggregateFunctionSet;

pub const FUNCTION_SET_SINGLE_VALUE: AggregateFunctionSet = AggregateFunctionSet {
    name: "single_value",
    aliases: &[],
    doc: Some(&Documentation {
        category: Category::GENERAL_PURPOSE_AGGREGATE,
        description: "Return the only value in the group, erroring if the group has more than one row. Used for scalar subqueries.",
        arguments: &["input"],
    }),
    function: &SingleValue,
};

/// State: [value, seen a row]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleValue;

impl AggregateFunction for SingleValue {
    fn check_arguments(&self, ctx: &AggregateContext) -> Result<()> {
        plan_check_num_args(ctx, 1)
    }

    fn state_types(&self, ctx: &AggregateContext) -> Vec<DataType> {
        vec![ctx.return_type, DataType::Boolean]
    }

    fn reset(&self, _ctx: &AggregateContext, state: &mut StateSlotsMut) -> Result<()> {
        state.set(0, ScalarValue::Null)?;
        state.set(1, ScalarValue::Boolean(false))
    }

    fn add(
        &self,
        ctx: &AggregateContext,
        state: &mut StateSlotsMut,
        args: &[&ScalarValue],
    ) -> Result<()> {
        if state.get(1)?.try_as_bool()? {
            return Err(DbError::new(format!(
                "More than one value in aggregate '{}'",
                ctx.function_name
            )));
        }

        state.set(0, args[0].try_cast(ctx.return_type)?)?;
        state.set(1, ScalarValue::Boolean(true))
    }

    fn result(&self, _ctx: &AggregateContext, state: &StateSlots) -> Result<ScalarValue> {
        Ok(state.get(0)?.clone())
    }
}
