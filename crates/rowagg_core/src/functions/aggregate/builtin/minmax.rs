use std::cmp::Ordering;

use rowagg_error::Result;

use crate::arrays::datatype::DataType;
use crate::arrays::scalar::ScalarValue;
use crate::functions::aggregate::state::{StateSlots, StateSlotsMut};
use crate::functions::aggregate::{AggregateContext, AggregateFunction, plan_check_num_args};
use crate::functions::documentation::{Category, Documentation};
use crate::functions::function_set::AggregateFunctionSet;

pub const FUNCTION_SET_MIN: AggregateFunctionSet = AggregateFunctionSet {
    name: "min",
    aliases: &[],
    doc: Some(&Documentation {
        category: Category::GENERAL_PURPOSE_AGGREGATE,
        description: "Return the minimum non-NULL value seen from input.",
        arguments: &["input"],
    }),
    function: &Min,
};

pub const FUNCTION_SET_MAX: AggregateFunctionSet = AggregateFunctionSet {
    name: "max",
    aliases: &[],
    doc: Some(&Documentation {
        category: Category::GENERAL_PURPOSE_AGGREGATE,
        description: "Return the maximum non-NULL value seen from input.",
        arguments: &["input"],
    }),
    function: &Max,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Min;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Max;

/// Replace the value in slot 0 with `input` if the slot is NULL, or if
/// `input` compares to it as `replace_when`.
fn update_extreme(
    ctx: &AggregateContext,
    state: &mut StateSlotsMut,
    input: &ScalarValue,
    replace_when: Ordering,
) -> Result<()> {
    if input.is_null() {
        return Ok(());
    }

    let current = state.get(0)?;
    if current.is_null() || input.try_compare(current)? == replace_when {
        state.set(0, input.try_cast(ctx.return_type)?)?;
    }

    Ok(())
}

impl AggregateFunction for Min {
    fn check_arguments(&self, ctx: &AggregateContext) -> Result<()> {
        plan_check_num_args(ctx, 1)
    }

    fn state_types(&self, ctx: &AggregateContext) -> Vec<DataType> {
        vec![ctx.return_type]
    }

    fn reset(&self, _ctx: &AggregateContext, state: &mut StateSlotsMut) -> Result<()> {
        state.set(0, ScalarValue::Null)
    }

    fn add(
        &self,
        ctx: &AggregateContext,
        state: &mut StateSlotsMut,
        args: &[&ScalarValue],
    ) -> Result<()> {
        update_extreme(ctx, state, args[0], Ordering::Less)
    }

    fn result(&self, _ctx: &AggregateContext, state: &StateSlots) -> Result<ScalarValue> {
        Ok(state.get(0)?.clone())
    }
}

impl AggregateFunction for Max {
    fn check_arguments(&self, ctx: &AggregateContext) -> Result<()> {
        plan_check_num_args(ctx, 1)
    }

    fn state_types(&self, ctx: &AggregateContext) -> Vec<DataType> {
        vec![ctx.return_type]
    }

    fn reset(&self, _ctx: &AggregateContext, state: &mut StateSlotsMut) -> Result<()> {
        state.set(0, ScalarValue::Null)
    }

    fn add(
        &self,
        ctx: &AggregateContext,
        state: &mut StateSlotsMut,
        args: &[&ScalarValue],
    ) -> Result<()> {
        update_extreme(ctx, state, args[0], Ordering::Greater)
    }

    fn result(&self, _ctx: &AggregateContext, state: &StateSlots) -> Result<ScalarValue> {
        Ok(state.get(0)?.clone())
    }
}
