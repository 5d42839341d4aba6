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

pub const FUNCTION_SET_BOOL_AND: AggregateFunctionSet = AggregateFunctionSet {
    name: "bool_and",
    aliases: &["every"],
    doc: Some(&Documentation {
        category: Category::GENERAL_PURPOSE_AGGREGATE,
        description: "Returns true if all non-NULL inputs are true, otherwise false.",
        arguments: &["input"],
    }),
    function: &BoolAnd,
};

pub const FUNCTION_SET_BOOL_OR: AggregateFunctionSet = AggregateFunctionSet {
    name: "bool_or",
    aliases: &["some"],
    doc: Some(&Documentation {
        category: Category::GENERAL_PURPOSE_AGGREGATE,
        description: "Returns true if any non-NULL input is true, otherwise false.",
        arguments: &["input"],
    }),
    function: &BoolOr,
};

fn check_bool_arguments(ctx: &AggregateContext) -> Result<()> {
    plan_check_num_args(ctx, 1)?;
    plan_check_return_type(ctx, |dt| *dt == DataType::Boolean)?;
    plan_check_arg_type(ctx, 0, |dt| *dt == DataType::Boolean)
}

/// Combine a non-null boolean input into slot 0 using `op`.
fn fold_bool(
    state: &mut StateSlotsMut,
    input: &ScalarValue,
    op: impl Fn(bool, bool) -> bool,
) -> Result<()> {
    if input.is_null() {
        return Ok(());
    }

    let input = input.try_as_bool()?;
    let next = match state.get(0)? {
        ScalarValue::Null => input,
        current => op(current.try_as_bool()?, input),
    };

    state.set(0, ScalarValue::Boolean(next))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoolAnd;

impl AggregateFunction for BoolAnd {
    fn check_arguments(&self, ctx: &AggregateContext) -> Result<()> {
        check_bool_arguments(ctx)
    }

    fn state_types(&self, _ctx: &AggregateContext) -> Vec<DataType> {
        vec![DataType::Boolean]
    }

    fn reset(&self, _ctx: &AggregateContext, state: &mut StateSlotsMut) -> Result<()> {
        state.set(0, ScalarValue::Null)
    }

    fn add(
        &self,
        _ctx: &AggregateContext,
        state: &mut StateSlotsMut,
        args: &[&ScalarValue],
    ) -> Result<()> {
        fold_bool(state, args[0], |a, b| a && b)
    }

    fn result(&self, _ctx: &AggregateContext, state: &StateSlots) -> Result<ScalarValue> {
        Ok(state.get(0)?.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoolOr;

impl AggregateFunction for BoolOr {
    fn check_arguments(&self, ctx: &AggregateContext) -> Result<()> {
        check_bool_arguments(ctx)
    }

    fn state_types(&self, _ctx: &AggregateContext) -> Vec<DataType> {
        vec![DataType::Boolean]
    }

    fn reset(&self, _ctx: &AggregateContext, state: &mut StateSlotsMut) -> Result<()> {
        state.set(0, ScalarValue::Null)
    }

    fn add(
        &self,
        _ctx: &AggregateContext,
        state: &mut StateSlotsMut,
        args: &[&ScalarValue],
    ) -> Result<()> {
        fold_bool(state, args[0], |a, b| a || b)
    }

    fn result(&self, _ctx: &AggregateContext, state: &StateSlots) -> Result<ScalarValue> {
        Ok(state.get(0)?.clone())
    }
}
