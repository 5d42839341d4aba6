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

pub const FUNCTION_SET_SUM: AggregateFunctionSet = AggregateFunctionSet {
    name: "sum",
    aliases: &[],
    doc: Some(&Documentation {
        category: Category::GENERAL_PURPOSE_AGGREGATE,
        description: "Compute the sum of all non-NULL inputs. Returns NULL if there were no non-NULL inputs.",
        arguments: &["input"],
    }),
    function: &Sum,
};

pub const FUNCTION_SET_SUM0: AggregateFunctionSet = AggregateFunctionSet {
    name: "sum0",
    aliases: &["$sum0"],
    doc: Some(&Documentation {
        category: Category::GENERAL_PURPOSE_AGGREGATE,
        description: "Compute the sum of all non-NULL inputs. Returns zero if there were no non-NULL inputs.",
        arguments: &["input"],
    }),
    function: &Sum0,
};

fn check_sum_arguments(ctx: &AggregateContext) -> Result<()> {
    plan_check_num_args(ctx, 1)?;
    plan_check_arg_type(ctx, 0, DataType::is_numeric)?;
    plan_check_return_type(ctx, DataType::is_numeric)
}

/// Add a non-null input to the running sum in slot 0. Returns false if the
/// input was NULL.
fn add_to_sum(ctx: &AggregateContext, state: &mut StateSlotsMut, arg: &ScalarValue) -> Result<bool> {
    if arg.is_null() {
        return Ok(false);
    }

    let input = arg.try_cast(ctx.return_type)?;
    let sum = state.get_mut(0)?;
    *sum = sum.checked_add(&input)?;

    Ok(true)
}

/// Sum with NULL result on empty input.
///
/// State: [running sum, saw non-null input]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sum;

impl AggregateFunction for Sum {
    fn check_arguments(&self, ctx: &AggregateContext) -> Result<()> {
        check_sum_arguments(ctx)
    }

    fn state_types(&self, ctx: &AggregateContext) -> Vec<DataType> {
        vec![ctx.return_type, DataType::Boolean]
    }

    fn reset(&self, ctx: &AggregateContext, state: &mut StateSlotsMut) -> Result<()> {
        state.set(0, ScalarValue::zero(ctx.return_type)?)?;
        state.set(1, ScalarValue::Boolean(false))
    }

    fn add(
        &self,
        ctx: &AggregateContext,
        state: &mut StateSlotsMut,
        args: &[&ScalarValue],
    ) -> Result<()> {
        if add_to_sum(ctx, state, args[0])? {
            state.set(1, ScalarValue::Boolean(true))?;
        }
        Ok(())
    }

    fn result(&self, _ctx: &AggregateContext, state: &StateSlots) -> Result<ScalarValue> {
        if state.get(1)?.try_as_bool()? {
            Ok(state.get(0)?.clone())
        } else {
            Ok(ScalarValue::Null)
        }
    }
}

/// Sum with zero result on empty input.
///
/// State: [running sum]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sum0;

impl AggregateFunction for Sum0 {
    fn check_arguments(&self, ctx: &AggregateContext) -> Result<()> {
        check_sum_arguments(ctx)
    }

    fn state_types(&self, ctx: &AggregateContext) -> Vec<DataType> {
        vec![ctx.return_type]
    }

    fn reset(&self, ctx: &AggregateContext, state: &mut StateSlotsMut) -> Result<()> {
        state.set(0, ScalarValue::zero(ctx.return_type)?)
    }

    fn add(
        &self,
        ctx: &AggregateContext,
        state: &mut StateSlotsMut,
        args: &[&ScalarValue],
    ) -> Result<()> {
        add_to_sum(ctx, state, args[0])?;
        Ok(())
    }

    fn result(&self, _ctx: &AggregateContext, state: &StateSlots) -> Result<ScalarValue> {
        Ok(state.get(0)?.clone())
    }
}

#[cfg(test)]
mod tests {
    use rowagg_error::ErrorKind;

    use super::*;
    use crate::functions::aggregate::builtin::testutil::{context, fold_all};

    #[test]
    fn sum_i32_into_i64() {
        let ctx = context("sum", DataType::Int64, &[DataType::Int32]);
        let out = fold_all(
            &Sum,
            &ctx,
            &[
                vec![ScalarValue::Int32(100)],
                vec![ScalarValue::Null],
                vec![ScalarValue::Int32(200)],
            ],
        )
        .unwrap();
        assert_eq!(ScalarValue::Int64(300), out);
    }

    #[test]
    fn sum_empty_is_null() {
        let ctx = context("sum", DataType::Int64, &[DataType::Int64]);
        let out = fold_all(&Sum, &ctx, &[vec![ScalarValue::Null]]).unwrap();
        assert_eq!(ScalarValue::Null, out);
    }

    #[test]
    fn sum0_empty_is_zero() {
        let ctx = context("sum0", DataType::Float64, &[DataType::Float64]);
        let out = fold_all(&Sum0, &ctx, &[]).unwrap();
        assert_eq!(ScalarValue::Float64(0.0), out);
    }

    #[test]
    fn sum_overflow_errors() {
        let ctx = context("sum", DataType::Int8, &[DataType::Int8]);
        fold_all(
            &Sum,
            &ctx,
            &[vec![ScalarValue::Int8(100)], vec![ScalarValue::Int8(100)]],
        )
        .unwrap_err();
    }

    #[test]
    fn sum_requires_one_argument() {
        let ctx = context("sum", DataType::Int64, &[]);
        fold_all(&Sum, &ctx, &[]).unwrap_err();
    }

    #[test]
    fn sum_rejects_non_numeric_input() {
        for arg in [DataType::Utf8, DataType::Boolean] {
            let ctx = context("sum", DataType::Int64, &[arg]);
            let err = fold_all(&Sum, &ctx, &[]).unwrap_err();
            assert_eq!(ErrorKind::InvalidInput, err.kind());

            let ctx = context("sum0", DataType::Int64, &[arg]);
            let err = fold_all(&Sum0, &ctx, &[]).unwrap_err();
            assert_eq!(ErrorKind::InvalidInput, err.kind());
        }

        let ctx = context("sum", DataType::Int64, &[DataType::Null]);
        assert_eq!(ScalarValue::Null, fold_all(&Sum, &ctx, &[]).unwrap());
    }
}
