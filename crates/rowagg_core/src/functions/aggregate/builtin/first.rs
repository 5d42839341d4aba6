use rowagg_error::Result;

use crate::arrays::datatype::DataType;
use crate::arrays::scalar::ScalarValue;
use crate::functions::aggregate::state::{StateSlots, StateSlotsMut};
use crate::functions::aggregate::{AggregateContext, AggregateFunction, plan_check_num_args};
use crate::functions::documentation::{Category, Documentation};
use crate::functions::function_set::AggregateFunctionSet;

pub const FUNCTION_SET_FIRST: AggregateFunctionSet = AggregateFunctionSet {
    name: "first",
    aliases: &["any_value"],
    doc: Some(&Documentation {
        category: Category::GENERAL_PURPOSE_AGGREGATE,
        description: "Return the first non-NULL value.",
        arguments: &["input"],
    }),
    function: &First,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct First;

impl AggregateFunction for First {
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
        if state.get(0)?.is_null() && !args[0].is_null() {
            state.set(0, args[0].try_cast(ctx.return_type)?)?;
        }
        Ok(())
    }

    fn result(&self, _ctx: &AggregateContext, state: &StateSlots) -> Result<ScalarValue> {
        Ok(state.get(0)?.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::aggregate::builtin::testutil::{context, fold_all};

    #[test]
    fn first_non_null() {
        let ctx = context("first", DataType::Utf8, &[DataType::Utf8]);
        let out = fold_all(
            &First,
            &ctx,
            &[vec![ScalarValue::Null], vec!["b".into()], vec!["a".into()]],
        )
        .unwrap();
        assert_eq!(ScalarValue::Utf8("b".to_string()), out);
    }
}
