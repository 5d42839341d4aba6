pub mod builtin;
pub mod state;

use std::fmt::Debug;

use rowagg_error::{DbError, Result};
use serde::{Deserialize, Serialize};
use state::{StateSlots, StateSlotsMut};

use crate::arrays::datatype::DataType;
use crate::arrays::scalar::ScalarValue;

/// Everything an aggregate implementation may know about a single call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateContext {
    /// Name the function was called with.
    pub function_name: String,
    /// Declared result type of the call.
    pub return_type: DataType,
    /// Types of the input columns passed as arguments, in argument order.
    pub arg_types: Vec<DataType>,
}

/// Per-function aggregate logic.
///
/// An implementation describes the shape of the state it needs for a single
/// group, and how to reset, update and finalize that state. The state itself
/// is owned by the caller. Each call gets a view containing exactly the
/// slots returned by `state_types`, and touching any other slot is reported
/// as a state layout mismatch.
///
/// Implementations must be stateless. A single implementation is shared
/// between every call site and every group.
pub trait AggregateFunction: Debug + Sync + Send {
    /// Verify the call site is something this function can handle.
    fn check_arguments(&self, ctx: &AggregateContext) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Types of the state slots this function needs per group.
    ///
    /// May be empty.
    fn state_types(&self, ctx: &AggregateContext) -> Vec<DataType>;

    /// Write the neutral value into every slot.
    fn reset(&self, ctx: &AggregateContext, state: &mut StateSlotsMut) -> Result<()>;

    /// Fold one row's argument values into the state.
    fn add(
        &self,
        ctx: &AggregateContext,
        state: &mut StateSlotsMut,
        args: &[&ScalarValue],
    ) -> Result<()>;

    /// Produce the final value from the state.
    fn result(&self, ctx: &AggregateContext, state: &StateSlots) -> Result<ScalarValue>;
}

impl<F> AggregateFunction for &F
where
    F: AggregateFunction + ?Sized,
{
    fn check_arguments(&self, ctx: &AggregateContext) -> Result<()> {
        (**self).check_arguments(ctx)
    }

    fn state_types(&self, ctx: &AggregateContext) -> Vec<DataType> {
        (**self).state_types(ctx)
    }

    fn reset(&self, ctx: &AggregateContext, state: &mut StateSlotsMut) -> Result<()> {
        (**self).reset(ctx, state)
    }

    fn add(
        &self,
        ctx: &AggregateContext,
        state: &mut StateSlotsMut,
        args: &[&ScalarValue],
    ) -> Result<()> {
        (**self).add(ctx, state, args)
    }

    fn result(&self, ctx: &AggregateContext, state: &StateSlots) -> Result<ScalarValue> {
        (**self).result(ctx, state)
    }
}

/// Check that the call site passes exactly `expected` arguments.
pub fn plan_check_num_args(ctx: &AggregateContext, expected: usize) -> Result<()> {
    if ctx.arg_types.len() != expected {
        return Err(DbError::invalid_input(format!(
            "Expected {} {} for '{}', received {}",
            expected,
            if expected == 1 { "input" } else { "inputs" },
            ctx.function_name,
            ctx.arg_types.len(),
        )));
    }
    Ok(())
}

/// Check that the declared return type satisfies `pred`.
pub fn plan_check_return_type(
    ctx: &AggregateContext,
    pred: impl Fn(&DataType) -> bool,
) -> Result<()> {
    if !pred(&ctx.return_type) {
        return Err(DbError::invalid_input(format!(
            "Unsupported return type {} for '{}'",
            ctx.return_type, ctx.function_name
        ))
        .with_field("arg_types", &ctx.arg_types));
    }
    Ok(())
}

/// Check that the argument at `idx` satisfies `pred`. A NULL-typed argument
/// is always accepted.
pub fn plan_check_arg_type(
    ctx: &AggregateContext,
    idx: usize,
    pred: impl Fn(&DataType) -> bool,
) -> Result<()> {
    match ctx.arg_types.get(idx) {
        Some(DataType::Null) => Ok(()),
        Some(dt) if pred(dt) => Ok(()),
        Some(dt) => Err(DbError::invalid_input(format!(
            "Unsupported input type {} for '{}'",
            dt, ctx.function_name
        ))
        .with_field("argument", idx)),
        None => Err(DbError::invalid_input(format!(
            "Missing input {} for '{}'",
            idx, ctx.function_name
        ))),
    }
}
