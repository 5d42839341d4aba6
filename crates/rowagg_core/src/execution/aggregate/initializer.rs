use std::sync::Arc;

use rowagg_error::{DbError, ErrorKind, Result, ResultExt};

use super::layout::AccumulatorStateLayout;
use crate::arrays::scalar::ScalarValue;
use crate::functions::aggregate::state::{StateSlots, StateSlotsMut};

/// State for a single group.
///
/// Exclusively owned by the operator holding the group.
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulator {
    pub(crate) slots: Vec<ScalarValue>,
}

impl Accumulator {
    pub fn slots(&self) -> &[ScalarValue] {
        &self.slots
    }
}

/// Builds fresh accumulators.
#[derive(Debug, Clone)]
pub struct AccumulatorInitializer {
    layout: Arc<AccumulatorStateLayout>,
}

impl AccumulatorInitializer {
    pub fn new(layout: Arc<AccumulatorStateLayout>) -> Self {
        AccumulatorInitializer { layout }
    }

    /// Create an accumulator with every aggregate reset to its neutral state.
    pub fn new_accumulator(&self) -> Result<Accumulator> {
        let mut slots = vec![ScalarValue::Null; self.layout.num_slots()];

        for agg in &self.layout.aggregates {
            let ctx = &agg.aggregate.context;
            let mut state = StateSlotsMut::new(&ctx.function_name, &mut slots[agg.slots.clone()]);
            agg.aggregate.function.reset(ctx, &mut state)?;
        }

        Ok(Accumulator { slots })
    }

    /// Exercise every aggregate once against a fresh accumulator, checking
    /// that no slot outside the declared layout is touched.
    ///
    /// After reset every slot must hold a value of its declared type (NULL
    /// satisfies any type). `result` then runs on the fresh state, and `add`
    /// runs with all-NULL arguments on a scratch copy. Only layout mismatches
    /// raised by those two calls fail verification. Other errors are left for
    /// execution to report.
    pub fn verify_layout(&self) -> Result<()> {
        let acc = self
            .new_accumulator()
            .context("Failed to build accumulator while verifying state layout")?;

        for agg in &self.layout.aggregates {
            for slot in agg.slots.clone() {
                let value = &acc.slots[slot];
                let declared = self.layout.slot_types[slot];
                if !value.is_null() && value.datatype() != declared {
                    return Err(DbError::state_layout_mismatch(format!(
                        "Aggregate '{}' reset a state slot to the wrong type",
                        agg.aggregate.context.function_name
                    ))
                    .with_field("slot", slot - agg.slots.start)
                    .with_field("declared", declared)
                    .with_field("got", value.datatype()));
                }
            }
        }

        let mut scratch = acc.clone();
        let null = ScalarValue::Null;
        for agg in &self.layout.aggregates {
            let ctx = &agg.aggregate.context;

            let state = StateSlots::new(&ctx.function_name, &acc.slots[agg.slots.clone()]);
            only_layout_mismatch(agg.aggregate.function.result(ctx, &state).map(|_| ()))
                .context("Result touched undeclared state while verifying state layout")?;

            let args = vec![&null; agg.aggregate.args.len()];
            let mut state =
                StateSlotsMut::new(&ctx.function_name, &mut scratch.slots[agg.slots.clone()]);
            only_layout_mismatch(agg.aggregate.function.add(ctx, &mut state, &args))
                .context("Add touched undeclared state while verifying state layout")?;
        }

        Ok(())
    }
}

fn only_layout_mismatch(res: Result<()>) -> Result<()> {
    match res {
        Err(err) if err.kind() == ErrorKind::StateLayoutMismatch => Err(err),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::datatype::DataType;
    use crate::execution::aggregate::validate::BoundAggregate;
    use crate::functions::aggregate::builtin::count::Count;
    use crate::functions::aggregate::{AggregateContext, AggregateFunction};

    /// Declares one Int64 slot but writes a string into it.
    #[derive(Debug)]
    struct WrongResetType;

    impl AggregateFunction for WrongResetType {
        fn state_types(&self, _ctx: &AggregateContext) -> Vec<DataType> {
            vec![DataType::Int64]
        }

        fn reset(&self, _ctx: &AggregateContext, state: &mut StateSlotsMut) -> Result<()> {
            state.set(0, ScalarValue::from("zero"))
        }

        fn add(
            &self,
            _ctx: &AggregateContext,
            _state: &mut StateSlotsMut,
            _args: &[&ScalarValue],
        ) -> Result<()> {
            Ok(())
        }

        fn result(&self, _ctx: &AggregateContext, state: &StateSlots) -> Result<ScalarValue> {
            Ok(state.get(0)?.clone())
        }
    }

    /// Declares one slot but resets two.
    #[derive(Debug)]
    struct TooManySlots;

    impl AggregateFunction for TooManySlots {
        fn state_types(&self, _ctx: &AggregateContext) -> Vec<DataType> {
            vec![DataType::Int64]
        }

        fn reset(&self, _ctx: &AggregateContext, state: &mut StateSlotsMut) -> Result<()> {
            state.set(0, ScalarValue::Int64(0))?;
            state.set(1, ScalarValue::Int64(0))
        }

        fn add(
            &self,
            _ctx: &AggregateContext,
            _state: &mut StateSlotsMut,
            _args: &[&ScalarValue],
        ) -> Result<()> {
            Ok(())
        }

        fn result(&self, _ctx: &AggregateContext, _state: &StateSlots) -> Result<ScalarValue> {
            Ok(ScalarValue::Null)
        }
    }

    /// Declares one slot. `result` reads a second slot, `add` writes one.
    #[derive(Debug)]
    struct UndeclaredAccess {
        in_result: bool,
    }

    impl AggregateFunction for UndeclaredAccess {
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
            if args.iter().all(|v| v.is_null()) && !self.in_result {
                return state.set(1, ScalarValue::Int64(1));
            }
            Ok(())
        }

        fn result(&self, _ctx: &AggregateContext, state: &StateSlots) -> Result<ScalarValue> {
            if self.in_result {
                return Ok(state.get(1)?.clone());
            }
            Ok(state.get(0)?.clone())
        }
    }

    /// Fails every call with an ordinary evaluation error.
    #[derive(Debug)]
    struct AlwaysFails;

    impl AggregateFunction for AlwaysFails {
        fn state_types(&self, _ctx: &AggregateContext) -> Vec<DataType> {
            vec![DataType::Int64]
        }

        fn reset(&self, _ctx: &AggregateContext, state: &mut StateSlotsMut) -> Result<()> {
            state.set(0, ScalarValue::Int64(0))
        }

        fn add(
            &self,
            _ctx: &AggregateContext,
            _state: &mut StateSlotsMut,
            _args: &[&ScalarValue],
        ) -> Result<()> {
            Err(DbError::new("add failed"))
        }

        fn result(&self, _ctx: &AggregateContext, _state: &StateSlots) -> Result<ScalarValue> {
            Err(DbError::new("result failed"))
        }
    }

    fn bound(function: Arc<dyn AggregateFunction>, name: &str) -> BoundAggregate {
        BoundAggregate {
            function,
            context: AggregateContext {
                function_name: name.to_string(),
                return_type: DataType::Int64,
                arg_types: Vec::new(),
            },
            args: Vec::new(),
        }
    }

    fn initializer(aggs: Vec<BoundAggregate>) -> AccumulatorInitializer {
        AccumulatorInitializer::new(Arc::new(AccumulatorStateLayout::new(aggs)))
    }

    #[test]
    fn fresh_accumulator_is_reset() {
        let init = initializer(vec![bound(Arc::new(Count), "count"), bound(Arc::new(Count), "count")]);

        let acc = init.new_accumulator().unwrap();
        assert_eq!(&[ScalarValue::Int64(0), ScalarValue::Int64(0)], acc.slots());
        init.verify_layout().unwrap();
    }

    #[test]
    fn wrong_reset_type_is_layout_mismatch() {
        let init = initializer(vec![bound(Arc::new(WrongResetType), "wrong")]);

        init.new_accumulator().unwrap();
        let err = init.verify_layout().unwrap_err();
        assert_eq!(ErrorKind::StateLayoutMismatch, err.kind());
    }

    #[test]
    fn undeclared_slot_is_layout_mismatch() {
        let init = initializer(vec![
            bound(Arc::new(TooManySlots), "too_many"),
            bound(Arc::new(WrongResetType), "wrong"),
        ]);

        let err = init.new_accumulator().unwrap_err();
        assert_eq!(ErrorKind::StateLayoutMismatch, err.kind());

        let err = init.verify_layout().unwrap_err();
        assert_eq!(ErrorKind::StateLayoutMismatch, err.kind());
    }

    #[test]
    fn undeclared_slot_in_result_is_layout_mismatch() {
        let init = initializer(vec![
            bound(Arc::new(Count), "count"),
            bound(Arc::new(UndeclaredAccess { in_result: true }), "reads_past"),
        ]);

        // Reset alone is fine.
        init.new_accumulator().unwrap();
        let err = init.verify_layout().unwrap_err();
        assert_eq!(ErrorKind::StateLayoutMismatch, err.kind());
    }

    #[test]
    fn undeclared_slot_in_add_is_layout_mismatch() {
        let mut agg = bound(Arc::new(UndeclaredAccess { in_result: false }), "writes_past");
        agg.args = vec![0, 1];
        let init = initializer(vec![agg]);

        init.new_accumulator().unwrap();
        let err = init.verify_layout().unwrap_err();
        assert_eq!(ErrorKind::StateLayoutMismatch, err.kind());
    }

    #[test]
    fn evaluation_errors_are_not_layout_errors() {
        let init = initializer(vec![bound(Arc::new(AlwaysFails), "fails")]);
        init.verify_layout().unwrap();
    }
}
