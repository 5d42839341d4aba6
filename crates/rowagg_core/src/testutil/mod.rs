//! Test utilities.
//!
//! Note this this isn't behind a `#[cfg(test)]` flag since this should be
//! usable from integration tests.
//!
//! Should not be used outside of tests.

use std::sync::Arc;

use rowagg_error::Result;

use crate::arrays::datatype::DataType;
use crate::arrays::row::Row;
use crate::arrays::scalar::ScalarValue;
use crate::config::execution::AggregatePlanConfig;
use crate::execution::planner::plan_aggregate::{AggregatePlanner, CompiledAggregate};
use crate::execution::source::{MemorySource, RowSource, RowStream};
use crate::functions::registry::FunctionRegistry;
use crate::logical::logical_aggregate::LogicalAggregate;

/// Create a row from values of a single type.
pub fn row<V: Into<ScalarValue>>(values: impl IntoIterator<Item = V>) -> Row {
    values.into_iter().map(Into::into).collect()
}

/// Create a restartable source from rows.
#[track_caller]
pub fn memory_source(types: Vec<DataType>, rows: Vec<Row>) -> Arc<dyn RowSource> {
    Arc::new(MemorySource::new(types, rows).unwrap())
}

/// Compile an aggregate against the builtin registry with default config.
pub fn compile(agg: &LogicalAggregate, input: Arc<dyn RowSource>) -> Result<CompiledAggregate> {
    let registry = FunctionRegistry::with_builtins()?;
    AggregatePlanner::new(&registry, AggregatePlanConfig::default()).plan(agg, input)
}

/// Drain a stream, returning the first error encountered.
pub fn collect_rows(stream: RowStream) -> Result<Vec<Row>> {
    stream.collect()
}

/// Compile and fully execute an aggregate over in-memory rows.
pub fn run_aggregate(
    agg: &LogicalAggregate,
    types: Vec<DataType>,
    rows: Vec<Row>,
) -> Result<Vec<Row>> {
    let source: Arc<dyn RowSource> = Arc::new(MemorySource::new(types, rows)?);
    let compiled = compile(agg, source)?;
    collect_rows(compiled.execute()?)
}

/// Asserts that two sets of rows contain the same rows, ignoring order.
///
/// Duplicates are significant.
#[track_caller]
pub fn assert_rows_eq_unordered(expected: &[Row], got: &[Row]) {
    assert_eq!(
        expected.len(),
        got.len(),
        "row counts differ\nexpected: {expected:?}\ngot: {got:?}"
    );

    let mut remaining: Vec<&Row> = got.iter().collect();
    for row in expected {
        match remaining.iter().position(|r| *r == row) {
            Some(idx) => {
                remaining.swap_remove(idx);
            }
            None => panic!("missing row {row:?}\nexpected: {expected:?}\ngot: {got:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unordered_eq() {
        let a = vec![row([1, 2]), row([3, 4]), row([1, 2])];
        let b = vec![row([3, 4]), row([1, 2]), row([1, 2])];
        assert_rows_eq_unordered(&a, &b);
    }

    #[test]
    #[should_panic]
    fn unordered_duplicates_significant() {
        let a = vec![row([1, 2]), row([1, 2]), row([3, 4])];
        let b = vec![row([3, 4]), row([1, 2]), row([3, 4])];
        assert_rows_eq_unordered(&a, &b);
    }
}
