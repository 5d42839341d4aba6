use ahash::RandomState;
use hashbrown::HashSet;
use rowagg_error::Result;
use tracing::trace;

use super::hash_aggregate::key::GroupKey;
use crate::arrays::row::Row;
use crate::execution::source::RowStream;
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::hash::HASH_RANDOM_STATE;

/// Removes duplicate rows.
///
/// Used when the group key covers every input column and there are no
/// aggregates. Rows are emitted as soon as they're first seen, in input
/// order.
#[derive(Debug, Clone)]
pub struct PhysicalDistinct {
    initial_capacity: usize,
}

impl PhysicalDistinct {
    pub fn new(initial_capacity: usize) -> Self {
        PhysicalDistinct { initial_capacity }
    }

    pub fn execute(&self, input: RowStream) -> RowStream {
        Box::new(DistinctStream {
            input: Some(input),
            seen: HashSet::with_capacity_and_hasher(self.initial_capacity, HASH_RANDOM_STATE),
        })
    }
}

impl Explainable for PhysicalDistinct {
    fn explain_entry(&self, _conf: ExplainConfig) -> ExplainEntry {
        ExplainEntry::new("Distinct")
    }
}

struct DistinctStream {
    /// Set to None once the input is exhausted or errors.
    input: Option<RowStream>,
    seen: HashSet<GroupKey, RandomState>,
}

impl Iterator for DistinctStream {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let input = self.input.as_mut()?;
        loop {
            match input.next() {
                Some(Ok(row)) => {
                    if self.seen.insert(GroupKey(row.columns.clone())) {
                        return Some(Ok(row));
                    }
                }
                Some(Err(e)) => {
                    self.input = None;
                    return Some(Err(e));
                }
                None => {
                    trace!(num_groups = self.seen.len(), "distinct finished");
                    self.input = None;
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rowagg_error::DbError;

    use super::*;
    use crate::arrays::scalar::ScalarValue;

    fn row(a: i32, b: i64) -> Row {
        Row::new(vec![ScalarValue::Int32(a), ScalarValue::Int64(b)])
    }

    #[test]
    fn removes_duplicates_in_order() {
        let input = vec![row(10, 100), row(10, 100), row(20, 50), row(10, 100)];
        let out: Vec<_> = PhysicalDistinct::new(4)
            .execute(Box::new(input.into_iter().map(Ok)))
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(vec![row(10, 100), row(20, 50)], out);
    }

    #[test]
    fn stops_after_error() {
        let input = vec![Ok(row(1, 1)), Err(DbError::new("boom")), Ok(row(2, 2))];
        let mut out = PhysicalDistinct::new(4).execute(Box::new(input.into_iter()));

        assert!(out.next().unwrap().is_ok());
        assert!(out.next().unwrap().is_err());
        assert!(out.next().is_none());
    }
}
