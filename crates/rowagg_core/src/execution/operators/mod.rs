pub mod distinct;
pub mod hash_aggregate;
pub mod ungrouped_aggregate;

use distinct::PhysicalDistinct;
use hash_aggregate::PhysicalHashAggregate;
use ungrouped_aggregate::PhysicalUngroupedAggregate;

use crate::execution::source::RowStream;
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};

/// Operator at the root of a compiled aggregate pipeline.
#[derive(Debug, Clone)]
pub enum PhysicalOperator {
    HashAggregate(PhysicalHashAggregate),
    UngroupedAggregate(PhysicalUngroupedAggregate),
    Distinct(PhysicalDistinct),
}

impl PhysicalOperator {
    /// Wrap an input stream, returning the operator's output stream.
    ///
    /// No input is pulled until the output is.
    pub fn execute(&self, input: RowStream) -> RowStream {
        match self {
            Self::HashAggregate(op) => op.execute(input),
            Self::UngroupedAggregate(op) => op.execute(input),
            Self::Distinct(op) => op.execute(input),
        }
    }
}

impl Explainable for PhysicalOperator {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        match self {
            Self::HashAggregate(op) => op.explain_entry(conf),
            Self::UngroupedAggregate(op) => op.explain_entry(conf),
            Self::Distinct(op) => op.explain_entry(conf),
        }
    }
}
