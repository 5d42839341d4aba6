use super::aggregate::AggregateFunction;
use super::documentation::Documentation;

/// A named aggregate function along with its aliases.
#[derive(Debug, Clone, Copy)]
pub struct AggregateFunctionSet {
    /// Name of the function.
    pub name: &'static str,
    /// Set of aliases for the function.
    pub aliases: &'static [&'static str],
    pub doc: Option<&'static Documentation>,
    /// The implementation.
    pub function: &'static dyn AggregateFunction,
}
