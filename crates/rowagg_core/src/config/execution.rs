/// Configuration for compiling a logical aggregate into a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatePlanConfig {
    /// Build a single fresh accumulator at compile time, check every slot
    /// against the type its aggregate declared, then run each aggregate's
    /// `result` and `add` once to catch access to undeclared slots.
    ///
    /// A slot holding NULL satisfies any declared type.
    pub verify_state_layout: bool,
    /// Initial capacity of each per-grouping-set hash table.
    pub initial_group_capacity: usize,
}

impl Default for AggregatePlanConfig {
    fn default() -> Self {
        AggregatePlanConfig {
            verify_state_layout: true,
            initial_group_capacity: 64,
        }
    }
}
