use std::fmt;
use std::sync::Arc;

use rowagg_error::{Result, ResultExt};
use tracing::debug;

use crate::arrays::datatype::DataType;
use crate::config::execution::AggregatePlanConfig;
use crate::execution::aggregate::initializer::AccumulatorInitializer;
use crate::execution::aggregate::layout::AccumulatorStateLayout;
use crate::execution::aggregate::projector::ResultProjector;
use crate::execution::aggregate::updater::AccumulatorUpdater;
use crate::execution::aggregate::validate::validate_aggregate;
use crate::execution::operators::PhysicalOperator;
use crate::execution::operators::distinct::PhysicalDistinct;
use crate::execution::operators::hash_aggregate::PhysicalHashAggregate;
use crate::execution::operators::hash_aggregate::key::KeySelector;
use crate::execution::operators::ungrouped_aggregate::PhysicalUngroupedAggregate;
use crate::execution::source::{RowSource, RowStream};
use crate::explain::explainable::{ColumnIndexes, ExplainConfig, ExplainEntry, Explainable};
use crate::functions::registry::FunctionRegistry;
use crate::logical::logical_aggregate::{GroupSpec, GroupType, LogicalAggregate};

/// How a compiled aggregate is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateShape {
    /// More than one grouping set, or a single set narrower than the group
    /// key.
    GroupingSets,
    /// No group columns. One output row.
    Ungrouped,
    /// No aggregates, and the group key is every input column.
    Distinct,
    /// Hash on the group key.
    Hash,
}

impl AggregateShape {
    /// Pick the shape for an aggregate over an input with `num_input_columns`
    /// columns.
    pub fn select(agg: &LogicalAggregate, num_input_columns: usize) -> Self {
        let group = &agg.group;
        if group.group_type() != GroupType::Simple {
            return Self::GroupingSets;
        }
        if group.group_set.is_empty() {
            return Self::Ungrouped;
        }
        if agg.aggregates.is_empty()
            && !group.indicator
            && group.group_set.len() == num_input_columns
            && group.group_set.iter().copied().eq(0..num_input_columns)
        {
            return Self::Distinct;
        }
        Self::Hash
    }
}

impl fmt::Display for AggregateShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GroupingSets => write!(f, "GROUPING_SETS"),
            Self::Ungrouped => write!(f, "UNGROUPED"),
            Self::Distinct => write!(f, "DISTINCT"),
            Self::Hash => write!(f, "HASH"),
        }
    }
}

/// Compiles logical aggregates into executable pipelines.
#[derive(Debug, Clone)]
pub struct AggregatePlanner<'a> {
    registry: &'a FunctionRegistry,
    config: AggregatePlanConfig,
}

impl<'a> AggregatePlanner<'a> {
    pub fn new(registry: &'a FunctionRegistry, config: AggregatePlanConfig) -> Self {
        AggregatePlanner { registry, config }
    }

    /// Compile an aggregate reading from `input`.
    ///
    /// Fails without building anything if the aggregate is malformed, uses
    /// DISTINCT, or references an unregistered function.
    pub fn plan(
        &self,
        agg: &LogicalAggregate,
        input: Arc<dyn RowSource>,
    ) -> Result<CompiledAggregate> {
        let input_types = input.row_types().to_vec();
        let bound = validate_aggregate(agg, &input_types, self.registry)?;

        let shape = AggregateShape::select(agg, input_types.len());

        let layout = Arc::new(AccumulatorStateLayout::new(bound));
        debug!(
            %shape,
            group_type = %agg.group.group_type(),
            num_aggregates = layout.aggregates().len(),
            slot_types = ?layout.slot_types(),
            "planning aggregate"
        );

        let initializer = AccumulatorInitializer::new(layout.clone());
        if self.config.verify_state_layout {
            initializer
                .verify_layout()
                .context("Aggregate state layout verification failed")?;
        }
        let updater = AccumulatorUpdater::new(layout.clone());
        let projector = ResultProjector::new(layout.clone());

        let group_columns: Vec<usize> = agg.group.group_set.iter().copied().collect();

        let operator = match shape {
            AggregateShape::Distinct => {
                PhysicalOperator::Distinct(PhysicalDistinct::new(self.config.initial_group_capacity))
            }
            AggregateShape::Ungrouped => PhysicalOperator::UngroupedAggregate(
                PhysicalUngroupedAggregate::new(initializer, updater, projector),
            ),
            AggregateShape::Hash | AggregateShape::GroupingSets => {
                let selectors = agg
                    .group
                    .effective_grouping_sets()
                    .into_iter()
                    .map(|set| KeySelector::new(group_columns.clone(), set, agg.group.indicator));

                PhysicalOperator::HashAggregate(PhysicalHashAggregate::new(
                    selectors,
                    initializer,
                    updater,
                    projector,
                    self.config.initial_group_capacity,
                ))
            }
        };

        let output_types = output_types(&agg.group, &input_types, &layout);

        Ok(CompiledAggregate {
            shape,
            group: agg.group.clone(),
            input,
            output_types,
            layout,
            operator,
        })
    }
}

/// Key column types, then indicator columns, then aggregate result types.
fn output_types(
    group: &GroupSpec,
    input_types: &[DataType],
    layout: &AccumulatorStateLayout,
) -> Vec<DataType> {
    let mut types: Vec<_> = group
        .group_set
        .iter()
        .map(|&col| input_types[col])
        .collect();
    types.extend(std::iter::repeat_n(DataType::Boolean, group.indicator_count()));
    types.extend(layout.result_types());
    types
}

/// An executable aggregate pipeline.
#[derive(Debug, Clone)]
pub struct CompiledAggregate {
    shape: AggregateShape,
    group: GroupSpec,
    input: Arc<dyn RowSource>,
    output_types: Vec<DataType>,
    layout: Arc<AccumulatorStateLayout>,
    operator: PhysicalOperator,
}

impl CompiledAggregate {
    pub fn shape(&self) -> AggregateShape {
        self.shape
    }

    pub fn output_types(&self) -> &[DataType] {
        &self.output_types
    }

    pub fn layout(&self) -> &AccumulatorStateLayout {
        &self.layout
    }

    /// Start producing output rows.
    ///
    /// Nothing is read from the input until the returned stream is polled.
    /// Executing more than once requires a restartable input.
    pub fn execute(&self) -> Result<RowStream> {
        let input = self.input.scan().context("Failed to scan aggregate input")?;
        Ok(self.operator.execute(input))
    }
}

impl Explainable for CompiledAggregate {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        let group_cols: Vec<_> = self.group.group_set.iter().copied().collect();
        let mut ent = ExplainEntry::new("CompiledAggregate")
            .with_value("shape", self.shape)
            .with_value("group_columns", ColumnIndexes(&group_cols))
            .with_values(
                "aggregates",
                self.layout.aggregates().iter().map(|a| &a.aggregate),
            )
            .with_values("output_types", &self.output_types);

        if conf.verbose {
            ent = ent
                .with_value("operator", self.operator.explain_entry(conf))
                .with_values("slot_types", self.layout.slot_types())
                .with_named_map(
                    "slots",
                    "ranges",
                    self.layout.aggregates().iter().map(|a| {
                        (
                            &a.aggregate.context.function_name,
                            format!("{}..{}", a.slots.start, a.slots.end),
                        )
                    }),
                );
        }

        ent
    }
}
