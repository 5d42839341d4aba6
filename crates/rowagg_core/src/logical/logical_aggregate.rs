use std::collections::BTreeSet;
use std::fmt;

use rowagg_error::{DbError, Result};
use serde::{Deserialize, Serialize};

use crate::arrays::datatype::DataType;
use crate::explain::explainable::{ColumnIndexes, ExplainConfig, ExplainEntry, Explainable};

/// Largest key accepted by `GroupSpec::cube`. Matches the CUBE limit in
/// Postgres (4096 grouping sets).
pub const MAX_CUBE_COLUMNS: usize = 12;

/// Grouping structure for an aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSpec {
    /// Input columns making up the full group key.
    ///
    /// Output key columns are in ascending column order.
    pub group_set: BTreeSet<usize>,
    /// Alternative grouping sets (ROLLUP, CUBE, GROUPING SETS). Each set is a
    /// subset of `group_set`.
    ///
    /// None for a plain GROUP BY.
    pub grouping_sets: Option<Vec<BTreeSet<usize>>>,
    /// Emit one boolean column per key column indicating if that column was
    /// rolled up in the row's grouping set.
    pub indicator: bool,
}

/// Classification of the grouping sets relative to the group key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupType {
    /// A single grouping set equal to the group key.
    Simple,
    /// Every prefix of the group key, longest first.
    Rollup,
    /// Every subset of the group key.
    Cube,
    /// Any other list of grouping sets.
    Other,
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple => write!(f, "SIMPLE"),
            Self::Rollup => write!(f, "ROLLUP"),
            Self::Cube => write!(f, "CUBE"),
            Self::Other => write!(f, "OTHER"),
        }
    }
}

impl GroupSpec {
    /// Plain GROUP BY over the given columns. An empty iterator produces a
    /// global aggregate.
    pub fn simple(cols: impl IntoIterator<Item = usize>) -> Self {
        GroupSpec {
            group_set: cols.into_iter().collect(),
            grouping_sets: None,
            indicator: false,
        }
    }

    /// ROLLUP(c1, c2, ..., cn) producing grouping sets (c1..cn), (c1..cn-1),
    /// ..., ().
    ///
    /// Columns are rolled up in the order given.
    pub fn rollup(cols: impl IntoIterator<Item = usize>) -> Self {
        let cols: Vec<_> = cols.into_iter().collect();
        let sets = (0..=cols.len())
            .rev()
            .map(|len| cols[..len].iter().copied().collect())
            .collect();

        GroupSpec {
            group_set: cols.into_iter().collect(),
            grouping_sets: Some(sets),
            indicator: false,
        }
    }

    /// CUBE(c1, ..., cn) producing every subset of the columns.
    ///
    /// Sets are ordered from the full key down to the empty set, larger sets
    /// first, then by the bitmask of included positions descending.
    ///
    /// Errors if more than `MAX_CUBE_COLUMNS` columns are given.
    pub fn cube(cols: impl IntoIterator<Item = usize>) -> Result<Self> {
        let group_set: BTreeSet<usize> = cols.into_iter().collect();
        if group_set.len() > MAX_CUBE_COLUMNS {
            return Err(DbError::invalid_input("CUBE has too many columns")
                .with_field("columns", group_set.len())
                .with_field("max", MAX_CUBE_COLUMNS));
        }
        let cols: Vec<_> = group_set.iter().copied().collect();

        let mut masks: Vec<u64> = (0..(1_u64 << cols.len())).collect();
        masks.sort_by(|a, b| b.count_ones().cmp(&a.count_ones()).then(b.cmp(a)));

        let sets = masks
            .into_iter()
            .map(|mask| {
                cols.iter()
                    .enumerate()
                    .filter(|(pos, _)| mask & (1 << (cols.len() - 1 - pos)) != 0)
                    .map(|(_, &col)| col)
                    .collect()
            })
            .collect();

        Ok(GroupSpec {
            group_set,
            grouping_sets: Some(sets),
            indicator: false,
        })
    }

    /// Explicit GROUPING SETS over the given key.
    pub fn with_grouping_sets(
        group_set: impl IntoIterator<Item = usize>,
        grouping_sets: Vec<BTreeSet<usize>>,
    ) -> Self {
        GroupSpec {
            group_set: group_set.into_iter().collect(),
            grouping_sets: Some(grouping_sets),
            indicator: false,
        }
    }

    pub fn with_indicator(mut self, indicator: bool) -> Self {
        self.indicator = indicator;
        self
    }

    /// Number of columns in the group key.
    pub fn group_count(&self) -> usize {
        self.group_set.len()
    }

    /// Number of indicator columns in the output.
    pub fn indicator_count(&self) -> usize {
        if self.indicator {
            self.group_count()
        } else {
            0
        }
    }

    /// The grouping sets to evaluate. A plain GROUP BY has one set, the full
    /// key.
    pub fn effective_grouping_sets(&self) -> Vec<BTreeSet<usize>> {
        match &self.grouping_sets {
            Some(sets) => sets.clone(),
            None => vec![self.group_set.clone()],
        }
    }

    pub fn group_type(&self) -> GroupType {
        let sets = match &self.grouping_sets {
            None => return GroupType::Simple,
            Some(sets) => sets,
        };

        if sets.len() == 1 && sets[0] == self.group_set {
            return GroupType::Simple;
        }

        let actual: BTreeSet<&BTreeSet<usize>> = sets.iter().collect();
        if actual.len() != sets.len() {
            return GroupType::Other;
        }

        if self.is_rollup(sets) {
            return GroupType::Rollup;
        }

        // Distinct subsets of an n-column key number 2^n only when every
        // subset is present.
        let all_subsets = sets.iter().all(|set| set.is_subset(&self.group_set));
        let cube_len = u32::try_from(self.group_set.len())
            .ok()
            .and_then(|n| 1_usize.checked_shl(n));
        if all_subsets && cube_len == Some(sets.len()) {
            return GroupType::Cube;
        }

        GroupType::Other
    }

    /// Sets form a chain from the full key down to the empty set, each set
    /// dropping exactly one column from the previous.
    fn is_rollup(&self, sets: &[BTreeSet<usize>]) -> bool {
        let mut by_size: Vec<_> = sets.iter().collect();
        by_size.sort_by_key(|set| std::cmp::Reverse(set.len()));

        if by_size.len() != self.group_set.len() + 1 || by_size[0] != &self.group_set {
            return false;
        }

        by_size
            .windows(2)
            .all(|pair| pair[1].len() + 1 == pair[0].len() && pair[1].is_subset(pair[0]))
    }
}

/// A single aggregate function call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateCallSpec {
    /// Name of the aggregate function, resolved through the function registry.
    pub function: String,
    /// Input columns passed as arguments.
    pub args: Vec<usize>,
    /// DISTINCT aggregate. Not supported.
    pub distinct: bool,
    /// Declared result type.
    pub return_type: DataType,
}

impl AggregateCallSpec {
    pub fn new(function: impl Into<String>, args: Vec<usize>, return_type: DataType) -> Self {
        AggregateCallSpec {
            function: function.into(),
            args,
            distinct: false,
            return_type,
        }
    }

    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }
}

impl fmt::Display for AggregateCallSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.function)?;
        if self.distinct {
            write!(f, "DISTINCT ")?;
        }
        if self.args.is_empty() {
            write!(f, "*")?;
        } else {
            write!(f, "{}", ColumnIndexes(&self.args))?;
        }
        write!(f, ")")
    }
}

/// Logical description of a group by + aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalAggregate {
    pub group: GroupSpec,
    pub aggregates: Vec<AggregateCallSpec>,
}

impl LogicalAggregate {
    pub fn new(group: GroupSpec, aggregates: Vec<AggregateCallSpec>) -> Self {
        LogicalAggregate { group, aggregates }
    }
}

impl Explainable for LogicalAggregate {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        let group_cols: Vec<_> = self.group.group_set.iter().copied().collect();
        let mut ent = ExplainEntry::new("Aggregate")
            .with_values("aggregates", &self.aggregates)
            .with_value("group_columns", ColumnIndexes(&group_cols))
            .with_value("group_type", self.group.group_type());

        if conf.verbose {
            ent = ent.with_value("indicator", self.group.indicator);
        }

        ent
    }
}
