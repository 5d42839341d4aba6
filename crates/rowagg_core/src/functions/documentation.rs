/// Function categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Aggregate(AggregateCategory),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateCategory {
    General,
    Statistical,
}

impl Category {
    pub const GENERAL_PURPOSE_AGGREGATE: Self = Category::Aggregate(AggregateCategory::General);
    pub const STATISTICAL_AGGREGATE: Self = Category::Aggregate(AggregateCategory::Statistical);

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Aggregate(AggregateCategory::General) => "general_purpose_aggregate",
            Self::Aggregate(AggregateCategory::Statistical) => "statistical_aggregate",
        }
    }
}

/// Documentation for a single function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Documentation {
    /// Category this function belongs in.
    pub category: Category,
    /// Short description of the function.
    pub description: &'static str,
    /// Argument names.
    pub arguments: &'static [&'static str],
}
