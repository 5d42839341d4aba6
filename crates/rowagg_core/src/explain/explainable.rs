use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An entry in an output for explaining a compiled aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainEntry {
    /// Name of the node.
    pub name: String,
    /// Items to display in the explain entry.
    ///
    /// Using a btree to ensure consistent ordering.
    pub items: BTreeMap<String, ExplainValue>,
}

impl ExplainEntry {
    pub fn new(name: impl Into<String>) -> Self {
        ExplainEntry {
            name: name.into(),
            items: BTreeMap::new(),
        }
    }

    /// Put a value in the explain entry.
    pub fn with_value(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        let val = ExplainValue::Value(value.to_string());
        self.items.insert(key.into(), val);
        self
    }

    /// Put a list of values in the explain entry.
    pub fn with_values<S: fmt::Display>(
        mut self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        let vals = ExplainValue::Values(values.into_iter().map(|s| s.to_string()).collect());
        self.items.insert(key.into(), vals);
        self
    }

    pub fn with_named_map<S1: fmt::Display, S2: fmt::Display>(
        mut self,
        key: impl Into<String>,
        map_name: impl Into<String>,
        map: impl IntoIterator<Item = (S1, S2)>,
    ) -> Self {
        let vals = ExplainValue::NamedMap(
            map_name.into(),
            map.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self.items.insert(key.into(), vals);
        self
    }
}

impl fmt::Display for ExplainEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.items.is_empty() {
            write!(f, " (")?;
            for (idx, (k, v)) in self.items.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{k} = {v}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplainValue {
    Value(String),
    Values(Vec<String>),
    NamedMap(String, Vec<(String, String)>),
}

impl fmt::Display for ExplainValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v}"),
            Self::Values(v) => write!(f, "[{}]", v.join(", ")),
            Self::NamedMap(name, map) => {
                let s = map
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{name} {{{s}}}")
            }
        }
    }
}

/// Configuration for producing an ExplainEntry.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplainConfig {
    pub verbose: bool,
}

impl ExplainConfig {
    pub const VERBOSE: Self = Self { verbose: true };
}

/// Trait for explaining a logical or compiled aggregate.
pub trait Explainable {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry;
}

/// Wrapper around column indexes to provide consistent formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnIndexes<'a>(pub &'a [usize]);

impl fmt::Display for ColumnIndexes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, col) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "#{col}")?;
        }
        Ok(())
    }
}
