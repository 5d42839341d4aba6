use std::collections::HashMap;
use std::sync::Arc;

use rowagg_error::{DbError, Result};

use super::aggregate::AggregateFunction;
use super::aggregate::builtin::BUILTIN_AGGREGATE_FUNCTION_SETS;
use super::documentation::Documentation;
use super::function_set::AggregateFunctionSet;

/// Lookup from aggregate function name to its implementation.
///
/// Names are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    aggregates: HashMap<String, Arc<dyn AggregateFunction>>,
    /// Documentation keyed by canonical name. Aliases are not included.
    docs: HashMap<String, &'static Documentation>,
}

impl FunctionRegistry {
    /// Create an empty registry.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a registry containing every builtin aggregate, including
    /// aliases.
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::empty();
        for set in BUILTIN_AGGREGATE_FUNCTION_SETS {
            registry.register_set(set)?;
        }
        Ok(registry)
    }

    /// Register a function set under its name and all of its aliases.
    pub fn register_set(&mut self, set: &AggregateFunctionSet) -> Result<()> {
        let function: Arc<dyn AggregateFunction> = Arc::new(set.function);
        self.register(set.name, function.clone())?;
        for alias in set.aliases {
            self.register(alias, function.clone())?;
        }
        if let Some(doc) = set.doc {
            self.docs.insert(set.name.to_lowercase(), doc);
        }
        Ok(())
    }

    /// Register a single aggregate under `name`.
    ///
    /// Errors if the name is already taken.
    pub fn register(
        &mut self,
        name: impl AsRef<str>,
        function: Arc<dyn AggregateFunction>,
    ) -> Result<()> {
        let name = name.as_ref().to_lowercase();
        if self.aggregates.contains_key(&name) {
            return Err(DbError::new(format!(
                "Duplicate aggregate function name '{name}'"
            )));
        }
        self.aggregates.insert(name, function);
        Ok(())
    }

    pub fn get_aggregate(&self, name: &str) -> Option<&Arc<dyn AggregateFunction>> {
        self.aggregates.get(&name.to_lowercase())
    }

    pub fn documentation(&self, name: &str) -> Option<&'static Documentation> {
        self.docs.get(&name.to_lowercase()).copied()
    }

    /// Iterate all registered names, sorted.
    pub fn aggregate_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.aggregates.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}
