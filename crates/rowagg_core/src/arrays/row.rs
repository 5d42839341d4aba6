use rowagg_error::{DbError, Result};

use super::scalar::ScalarValue;

/// Representation of a single row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub columns: Vec<ScalarValue>,
}

impl Row {
    /// Create an empty row.
    pub const fn empty() -> Self {
        Row {
            columns: Vec::new(),
        }
    }

    pub fn new(columns: Vec<ScalarValue>) -> Self {
        Row { columns }
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Get the value for a column, erroring if the column doesn't exist.
    pub fn try_column(&self, idx: usize) -> Result<&ScalarValue> {
        self.columns.get(idx).ok_or_else(|| {
            DbError::new("Column index out of range for row")
                .with_field("idx", idx)
                .with_field("num_columns", self.columns.len())
        })
    }

    /// Return an iterator over all columns in the row.
    pub fn iter(&self) -> impl Iterator<Item = &ScalarValue> {
        self.columns.iter()
    }
}

impl FromIterator<ScalarValue> for Row {
    fn from_iter<T: IntoIterator<Item = ScalarValue>>(iter: T) -> Self {
        Row {
            columns: iter.into_iter().collect(),
        }
    }
}
