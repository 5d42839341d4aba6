use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::Mutex;
use rowagg_error::{DbError, Result};

use crate::arrays::datatype::DataType;
use crate::arrays::row::Row;

/// Pull-based stream of rows.
///
/// Dropping the stream cancels any remaining work.
pub type RowStream = Box<dyn Iterator<Item = Result<Row>> + Send>;

/// An upstream producer of rows.
pub trait RowSource: Debug + Sync + Send {
    /// Types of the columns in every row produced by this source.
    fn row_types(&self) -> &[DataType];

    /// Begin producing rows.
    ///
    /// Restartable sources may be scanned any number of times, each scan
    /// producing the same rows.
    fn scan(&self) -> Result<RowStream>;
}

/// Restartable source over rows held in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    row_types: Vec<DataType>,
    rows: Arc<[Row]>,
}

impl MemorySource {
    pub fn new(row_types: Vec<DataType>, rows: impl IntoIterator<Item = Row>) -> Result<Self> {
        let rows: Arc<[Row]> = rows.into_iter().collect();
        for (idx, row) in rows.iter().enumerate() {
            if row.num_columns() != row_types.len() {
                return Err(DbError::invalid_input("Row width does not match source types")
                    .with_field("row", idx)
                    .with_field("expected", row_types.len())
                    .with_field("got", row.num_columns()));
            }
        }

        Ok(MemorySource { row_types, rows })
    }
}

impl RowSource for MemorySource {
    fn row_types(&self) -> &[DataType] {
        &self.row_types
    }

    fn scan(&self) -> Result<RowStream> {
        let rows = self.rows.clone();
        Ok(Box::new((0..rows.len()).map(move |idx| Ok(rows[idx].clone()))))
    }
}

/// Source wrapping an iterator that can only be consumed once.
pub struct OnceSource {
    row_types: Vec<DataType>,
    stream: Mutex<Option<RowStream>>,
}

impl Debug for OnceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnceSource")
            .field("row_types", &self.row_types)
            .field("consumed", &self.stream.lock().is_none())
            .finish()
    }
}

impl OnceSource {
    pub fn new<I>(row_types: Vec<DataType>, rows: I) -> Self
    where
        I: IntoIterator<Item = Result<Row>>,
        I::IntoIter: Send + 'static,
    {
        OnceSource {
            row_types,
            stream: Mutex::new(Some(Box::new(rows.into_iter()))),
        }
    }
}

impl RowSource for OnceSource {
    fn row_types(&self) -> &[DataType] {
        &self.row_types
    }

    fn scan(&self) -> Result<RowStream> {
        self.stream
            .lock()
            .take()
            .ok_or_else(|| DbError::new("Source already scanned and cannot be restarted"))
    }
}
