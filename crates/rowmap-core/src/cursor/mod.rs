//! Row cursor contract.
//!
//! A cursor exposes the ordered result column names and yields one row at a
//! time. Values are pulled per column so drivers can decode lazily.


use crate::value::Value;
use std::error::Error as StdError;
use thiserror::Error as ThisError;

///
/// RowCursor
///

pub trait RowCursor {
    type Error: StdError + Send + Sync + 'static;

    /// Ordered result column names.
    fn columns(&self) -> Result<Vec<String>, Self::Error>;

    /// Move to the next row. Returns `false` once the rows are exhausted.
    fn advance(&mut self) -> Result<bool, Self::Error>;

    /// Value of column `index` in the current row.
    fn value(&self, index: usize) -> Result<Value, Self::Error>;
}

impl<C: RowCursor + ?Sized> RowCursor for &mut C {
    type Error = C::Error;

    fn columns(&self) -> Result<Vec<String>, Self::Error> {
        (**self).columns()
    }

    fn advance(&mut self) -> Result<bool, Self::Error> {
        (**self).advance()
    }

    fn value(&self, index: usize) -> Result<Value, Self::Error> {
        (**self).value(index)
    }
}

///
/// MemoryCursorError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum MemoryCursorError {
    #[error("no current row")]
    NoCurrentRow,

    #[error("column index {index} out of range for {width} columns")]
    ColumnOutOfRange { index: usize, width: usize },

    #[error("row has {found} values, expected {expected}")]
    RowWidth { expected: usize, found: usize },
}

///
/// MemoryCursor
///
/// Pre-materialized rows. Row width is checked on insert.
///

#[derive(Clone, Debug, Default)]
pub struct MemoryCursor {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    position: Option<usize>,
}

impl MemoryCursor {
    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            position: None,
        }
    }

    /// Build a cursor from column names and rows in one step.
    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<Value>>) -> Result<Self, MemoryCursorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cursor = Self::new(columns);
        for row in rows {
            cursor.push_row(row)?;
        }

        Ok(cursor)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), MemoryCursorError> {
        if row.len() != self.columns.len() {
            return Err(MemoryCursorError::RowWidth {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);

        Ok(())
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rewind to before the first row.
    pub const fn rewind(&mut self) {
        self.position = None;
    }

    fn current(&self) -> Result<&[Value], MemoryCursorError> {
        self.position
            .and_then(|position| self.rows.get(position))
            .map(Vec::as_slice)
            .ok_or(MemoryCursorError::NoCurrentRow)
    }
}

impl RowCursor for MemoryCursor {
    type Error = MemoryCursorError;

    fn columns(&self) -> Result<Vec<String>, Self::Error> {
        Ok(self.columns.clone())
    }

    fn advance(&mut self) -> Result<bool, Self::Error> {
        let next = self.position.map_or(0, |position| position + 1);
        self.position = Some(next.min(self.rows.len()));

        Ok(next < self.rows.len())
    }

    fn value(&self, index: usize) -> Result<Value, Self::Error> {
        let row = self.current()?;

        row.get(index)
            .cloned()
            .ok_or(MemoryCursorError::ColumnOutOfRange {
                index,
                width: row.len(),
            })
    }
}
