//! `RowCursor` over rusqlite statements.
//!
//! Rows are materialized one at a time into [`Value`]s; column values are
//! decoded from the driver's dynamic representation, so leaf conversion rules
//! are the same as for any other cursor.

use crate::{
    Error,
    cursor::RowCursor,
    descriptor::DescriptorRegistry,
    error::ScanError,
    plan::ScanOptions,
    traits::Mapped,
    value::Value,
};
use rusqlite::{Connection, Params, Rows, Statement, types::ValueRef};

///
/// SqliteCursor
///

pub struct SqliteCursor<'stmt> {
    rows: Rows<'stmt>,
    columns: Vec<String>,
    current: Option<Vec<Value>>,
}

impl<'stmt> SqliteCursor<'stmt> {
    /// Execute `stmt` with `params` and wrap the resulting rows.
    pub fn query<P: Params>(stmt: &'stmt mut Statement<'_>, params: P) -> rusqlite::Result<Self> {
        let columns = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let rows = stmt.query(params)?;

        Ok(Self {
            rows,
            columns,
            current: None,
        })
    }
}

impl RowCursor for SqliteCursor<'_> {
    type Error = rusqlite::Error;

    fn columns(&self) -> Result<Vec<String>, Self::Error> {
        Ok(self.columns.clone())
    }

    fn advance(&mut self) -> Result<bool, Self::Error> {
        let Some(row) = self.rows.next()? else {
            self.current = None;
            return Ok(false);
        };

        let values = (0..self.columns.len())
            .map(|index| row.get_ref(index).and_then(to_value))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        self.current = Some(values);

        Ok(true)
    }

    fn value(&self, index: usize) -> Result<Value, Self::Error> {
        let row = self
            .current
            .as_ref()
            .ok_or(rusqlite::Error::QueryReturnedNoRows)?;

        row.get(index)
            .cloned()
            .ok_or(rusqlite::Error::InvalidColumnIndex(index))
    }
}

fn to_value(value: ValueRef<'_>) -> rusqlite::Result<Value> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Int(v),
        ValueRef::Real(v) => Value::Float(v),
        ValueRef::Text(bytes) => Value::Text(
            std::str::from_utf8(bytes)
                .map_err(rusqlite::Error::Utf8Error)?
                .to_string(),
        ),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    })
}

fn driver(err: rusqlite::Error) -> Error {
    ScanError::cursor(None, err).into()
}

/// Run `sql` on `conn` and scan every row into `T`.
pub fn select<T: Mapped, P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<T>, Error> {
    select_with(
        conn,
        sql,
        params,
        DescriptorRegistry::global(),
        ScanOptions::default(),
    )
}

/// [`select`] with an explicit registry and options.
pub fn select_with<T: Mapped, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    registry: &DescriptorRegistry,
    options: ScanOptions,
) -> Result<Vec<T>, Error> {
    let mut stmt = conn.prepare(sql).map_err(driver)?;
    let cursor = SqliteCursor::query(&mut stmt, params).map_err(driver)?;

    crate::select_with(registry, cursor, options)
}

/// Run `sql` on `conn` and scan the first row, if any.
pub fn select_one<T: Mapped, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Option<T>, Error> {
    let mut stmt = conn.prepare(sql).map_err(driver)?;
    let cursor = SqliteCursor::query(&mut stmt, params).map_err(driver)?;

    crate::select_one(cursor)
}
