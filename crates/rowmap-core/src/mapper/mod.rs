//! Hand-written column mappings.
//!
//! A [`Mapper`] binds column names to closures that return the leaf a column
//! scans into on a live entity. No descriptor is involved, so entities do not
//! need to implement [`Mapped`](crate::traits::Mapped), and nested values are
//! reached through whatever accessors the caller provides.


use crate::{
    COLUMN_SEPARATOR,
    cursor::RowCursor,
    error::{Error, ResolutionError, ScanError},
    obs::sink::ScanSpan,
    traits::Scan,
};
use std::{any::type_name, collections::BTreeMap, fmt, iter::FusedIterator, sync::Arc};

///
/// Mapping
///
/// Accessor from an entity to one addressable leaf.
///

pub type Mapping<E> = Arc<dyn (Fn(&mut E) -> &mut dyn Scan) + Send + Sync>;

fn mapping<E, F>(f: F) -> Mapping<E>
where
    F: (Fn(&mut E) -> &mut dyn Scan) + Send + Sync + 'static,
{
    Arc::new(f)
}

///
/// Mapper
///

pub struct Mapper<E> {
    mappings: BTreeMap<String, Mapping<E>>,
}

impl<E> Default for Mapper<E> {
    fn default() -> Self {
        Self {
            mappings: BTreeMap::new(),
        }
    }
}

impl<E> Clone for Mapper<E> {
    fn clone(&self) -> Self {
        Self {
            mappings: self.mappings.clone(),
        }
    }
}

impl<E> fmt::Debug for Mapper<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapper")
            .field("columns", &self.mappings.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<E: 'static> Mapper<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn map<F>(mut self, column: impl Into<String>, f: F) -> Self
    where
        F: (Fn(&mut E) -> &mut dyn Scan) + Send + Sync + 'static,
    {
        self.insert(column, f);
        self
    }

    /// Bind `column` to `f`, replacing any previous binding.
    pub fn insert<F>(&mut self, column: impl Into<String>, f: F)
    where
        F: (Fn(&mut E) -> &mut dyn Scan) + Send + Sync + 'static,
    {
        self.mappings.insert(column.into(), mapping(f));
    }

    /// The leaf `column` scans into on `entity`.
    pub fn addr<'e>(&self, entity: &'e mut E, column: &str) -> Option<&'e mut dyn Scan> {
        self.mappings.get(column).map(|mapping| mapping(entity))
    }

    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.mappings.contains_key(column)
    }

    /// Mapped column names, sorted.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.mappings.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Add every column of `other` as `<namespace>_<column>`, reached through
    /// `get`. Existing columns with the same name are replaced.
    ///
    /// `get` is responsible for producing the nested value, allocating it if
    /// it is optional.
    #[must_use]
    pub fn merge<T, G>(mut self, other: &Mapper<T>, namespace: &str, get: G) -> Self
    where
        T: 'static,
        G: Fn(&mut E) -> &mut T + Send + Sync + 'static,
    {
        let get = Arc::new(get);

        for (column, nested) in &other.mappings {
            let get = Arc::clone(&get);
            let nested = Arc::clone(nested);

            self.mappings.insert(
                format!("{namespace}{COLUMN_SEPARATOR}{column}"),
                mapping(move |entity: &mut E| nested(get(entity))),
            );
        }

        self
    }
}

///
/// MappingScanner
///
/// Scans rows through a [`Mapper`]. Every result column must be mapped;
/// the check happens once, before any row is read.
///

pub struct MappingScanner<E, C> {
    cursor: C,
    mapper: Mapper<E>,
    columns: Vec<String>,
    done: bool,
}

impl<E: Default + 'static, C: RowCursor> MappingScanner<E, C> {
    pub fn new(cursor: C, mapper: Mapper<E>) -> Result<Self, Error> {
        let columns = cursor.columns().map_err(ScanError::columns)?;

        if let Some(column) = columns.iter().find(|column| !mapper.contains(column)) {
            return Err(ResolutionError::UnmappedColumn {
                column: column.clone(),
            }
            .into());
        }

        Ok(Self {
            cursor,
            mapper,
            columns,
            done: false,
        })
    }

    /// Scan the next row into `dest`. Returns `false` once the rows are exhausted.
    pub fn scan_into(&mut self, dest: &mut E) -> Result<bool, Error> {
        if self.done {
            return Ok(false);
        }

        let result = self.read_row(dest);
        if !matches!(result, Ok(true)) {
            self.done = true;
        }

        result
    }

    fn read_row(&mut self, dest: &mut E) -> Result<bool, Error> {
        if !self
            .cursor
            .advance()
            .map_err(|err| ScanError::cursor(None, err))?
        {
            return Ok(false);
        }

        let mut span = ScanSpan::new(type_name::<E>());
        for (index, column) in self.columns.iter().enumerate() {
            let leaf = self
                .mapper
                .addr(dest, column)
                .ok_or_else(|| ResolutionError::UnmappedColumn {
                    column: column.clone(),
                })?;

            let value = self
                .cursor
                .value(index)
                .map_err(|err| ScanError::cursor(Some(column), err))?;
            leaf.scan(value).map_err(|source| ScanError::Decode {
                column: column.clone(),
                source,
            })?;
        }
        span.add_row(0);

        Ok(true)
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn into_inner(self) -> C {
        self.cursor
    }
}

impl<E: Default + 'static, C: RowCursor> Iterator for MappingScanner<E, C> {
    type Item = Result<E, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut row = E::default();

        match self.scan_into(&mut row) {
            Ok(true) => Some(Ok(row)),
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

impl<E: Default + 'static, C: RowCursor> FusedIterator for MappingScanner<E, C> {}
