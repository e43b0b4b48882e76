//! Row scanning.
//!
//! Rows are read from a [`RowCursor`] one at a time. Each column value is
//! scanned into the target its plan resolved, then optional nested records
//! that came back all-default are collapsed to absent.

mod collapse;


pub(crate) use collapse::collapse;

use crate::{
    cursor::RowCursor,
    descriptor::{DescriptorRegistry, TypeDescriptor},
    error::{Error, ScanError, ShapeError},
    obs::sink::{self, MetricsEvent, ScanSpan},
    plan::{ScanOptions, ScanPlan, Target},
    traits::{Mapped, Record},
};
use std::{any::type_name, iter::FusedIterator, marker::PhantomData};

///
/// RowScanner
///
/// Typed scanner over a cursor. The plan is compiled from the cursor's
/// columns on construction and reused for every row.
///
/// As an iterator it yields one fresh record per row and fuses after the
/// first error.
///

pub struct RowScanner<T, C> {
    cursor: C,
    plan: ScanPlan,
    done: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Mapped, C: RowCursor> RowScanner<T, C> {
    /// Scanner using the global registry and default options.
    pub fn new(cursor: C) -> Result<Self, Error> {
        Self::with_options(DescriptorRegistry::global(), cursor, ScanOptions::default())
    }

    pub fn with_options(
        registry: &DescriptorRegistry,
        cursor: C,
        options: ScanOptions,
    ) -> Result<Self, Error> {
        let columns = cursor.columns().map_err(ScanError::columns)?;
        let plan = ScanPlan::for_type::<T>(registry, &columns, &options)?;

        Ok(Self::from_plan(plan, cursor))
    }

    fn from_plan(plan: ScanPlan, cursor: C) -> Self {
        Self {
            cursor,
            plan,
            done: false,
            _marker: PhantomData,
        }
    }

    /// Scan the next row into `dest`. Fields the plan does not address keep
    /// their current values. Returns `false` once the rows are exhausted.
    pub fn scan_into(&mut self, dest: &mut T) -> Result<bool, Error> {
        if self.done {
            return Ok(false);
        }

        let result = read_row(&self.plan, &mut self.cursor, dest);
        if !matches!(result, Ok(true)) {
            self.done = true;
        }

        result
    }

    #[must_use]
    pub const fn plan(&self) -> &ScanPlan {
        &self.plan
    }

    pub fn into_inner(self) -> C {
        self.cursor
    }
}

impl<T: Mapped, C: RowCursor> Iterator for RowScanner<T, C> {
    type Item = Result<T, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut row = T::default();

        match self.scan_into(&mut row) {
            Ok(true) => Some(Ok(row)),
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

impl<T: Mapped, C: RowCursor> FusedIterator for RowScanner<T, C> {}

///
/// DestScanner
///
/// Scanner that takes its destination per call. The plan is compiled on the
/// first call and stays bound to that destination type.
///

pub struct DestScanner<'r, C> {
    registry: &'r DescriptorRegistry,
    cursor: C,
    options: ScanOptions,
    plan: Option<ScanPlan>,
}

impl<C: RowCursor> DestScanner<'static, C> {
    #[must_use]
    pub fn new(cursor: C) -> Self {
        DestScanner::with_options(DescriptorRegistry::global(), cursor, ScanOptions::default())
    }
}

impl<'r, C: RowCursor> DestScanner<'r, C> {
    #[must_use]
    pub const fn with_options(
        registry: &'r DescriptorRegistry,
        cursor: C,
        options: ScanOptions,
    ) -> Self {
        Self {
            registry,
            cursor,
            options,
            plan: None,
        }
    }

    pub fn scan_into<T: Mapped>(&mut self, dest: &mut T) -> Result<bool, Error> {
        let plan = match &mut self.plan {
            Some(plan) => plan,
            slot @ None => {
                let columns = self.cursor.columns().map_err(ScanError::columns)?;
                let plan = ScanPlan::for_type::<T>(self.registry, &columns, &self.options)?;

                slot.insert(plan)
            }
        };

        if !plan.is_for::<T>() {
            return Err(ShapeError::DestinationMismatch {
                expected: plan.type_name(),
                found: type_name::<T>(),
            }
            .into());
        }

        read_row(plan, &mut self.cursor, dest)
    }

    /// The compiled plan, once the first row has been requested.
    #[must_use]
    pub const fn plan(&self) -> Option<&ScanPlan> {
        self.plan.as_ref()
    }

    pub fn into_inner(self) -> C {
        self.cursor
    }
}

///
/// Entry points
///

/// Scan every row of `cursor` into a new `Vec<T>`.
pub fn select<T: Mapped, C: RowCursor>(cursor: C) -> Result<Vec<T>, Error> {
    RowScanner::<T, C>::new(cursor)?.collect()
}

/// [`select`] with an explicit registry and options.
pub fn select_with<T: Mapped, C: RowCursor>(
    registry: &DescriptorRegistry,
    cursor: C,
    options: ScanOptions,
) -> Result<Vec<T>, Error> {
    RowScanner::<T, C>::with_options(registry, cursor, options)?.collect()
}

/// Append every row of `cursor` to `dest`. Returns the number of rows added.
pub fn select_into<T: Mapped, C: RowCursor>(cursor: C, dest: &mut Vec<T>) -> Result<usize, Error> {
    let before = dest.len();
    for row in RowScanner::<T, C>::new(cursor)? {
        dest.push(row?);
    }

    Ok(dest.len() - before)
}

/// Scan the first row of `cursor`, if any.
pub fn select_one<T: Mapped, C: RowCursor>(cursor: C) -> Result<Option<T>, Error> {
    RowScanner::<T, C>::new(cursor)?.next().transpose()
}

/// Scan the next row of `cursor` into a new `T` using an already built
/// descriptor. Returns `None` once the rows are exhausted.
pub fn resolve_and_scan<T: Mapped, C: RowCursor>(
    registry: &DescriptorRegistry,
    descriptor: &TypeDescriptor,
    columns: &[String],
    cursor: &mut C,
    options: &ScanOptions,
) -> Result<Option<T>, Error> {
    if descriptor.type_id() != std::any::TypeId::of::<T>() {
        return Err(ShapeError::DescriptorMismatch {
            expected: descriptor.type_name(),
            found: type_name::<T>(),
        }
        .into());
    }

    let plan = ScanPlan::compile(registry, descriptor, columns, options)?;
    let mut row = T::default();

    Ok(read_row(&plan, cursor, &mut row)?.then_some(row))
}

// Advance the cursor and scan one row into `dest`.
fn read_row<C: RowCursor>(
    plan: &ScanPlan,
    cursor: &mut C,
    dest: &mut dyn Record,
) -> Result<bool, Error> {
    let result = advance_and_scan(plan, cursor, dest);

    if let Err(err) = &result {
        tracing::debug!(type_name = plan.type_name(), error = %err, "row scan failed");
        sink::record(MetricsEvent::ScanFailed {
            type_name: plan.type_name(),
            class: err.class(),
        });
    }

    result
}

fn advance_and_scan<C: RowCursor>(
    plan: &ScanPlan,
    cursor: &mut C,
    dest: &mut dyn Record,
) -> Result<bool, Error> {
    let advanced = cursor
        .advance()
        .map_err(|err| ScanError::cursor(None, err))?;
    if !advanced {
        return Ok(false);
    }

    let mut span = ScanSpan::new(plan.type_name());
    let relations = scan_row(plan, cursor, dest)?;
    span.add_row(relations);

    Ok(true)
}

/// Scan the current row of `cursor` into `dest` and collapse all-default
/// optional records. Returns the number of records collapsed.
pub(crate) fn scan_row<C: RowCursor + ?Sized>(
    plan: &ScanPlan,
    cursor: &C,
    dest: &mut dyn Record,
) -> Result<u64, Error> {
    let type_name = plan.type_name();

    for (index, (column, targeter)) in plan.columns().iter().zip(plan.targeters()).enumerate() {
        let Target::Leaf(leaf) = targeter.target(dest, type_name)? else {
            continue;
        };

        let value = cursor
            .value(index)
            .map_err(|err| ScanError::cursor(Some(column), err))?;
        leaf.scan(value).map_err(|source| ScanError::Decode {
            column: column.clone(),
            source,
        })?;
    }

    Ok(collapse(plan.collapse_set(), dest, type_name)?)
}
