//! Type descriptors: the column-name to field map of one record type.
//!
//! Descriptors are built once per type from its `RecordShape`, validated
//! eagerly (nested records included), and cached for the life of the
//! owning `DescriptorRegistry`.

mod builder;
mod registry;

#[cfg(test)]
mod tests;

pub use registry::DescriptorRegistry;

pub(crate) use builder::Builder;

use crate::model::FieldKind;
use std::{any::TypeId, collections::BTreeMap};

///
/// PathStep
///
/// One hop from a record into one of its fields.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PathStep {
    /// Declaration index of the field within its record.
    pub index: usize,
    /// The field is an optional container around a nested record.
    pub optional: bool,
}

impl PathStep {
    #[must_use]
    pub const fn new(index: usize, optional: bool) -> Self {
        Self { index, optional }
    }
}

///
/// FieldDescriptor
///
/// Mapping metadata for one column of a record.
///

#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    /// Resolved column name.
    pub column: String,
    /// Declared name of the field that owns the column.
    pub ident: &'static str,
    /// The column name came from an explicit tag.
    pub tagged: bool,
    /// Route from the owning record's root; never empty.
    pub path: Vec<PathStep>,
    /// Declared type, including any optional container.
    pub declared_type: &'static str,
    /// Direct type, after the optional container.
    pub kind: FieldKind,
    pub promote: bool,
}

impl FieldDescriptor {
    #[must_use]
    pub const fn direct_type(&self) -> &'static str {
        self.kind.type_name()
    }

    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        self.path.iter().map(|step| step.index).collect()
    }

    #[must_use]
    pub const fn depth(&self) -> usize {
        self.path.len()
    }
}

///
/// TypeDescriptor
///
/// Immutable once built. Column names are unique.
///

#[derive(Clone, Debug)]
pub struct TypeDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    by_column: BTreeMap<String, FieldDescriptor>,
}

impl TypeDescriptor {
    pub(crate) const fn new(
        type_id: TypeId,
        type_name: &'static str,
        by_column: BTreeMap<String, FieldDescriptor>,
    ) -> Self {
        Self {
            type_id,
            type_name,
            by_column,
        }
    }

    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&FieldDescriptor> {
        self.by_column.get(column)
    }

    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.by_column.contains_key(column)
    }

    /// Column names in sorted order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.by_column.keys().map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.by_column.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_column.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_column.is_empty()
    }
}
