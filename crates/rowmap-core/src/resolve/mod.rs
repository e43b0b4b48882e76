//! Column path resolution.
//!
//! A column either names a field of the descriptor exactly, or splits at its
//! first separator into a nested record field and a remainder that resolves
//! against that record. The split is structural: only a prefix that actually
//! names a nested record is followed, and only the first split is attempted.

#[cfg(test)]
mod tests;

use crate::{
    COLUMN_SEPARATOR,
    descriptor::{DescriptorRegistry, FieldDescriptor, PathStep, TypeDescriptor},
    error::{BuildError, ResolutionError},
    model::FieldKind,
};

///
/// Resolution
///
/// A column resolved to a leaf field and its full path from the root record.
///

#[derive(Clone, Debug)]
pub struct Resolution {
    pub column: String,
    pub field: FieldDescriptor,
    pub path: Vec<PathStep>,
}

impl Resolution {
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        self.path.iter().map(|step| step.index).collect()
    }

    /// The column lives directly on the root record.
    #[must_use]
    pub const fn is_direct(&self) -> bool {
        self.path.len() == 1
    }

    /// Path prefixes that end at an optional nested record.
    pub fn optional_prefixes(&self) -> impl Iterator<Item = &[PathStep]> {
        (1..self.path.len())
            .filter(|&len| self.path[len - 1].optional)
            .map(|len| &self.path[..len])
    }
}

/// Resolve `column` against `descriptor`.
pub fn resolve(
    registry: &DescriptorRegistry,
    descriptor: &TypeDescriptor,
    column: &str,
) -> Result<Resolution, ResolutionError> {
    match resolve_path(registry, descriptor, column)? {
        Some((field, _)) if field.kind.is_record() => Err(ResolutionError::NotALeaf {
            type_name: descriptor.type_name(),
            column: column.to_string(),
        }),
        Some((field, path)) => Ok(Resolution {
            column: column.to_string(),
            field,
            path,
        }),
        None => Err(ResolutionError::UnknownColumn {
            type_name: descriptor.type_name(),
            column: column.to_string(),
        }),
    }
}

fn resolve_path(
    registry: &DescriptorRegistry,
    descriptor: &TypeDescriptor,
    column: &str,
) -> Result<Option<(FieldDescriptor, Vec<PathStep>)>, BuildError> {
    if let Some(field) = descriptor.get(column) {
        return Ok(Some((field.clone(), field.path.clone())));
    }

    let Some((root, rest)) = column.split_once(COLUMN_SEPARATOR) else {
        return Ok(None);
    };
    let Some(root_field) = descriptor.get(root) else {
        return Ok(None);
    };
    let FieldKind::Record { type_id, shape, .. } = root_field.kind else {
        return Ok(None);
    };

    let nested = registry.describe(type_id, shape)?;
    let Some((field, rest_path)) = resolve_path(registry, &nested, rest)? else {
        return Ok(None);
    };

    let mut path = root_field.path.clone();
    path.extend(rest_path);

    Ok(Some((field, path)))
}
