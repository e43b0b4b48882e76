use crate::value::ValueError;
use std::{error::Error as StdError, fmt};
use thiserror::Error as ThisError;

/// Boxed driver error carried through the engine.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

///
/// Error
///
/// Every failure surfaced by the engine, grouped by the stage that raised it.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

impl Error {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Build(_) => ErrorClass::Build,
            Self::Resolution(_) => ErrorClass::Resolution,
            Self::Scan(_) => ErrorClass::Scan,
            Self::Shape(_) => ErrorClass::Shape,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}: {self}", self.class())
    }
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorClass {
    Build,
    Resolution,
    Scan,
    Shape,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Build => "build",
            Self::Resolution => "resolution",
            Self::Scan => "scan",
            Self::Shape => "shape",
        };

        f.write_str(label)
    }
}

///
/// BuildError
///
/// Structural problems found while describing a record type.
/// Raised before any row is read.
///

#[derive(Debug, ThisError)]
pub enum BuildError {
    #[error("duplicate column name '{column}' in {type_name}")]
    DuplicateColumn {
        type_name: &'static str,
        column: String,
    },

    #[error("duplicate column name '{column}' promoted from field '{field}' in {type_name}")]
    DuplicatePromotedColumn {
        type_name: &'static str,
        column: String,
        field: &'static str,
    },

    #[error("invalid column name '{column}' on field '{field}' in {type_name}")]
    InvalidColumnName {
        type_name: &'static str,
        field: &'static str,
        column: String,
    },

    #[error("field '{field}' in {type_name} has unsupported type {field_type}")]
    UnsupportedField {
        type_name: &'static str,
        field: &'static str,
        field_type: &'static str,
    },

    #[error("field '{field}' in {type_name} promotes a record that flattens into itself")]
    RecursivePromotion {
        type_name: &'static str,
        field: &'static str,
    },

    #[error("failed to describe nested record '{field}' in {type_name}: {source}")]
    Nested {
        type_name: &'static str,
        field: &'static str,
        source: Box<Self>,
    },
}

impl BuildError {
    /// The innermost error, following nested record failures.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Nested { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

///
/// ResolutionError
///
/// A result column that does not address a leaf of the destination type.
///

#[derive(Debug, ThisError)]
pub enum ResolutionError {
    #[error("column '{column}' does not resolve against {type_name}")]
    UnknownColumn {
        type_name: &'static str,
        column: String,
    },

    #[error("column '{column}' names a nested record of {type_name}, not a leaf")]
    NotALeaf {
        type_name: &'static str,
        column: String,
    },

    #[error("no mapping for column '{column}'")]
    UnmappedColumn { column: String },

    #[error(transparent)]
    Build(#[from] BuildError),
}

impl ResolutionError {
    #[must_use]
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::UnknownColumn { column, .. }
            | Self::NotALeaf { column, .. }
            | Self::UnmappedColumn { column } => Some(column),
            Self::Build(_) => None,
        }
    }
}

///
/// ScanError
///
/// The row cursor or a leaf rejected a value. Aborts the current iteration.
///

#[derive(Debug, ThisError)]
pub enum ScanError {
    #[error("failed to read result columns: {source}")]
    Columns { source: BoxError },

    #[error("{}", cursor_message(.column.as_deref(), .source))]
    Cursor {
        column: Option<String>,
        source: BoxError,
    },

    #[error("failed to scan column '{column}': {source}")]
    Decode { column: String, source: ValueError },
}

impl ScanError {
    pub(crate) fn columns(source: impl Into<BoxError>) -> Self {
        Self::Columns {
            source: source.into(),
        }
    }

    pub fn cursor(column: Option<&str>, source: impl Into<BoxError>) -> Self {
        Self::Cursor {
            column: column.map(str::to_string),
            source: source.into(),
        }
    }
}

fn cursor_message(column: Option<&str>, source: &BoxError) -> String {
    match column {
        Some(column) => format!("row cursor failed on column '{column}': {source}"),
        None => format!("row cursor failed: {source}"),
    }
}

///
/// ShapeError
///
/// The destination does not have the shape the plan was compiled for.
///

#[derive(Debug, ThisError)]
pub enum ShapeError {
    #[error("scanner is bound to {expected}, given {found}")]
    DestinationMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("descriptor describes {expected}, destination is {found}")]
    DescriptorMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("field {index} of {type_name} is not addressable as declared")]
    Accessor { type_name: &'static str, index: usize },
}
