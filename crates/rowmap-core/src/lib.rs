//! Core runtime for rowmap: the field model, cached type descriptors, column
//! resolution, scan plans, row scanning, and zero-value collapse of optional
//! nested records.
#![warn(unreachable_pub)]

extern crate self as rowmap;

// public exports are one module level down
pub mod cursor;
pub mod descriptor;
pub mod error;
pub mod mapper;
pub mod model;
pub mod obs;
pub mod plan;
pub mod resolve;
pub mod scan;
pub mod traits;
pub mod value;

pub use error::Error;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// CONSTANTS
///

/// Separator between a nested record's column and its sub-columns.
pub const COLUMN_SEPARATOR: char = '_';

/// Struct tag option that flattens a nested record into its parent.
pub const PROMOTE_OPTION: &str = "promote";

/// Struct tag value that excludes a field from mapping.
pub const SKIP_TAG: &str = "-";

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, registries, or cursors are re-exported here.
///

pub mod prelude {
    pub use crate::{
        model::{FieldKind, FieldShape, RecordShape},
        traits::{Field, FieldMut, Mapped, Record, Scan},
        value::Value,
    };
}
