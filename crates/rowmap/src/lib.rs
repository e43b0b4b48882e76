//! Map flat, column-named rows onto nested records.
//!
//! ## Crate layout
//! - `model` / `traits`: the field model records are described with.
//! - `descriptor`: cached column maps per record type.
//! - `resolve` / `plan` / `scan`: column resolution, per-query plans, row scanning.
//! - `mapper`: hand-written column mappings for types without a descriptor.
//! - `cursor` / `value`: the row source contract.
//! - `obs`: counters and the metrics sink.
//! - `sqlite`: `RowCursor` over rusqlite statements (feature `sqlite`).
//!
//! Records derive [`Mapped`]; optional nested records live in `Option<T>` or
//! `Option<Box<T>>` and are reset to `None` when every column scanned into
//! them came back as a default value.

pub use rowmap_core as core;

pub use rowmap_core::{
    COLUMN_SEPARATOR, Error, PROMOTE_OPTION, SKIP_TAG, cursor, descriptor, error, mapper, model,
    obs, plan, resolve, scan, traits, value,
};
pub use rowmap_derive::Mapped;

#[cfg(feature = "sqlite")]
pub mod sqlite;

//
// Entry points
//

pub use scan::{
    DestScanner, RowScanner, resolve_and_scan, select, select_into, select_one, select_with,
};

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Mapped,
        cursor::{MemoryCursor, RowCursor},
        descriptor::DescriptorRegistry,
        mapper::{Mapper, MappingScanner},
        plan::{ScanOptions, UnknownColumnPolicy},
        scan::{DestScanner, RowScanner},
        traits::{Field as _, Record as _, Scan as _},
        value::Value,
    };
}
