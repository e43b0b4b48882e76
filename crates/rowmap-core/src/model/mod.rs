//! Declarative field model.
//!
//! This is the adapter boundary: `#[derive(Mapped)]` and hand-written
//! `Mapped` impls both describe a record as a `RecordShape`. Everything
//! downstream (descriptors, resolution, scan plans) consumes shapes only,
//! never the mechanism that produced them.

mod tag;


pub use tag::{TagOptions, is_valid_column, parse_tag};

use crate::traits::{Field, Mapped};
use std::{
    any::{TypeId, type_name},
    fmt,
};

///
/// FieldKind
///
/// Direct type of one field, after following at most one optional container.
///

#[derive(Clone, Copy)]
pub enum FieldKind {
    /// Scanned directly from a column.
    Leaf { type_name: &'static str },

    /// Nested record, optionally behind `Option<T>` / `Option<Box<T>>`.
    Record {
        optional: bool,
        type_id: TypeId,
        type_name: &'static str,
        shape: fn() -> RecordShape,
    },

    /// Cannot be mapped (for example doubly optional containers).
    Unsupported { type_name: &'static str },
}

impl FieldKind {
    #[must_use]
    pub fn leaf<T: ?Sized>() -> Self {
        Self::Leaf {
            type_name: type_name::<T>(),
        }
    }

    #[must_use]
    pub fn record<T: Mapped>(optional: bool) -> Self {
        Self::Record {
            optional,
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            shape: T::shape,
        }
    }

    #[must_use]
    pub fn unsupported<T: ?Sized>() -> Self {
        Self::Unsupported {
            type_name: type_name::<T>(),
        }
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Leaf { type_name }
            | Self::Record { type_name, .. }
            | Self::Unsupported { type_name } => type_name,
        }
    }

    #[must_use]
    pub const fn is_record(&self) -> bool {
        matches!(self, Self::Record { .. })
    }

    /// True for a nested record behind an optional container.
    #[must_use]
    pub const fn is_optional_record(&self) -> bool {
        matches!(self, Self::Record { optional: true, .. })
    }

    #[must_use]
    pub const fn record_type_id(&self) -> Option<TypeId> {
        match self {
            Self::Record { type_id, .. } => Some(*type_id),
            _ => None,
        }
    }
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf { type_name } => f.debug_tuple("Leaf").field(type_name).finish(),
            Self::Record {
                optional,
                type_name,
                ..
            } => f
                .debug_struct("Record")
                .field("type_name", type_name)
                .field("optional", optional)
                .finish(),
            Self::Unsupported { type_name } => {
                f.debug_tuple("Unsupported").field(type_name).finish()
            }
        }
    }
}

///
/// FieldShape
///
/// One declared field: position, name, tag metadata, and kind.
///

#[derive(Clone, Debug)]
pub struct FieldShape {
    /// Declaration index within the owning record.
    pub index: usize,
    /// Declared field name.
    pub ident: &'static str,
    /// Declared type, including any `Option` / `Box` wrappers.
    pub type_name: &'static str,
    /// Raw tag in `name[,option]*` syntax.
    pub tag: Option<&'static str>,
    /// Anonymous embedding: promoted into the parent without a prefix.
    pub embedded: bool,
    /// Whether the field is externally visible.
    pub visible: bool,
    pub kind: FieldKind,
}

impl FieldShape {
    /// Describe a visible, untagged field of type `F`.
    #[must_use]
    pub fn of<F: Field>(index: usize, ident: &'static str) -> Self {
        Self {
            index,
            ident,
            type_name: type_name::<F>(),
            tag: None,
            embedded: false,
            visible: true,
            kind: F::kind(),
        }
    }

    /// Describe a field that never participates in mapping.
    /// Its type does not need to implement `Field`.
    #[must_use]
    pub const fn excluded(index: usize, ident: &'static str) -> Self {
        Self {
            index,
            ident,
            type_name: "",
            tag: Some(crate::SKIP_TAG),
            embedded: false,
            visible: true,
            kind: FieldKind::Unsupported { type_name: "" },
        }
    }

    #[must_use]
    pub const fn tag(mut self, tag: &'static str) -> Self {
        self.tag = Some(tag);
        self
    }

    #[must_use]
    pub const fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    #[must_use]
    pub const fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    #[must_use]
    pub fn is_excluded(&self) -> bool {
        self.tag == Some(crate::SKIP_TAG)
    }
}

///
/// RecordShape
///

#[derive(Clone, Debug)]
pub struct RecordShape {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub fields: Vec<FieldShape>,
}

impl RecordShape {
    #[must_use]
    pub fn new<T: 'static>(fields: Vec<FieldShape>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            fields,
        }
    }
}
