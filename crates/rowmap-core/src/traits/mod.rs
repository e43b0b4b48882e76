mod scan;

#[cfg(test)]
mod tests;

pub use scan::{Discard, Scan};

use crate::model::{FieldKind, RecordShape};

// ============================================================================
// FIELD ACCESS
// ============================================================================
//
// The engine never sees concrete record types while scanning. It walks
// `dyn Record` values by declared field index and receives one of the
// `FieldMut` capabilities below for every step.
//

///
/// FieldMut
///
/// Mutable capability for one field of a live record.
///

pub enum FieldMut<'a> {
    /// Addressable leaf that a column value is scanned into.
    Leaf(&'a mut dyn Scan),
    /// Nested record stored inline (always present).
    Record(&'a mut dyn Record),
    /// Nested record behind an optional container.
    Optional(&'a mut dyn OptionalRecord),
}

impl FieldMut<'_> {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Leaf(_) => "leaf",
            Self::Record(_) => "record",
            Self::Optional(_) => "optional record",
        }
    }
}

///
/// Record
///
/// Object-safe view of a mapped record, addressed by declared field index.
///

pub trait Record {
    /// Access the field declared at `index`, or `None` for excluded fields.
    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>>;

    /// True when every field equals its default value.
    fn is_default(&self) -> bool;
}

///
/// OptionalRecord
///
/// An optional container around a nested record (`Option<T>`, `Option<Box<T>>`).
///

pub trait OptionalRecord {
    /// Allocate a default record when absent and return it.
    /// Returns `None` when the contained type is not a record.
    fn touch(&mut self) -> Option<&mut dyn Record>;

    /// The contained record, if present.
    fn present_mut(&mut self) -> Option<&mut dyn Record>;

    /// Reset the container to absent.
    fn clear(&mut self);

    fn is_present(&self) -> bool;
}

impl<T: Field> OptionalRecord for Option<T> {
    fn touch(&mut self) -> Option<&mut dyn Record> {
        match self.get_or_insert_with(T::default).access() {
            FieldMut::Record(record) => Some(record),
            FieldMut::Leaf(_) | FieldMut::Optional(_) => None,
        }
    }

    fn present_mut(&mut self) -> Option<&mut dyn Record> {
        match self.as_mut()?.access() {
            FieldMut::Record(record) => Some(record),
            FieldMut::Leaf(_) | FieldMut::Optional(_) => None,
        }
    }

    fn clear(&mut self) {
        *self = None;
    }

    fn is_present(&self) -> bool {
        self.is_some()
    }
}

///
/// Field
///
/// Static kind plus accessor dispatch for one field type.
///
/// Leaves and records both implement this. The `option_*` hooks let
/// `Option<T>` and `Option<Box<T>>` ask the innermost type how they are
/// addressed: a nullable leaf for scalars, an optional record otherwise.
///

pub trait Field: Default + 'static {
    fn kind() -> FieldKind;

    fn access(&mut self) -> FieldMut<'_>;

    fn option_kind() -> FieldKind {
        FieldKind::unsupported::<Option<Self>>()
    }

    fn option_access(slot: &mut Option<Self>) -> FieldMut<'_> {
        FieldMut::Optional(slot)
    }

    fn boxed_option_kind() -> FieldKind {
        Self::option_kind()
    }

    fn boxed_option_access(slot: &mut Option<Box<Self>>) -> FieldMut<'_> {
        FieldMut::Optional(slot)
    }
}

impl<T: Field> Field for Option<T> {
    fn kind() -> FieldKind {
        T::option_kind()
    }

    fn access(&mut self) -> FieldMut<'_> {
        T::option_access(self)
    }
}

/// Boxes exist for recursive records; `Option<Box<Box<T>>>` is not addressable.
impl<T: Field> Field for Box<T> {
    fn kind() -> FieldKind {
        T::kind()
    }

    fn access(&mut self) -> FieldMut<'_> {
        (**self).access()
    }

    fn option_kind() -> FieldKind {
        T::boxed_option_kind()
    }

    fn option_access(slot: &mut Option<Self>) -> FieldMut<'_> {
        T::boxed_option_access(slot)
    }

    fn boxed_option_kind() -> FieldKind {
        FieldKind::unsupported::<Option<Box<Self>>>()
    }
}

///
/// Mapped
///
/// A record type the engine can describe and scan into.
/// Implemented by `#[derive(Mapped)]` or by hand.
///

pub trait Mapped: Record + Field {
    /// Declaration-order description of this record's fields.
    fn shape() -> RecordShape;
}
