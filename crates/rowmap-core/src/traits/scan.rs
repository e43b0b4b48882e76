use crate::{
    model::FieldKind,
    traits::{Field, FieldMut},
    value::{Value, ValueError},
};

///
/// Scan
///
/// Typed leaf location that accepts one column value.
///

pub trait Scan {
    fn scan(&mut self, value: Value) -> Result<(), ValueError>;
}

///
/// Discard
///
/// Scan sink for columns that map to nothing.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct Discard;

impl Scan for Discard {
    fn scan(&mut self, _: Value) -> Result<(), ValueError> {
        Ok(())
    }
}

impl Scan for Value {
    fn scan(&mut self, value: Value) -> Result<(), ValueError> {
        *self = value;
        Ok(())
    }
}

impl Scan for bool {
    fn scan(&mut self, value: Value) -> Result<(), ValueError> {
        *self = match value {
            Value::Bool(v) => v,
            // sqlite and friends store booleans as integers
            Value::Int(0) => false,
            Value::Int(1) => true,
            Value::Int(v) => {
                return Err(ValueError::OutOfRange {
                    expected: "bool",
                    value: v,
                });
            }
            other => return Err(ValueError::mismatch::<Self>(&other)),
        };

        Ok(())
    }
}

impl Scan for String {
    fn scan(&mut self, value: Value) -> Result<(), ValueError> {
        match value {
            Value::Text(v) => {
                *self = v;
                Ok(())
            }
            other => Err(ValueError::mismatch::<Self>(&other)),
        }
    }
}

impl Scan for Vec<u8> {
    fn scan(&mut self, value: Value) -> Result<(), ValueError> {
        *self = match value {
            Value::Blob(v) => v,
            Value::Text(v) => v.into_bytes(),
            other => return Err(ValueError::mismatch::<Self>(&other)),
        };

        Ok(())
    }
}

impl Scan for f64 {
    #[allow(clippy::cast_precision_loss)]
    fn scan(&mut self, value: Value) -> Result<(), ValueError> {
        *self = match value {
            Value::Float(v) => v,
            Value::Int(v) => v as Self,
            other => return Err(ValueError::mismatch::<Self>(&other)),
        };

        Ok(())
    }
}

impl Scan for f32 {
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn scan(&mut self, value: Value) -> Result<(), ValueError> {
        *self = match value {
            Value::Float(v) => v as Self,
            Value::Int(v) => v as Self,
            other => return Err(ValueError::mismatch::<Self>(&other)),
        };

        Ok(())
    }
}

impl<T: Scan + Default> Scan for Option<T> {
    fn scan(&mut self, value: Value) -> Result<(), ValueError> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }

        let mut inner = T::default();
        inner.scan(value)?;
        *self = Some(inner);

        Ok(())
    }
}

impl<T: Scan + ?Sized> Scan for Box<T> {
    fn scan(&mut self, value: Value) -> Result<(), ValueError> {
        (**self).scan(value)
    }
}

// impl_scan_int
macro_rules! impl_scan_int {
    ( $( $type:ty ),* $(,)? ) => {
        $(
            impl Scan for $type {
                fn scan(&mut self, value: Value) -> Result<(), ValueError> {
                    match value {
                        Value::Int(v) => {
                            *self = <$type>::try_from(v).map_err(|_| ValueError::OutOfRange {
                                expected: stringify!($type),
                                value: v,
                            })?;
                            Ok(())
                        }
                        other => Err(ValueError::mismatch::<Self>(&other)),
                    }
                }
            }
        )*
    };
}

impl_scan_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

// impl_leaf_field
macro_rules! impl_leaf_field {
    ( $( $type:ty ),* $(,)? ) => {
        $(
            impl Field for $type {
                fn kind() -> FieldKind {
                    FieldKind::leaf::<Self>()
                }

                fn access(&mut self) -> FieldMut<'_> {
                    FieldMut::Leaf(self)
                }

                fn option_kind() -> FieldKind {
                    FieldKind::leaf::<Option<Self>>()
                }

                fn option_access(slot: &mut Option<Self>) -> FieldMut<'_> {
                    FieldMut::Leaf(slot)
                }

                fn boxed_option_kind() -> FieldKind {
                    FieldKind::leaf::<Option<Box<Self>>>()
                }

                fn boxed_option_access(slot: &mut Option<Box<Self>>) -> FieldMut<'_> {
                    FieldMut::Leaf(slot)
                }
            }
        )*
    };
}

impl_leaf_field!(
    bool,
    f32,
    f64,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    String,
    Vec<u8>,
    Value,
);
