//! Records described by hand instead of through the derive.

use rowmap::{
    cursor::MemoryCursor,
    descriptor::DescriptorRegistry,
    error::{BuildError, Error, ShapeError},
    model::{FieldKind, FieldShape, RecordShape},
    plan::ScanOptions,
    traits::{Field, FieldMut, Mapped, Record},
    value::Value,
};

///
/// Point
///

#[derive(Clone, Debug, Default, PartialEq)]
struct Point {
    x: i64,
    y: i64,
}

impl Mapped for Point {
    fn shape() -> RecordShape {
        RecordShape::new::<Self>(vec![
            FieldShape::of::<i64>(0, "x"),
            FieldShape::of::<i64>(1, "y"),
        ])
    }
}

impl Record for Point {
    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>> {
        match index {
            0 => Some(self.x.access()),
            1 => Some(self.y.access()),
            _ => None,
        }
    }

    fn is_default(&self) -> bool {
        self.x == 0 && self.y == 0
    }
}

impl Field for Point {
    fn kind() -> FieldKind {
        FieldKind::record::<Self>(false)
    }

    fn access(&mut self) -> FieldMut<'_> {
        FieldMut::Record(self)
    }

    fn option_kind() -> FieldKind {
        FieldKind::record::<Self>(true)
    }
}

///
/// Segment
///

#[derive(Clone, Debug, Default, PartialEq)]
struct Segment {
    id: i64,
    start: Point,
    end: Option<Point>,
}

impl Mapped for Segment {
    fn shape() -> RecordShape {
        RecordShape::new::<Self>(vec![
            FieldShape::of::<i64>(0, "id"),
            FieldShape::of::<Point>(1, "start").tag("from,promote"),
            FieldShape::of::<Option<Point>>(2, "end").tag("to"),
        ])
    }
}

impl Record for Segment {
    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>> {
        match index {
            0 => Some(self.id.access()),
            1 => Some(self.start.access()),
            2 => Some(self.end.access()),
            _ => None,
        }
    }

    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Field for Segment {
    fn kind() -> FieldKind {
        FieldKind::record::<Self>(false)
    }

    fn access(&mut self) -> FieldMut<'_> {
        FieldMut::Record(self)
    }
}

///
/// Broken
/// Declares a leaf but exposes a record.
///

#[derive(Clone, Debug, Default, PartialEq)]
struct Broken {
    inner: Point,
}

impl Mapped for Broken {
    fn shape() -> RecordShape {
        RecordShape::new::<Self>(vec![FieldShape::of::<i64>(0, "inner")])
    }
}

impl Record for Broken {
    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>> {
        match index {
            0 => Some(self.inner.access()),
            _ => None,
        }
    }

    fn is_default(&self) -> bool {
        self.inner.is_default()
    }
}

impl Field for Broken {
    fn kind() -> FieldKind {
        FieldKind::record::<Self>(false)
    }

    fn access(&mut self) -> FieldMut<'_> {
        FieldMut::Record(self)
    }
}

///
/// Spaced
/// Field name that cannot be a column.
///

#[derive(Clone, Debug, Default, PartialEq)]
struct Spaced {
    value: i64,
}

impl Mapped for Spaced {
    fn shape() -> RecordShape {
        RecordShape::new::<Self>(vec![
            FieldShape::of::<i64>(0, "my\"value").tag("my'value"),
        ])
    }
}

impl Record for Spaced {
    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>> {
        match index {
            0 => Some(self.value.access()),
            _ => None,
        }
    }

    fn is_default(&self) -> bool {
        self.value == 0
    }
}

impl Field for Spaced {
    fn kind() -> FieldKind {
        FieldKind::record::<Self>(false)
    }

    fn access(&mut self) -> FieldMut<'_> {
        FieldMut::Record(self)
    }
}

#[test]
fn invalid_override_on_an_invalid_field_name_fails() {
    let err = DescriptorRegistry::new().descriptor::<Spaced>().unwrap_err();

    assert!(matches!(
        err,
        BuildError::InvalidColumnName {
            field: "my\"value",
            ..
        }
    ));
}

#[test]
fn hand_written_shapes_build_descriptors() {
    let registry = DescriptorRegistry::new();
    let descriptor = registry.descriptor::<Segment>().unwrap();

    let columns: Vec<_> = descriptor.columns().collect();
    assert_eq!(columns, ["from_x", "from_y", "id", "to"]);
}

#[test]
fn hand_written_records_scan_and_collapse() {
    let cursor = MemoryCursor::from_rows(
        ["id", "from_x", "from_y", "to_x", "to_y"],
        vec![
            vec![
                Value::Int(1),
                Value::Int(2),
                Value::Int(3),
                Value::Int(4),
                Value::Int(5),
            ],
            vec![
                Value::Int(2),
                Value::Int(0),
                Value::Int(0),
                Value::Int(0),
                Value::Int(0),
            ],
        ],
    )
    .unwrap();

    let segments: Vec<Segment> = rowmap::select(cursor).unwrap();

    assert_eq!(
        segments[0],
        Segment {
            id: 1,
            start: Point { x: 2, y: 3 },
            end: Some(Point { x: 4, y: 5 }),
        }
    );
    assert_eq!(segments[1].start, Point::default());
    assert_eq!(segments[1].end, None);
}

#[test]
fn accessor_disagreeing_with_shape_is_a_shape_error() {
    let cursor = MemoryCursor::from_rows(["inner"], vec![vec![Value::Int(1)]]).unwrap();

    let err = rowmap::select_with::<Broken, _>(
        &DescriptorRegistry::new(),
        cursor,
        ScanOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        Error::Shape(ShapeError::Accessor { index: 0, .. })
    ));
}
