use super::*;
use crate::{
    test_fixtures::{Person, Pet},
    value::{Value, ValueError},
};

#[test]
fn booleans_accept_integer_storage() {
    let mut flag = false;

    flag.scan(Value::Int(1)).unwrap();
    assert!(flag);
    flag.scan(Value::Bool(false)).unwrap();
    assert!(!flag);

    let err = flag.scan(Value::Int(2)).unwrap_err();
    assert!(matches!(err, ValueError::OutOfRange { value: 2, .. }));
}

#[test]
fn narrow_integers_reject_out_of_range_values() {
    let mut small = 0i8;

    small.scan(Value::Int(-128)).unwrap();
    assert_eq!(small, -128);

    let err = small.scan(Value::Int(300)).unwrap_err();
    assert!(matches!(err, ValueError::OutOfRange { expected: "i8", value: 300 }));
    assert_eq!(small, -128);

    let mut unsigned = 0u32;
    assert!(unsigned.scan(Value::Int(-1)).is_err());
}

#[test]
fn nullable_leaves_scan_null_as_none() {
    let mut age: Option<i64> = Some(3);

    age.scan(Value::Null).unwrap();
    assert_eq!(age, None);

    age.scan(Value::Int(40)).unwrap();
    assert_eq!(age, Some(40));

    let mut required = 0i64;
    let err = required.scan(Value::Null).unwrap_err();
    assert!(matches!(err, ValueError::UnexpectedNull { .. }));
}

#[test]
fn floats_and_blobs_widen() {
    let mut ratio = 0.0f64;
    ratio.scan(Value::Int(2)).unwrap();
    assert!((ratio - 2.0).abs() < f64::EPSILON);

    let mut bytes = Vec::<u8>::new();
    bytes.scan(Value::from("ab")).unwrap();
    assert_eq!(bytes, b"ab");
}

#[test]
fn discard_accepts_anything() {
    let mut sink = Discard;

    for value in [Value::Null, Value::Int(1), Value::from("x"), Value::Blob(vec![1])] {
        sink.scan(value).unwrap();
    }
}

#[test]
fn optional_records_touch_and_clear() {
    let mut pet: Option<Pet> = None;

    assert!(!pet.is_present());
    assert!(pet.present_mut().is_none());

    let record = pet.touch().unwrap();
    assert!(record.is_default());
    assert!(pet.is_present());

    pet.clear();
    assert_eq!(pet, None);
}

#[test]
fn boxed_optional_records_are_addressable() {
    let mut person = Person::default();

    let Some(FieldMut::Optional(child)) = person.field_mut(2) else {
        panic!("child is an optional record");
    };
    let child = child.touch().unwrap();

    let Some(FieldMut::Leaf(name)) = child.field_mut(1) else {
        panic!("name is a leaf");
    };
    name.scan(Value::from("Kid")).unwrap();

    assert_eq!(person.child.unwrap().name, "Kid");
}

#[test]
fn field_labels() {
    let mut person = Person::default();

    let labels: Vec<_> = (0..3)
        .map(|index| person.field_mut(index).unwrap().label())
        .collect();
    assert_eq!(labels, ["leaf", "leaf", "optional record"]);
    assert!(person.field_mut(3).is_none());
}
