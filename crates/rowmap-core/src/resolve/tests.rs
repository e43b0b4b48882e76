use super::*;
use crate::test_fixtures::{Document, Human, Person};
use proptest::prelude::*;

fn person() -> (DescriptorRegistry, std::sync::Arc<TypeDescriptor>) {
    let registry = DescriptorRegistry::new();
    let descriptor = registry.descriptor::<Person>().unwrap();
    (registry, descriptor)
}

#[test]
fn exact_match_resolves_directly() {
    let (registry, descriptor) = person();
    let resolution = resolve(&registry, &descriptor, "name").unwrap();

    assert!(resolution.is_direct());
    assert_eq!(resolution.indices(), [1]);
}

#[test]
fn nested_columns_resolve_through_records() {
    let (registry, descriptor) = person();

    let resolution = resolve(&registry, &descriptor, "child_child_name").unwrap();
    assert_eq!(resolution.indices(), [2, 2, 1]);
    assert_eq!(resolution.field.column, "name");

    let prefixes: Vec<_> = resolution
        .optional_prefixes()
        .map(|prefix| prefix.iter().map(|step| step.index).collect::<Vec<_>>())
        .collect();
    assert_eq!(prefixes, [vec![2], vec![2, 2]]);
}

#[test]
fn underscored_leaf_names_match_before_splitting() {
    let registry = DescriptorRegistry::new();
    let descriptor = registry.descriptor::<Human>().unwrap();

    let direct = resolve(&registry, &descriptor, "first_name").unwrap();
    assert_eq!(direct.indices(), [1]);

    let nested = resolve(&registry, &descriptor, "child_first_name").unwrap();
    assert_eq!(nested.indices(), [5, 1]);

    let pet = resolve(&registry, &descriptor, "child_pet_type").unwrap();
    assert_eq!(pet.indices(), [5, 4, 2]);
}

#[test]
fn promoted_columns_resolve_by_exact_match() {
    let registry = DescriptorRegistry::new();
    let descriptor = registry.descriptor::<Document>().unwrap();

    let resolution = resolve(&registry, &descriptor, "reviewed_created_at").unwrap();
    assert_eq!(resolution.indices(), [2, 0]);
    assert_eq!(resolution.optional_prefixes().count(), 1);
}

#[test]
fn unknown_columns_fail() {
    let (registry, descriptor) = person();

    for column in ["missing", "name_first", "child_missing", "id_extra", ""] {
        let err = resolve(&registry, &descriptor, column).unwrap_err();
        assert!(
            matches!(err, ResolutionError::UnknownColumn { .. }),
            "{column}: {err:?}"
        );
    }
}

#[test]
fn record_columns_are_not_leaves() {
    let (registry, descriptor) = person();

    let err = resolve(&registry, &descriptor, "child_child").unwrap_err();
    assert!(matches!(err, ResolutionError::NotALeaf { .. }));
    assert_eq!(err.column(), Some("child_child"));
}

proptest! {
    #[test]
    fn resolution_is_deterministic(depth in 0usize..6, leaf in prop::sample::select(vec!["id", "name"])) {
        let (registry, descriptor) = person();
        let column = format!("{}{leaf}", "child_".repeat(depth));

        let first = resolve(&registry, &descriptor, &column).unwrap();
        let second = resolve(&registry, &descriptor, &column).unwrap();

        prop_assert_eq!(first.path.clone(), second.path);
        prop_assert_eq!(first.path.len(), depth + 1);
    }
}
