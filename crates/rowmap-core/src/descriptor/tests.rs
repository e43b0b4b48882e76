use super::*;
use crate::{
    error::BuildError,
    test_fixtures::{
        Audited, Captain, Cyclic, Document, DuplicateRename, Human, InvalidName, Ledger,
        NestedInvalid, Person, Pet, PromotedCollision, Team,
    },
};
use std::{sync::Arc, thread};

fn columns(descriptor: &TypeDescriptor) -> Vec<&str> {
    descriptor.columns().collect()
}

#[test]
fn self_referential_record_builds() {
    let registry = DescriptorRegistry::new();
    let descriptor = registry.descriptor::<Person>().unwrap();

    assert_eq!(columns(&descriptor), ["child", "id", "name"]);

    let child = descriptor.get("child").unwrap();
    assert_eq!(child.indices(), [2]);
    assert!(child.kind.is_optional_record());
    assert!(!child.promote);
}

#[test]
fn excluded_field_is_absent_and_renamed_field_uses_tag() {
    let registry = DescriptorRegistry::new();
    let descriptor = registry.descriptor::<Human>().unwrap();

    assert_eq!(
        columns(&descriptor),
        ["child", "first_name", "id", "last_name", "pet"]
    );
    assert!(!descriptor.contains("notes"));

    let pet = registry.descriptor::<crate::test_fixtures::Pet>().unwrap();
    let kind = pet.get("type").unwrap();
    assert!(kind.tagged);
    assert_eq!(kind.ident, "kind");
}

#[test]
fn embedded_records_merge_without_prefix_and_hidden_fields_are_skipped() {
    let registry = DescriptorRegistry::new();
    let descriptor = registry.descriptor::<Audited>().unwrap();

    assert_eq!(
        columns(&descriptor),
        ["created_at", "id", "label", "revision", "updated_at"]
    );
    assert!(!descriptor.contains("secret"));
    assert!(!descriptor.contains("stamps"));

    let created = descriptor.get("created_at").unwrap();
    assert_eq!(created.indices(), [2, 0]);
    assert_eq!(created.ident, "created_at");

    let revision = descriptor.get("revision").unwrap();
    assert_eq!(revision.indices(), [3, 0]);
}

#[test]
fn promoted_fields_are_prefixed_by_their_column() {
    let registry = DescriptorRegistry::new();
    let descriptor = registry.descriptor::<Document>().unwrap();

    assert_eq!(
        columns(&descriptor),
        [
            "created_created_at",
            "created_updated_at",
            "id",
            "reviewed_created_at",
            "reviewed_updated_at",
        ]
    );

    let reviewed = descriptor.get("reviewed_updated_at").unwrap();
    assert_eq!(
        reviewed.path,
        [PathStep::new(2, true), PathStep::new(1, false)]
    );
}

#[test]
fn promoted_fields_without_a_column_merge_unprefixed() {
    let registry = DescriptorRegistry::new();
    let descriptor = registry.descriptor::<Ledger>().unwrap();

    assert_eq!(columns(&descriptor), ["created_at", "id", "updated_at"]);

    let created = descriptor.get("created_at").unwrap();
    assert_eq!(
        created.path,
        [PathStep::new(1, false), PathStep::new(0, false)]
    );
}

#[test]
fn duplicate_column_names_fail() {
    let registry = DescriptorRegistry::new();
    let err = registry.descriptor::<DuplicateRename>().unwrap_err();

    assert!(
        matches!(err, BuildError::DuplicateColumn { ref column, .. } if column == "a"),
        "{err:?}"
    );
}

#[test]
fn promoted_collision_names_column_and_field() {
    let registry = DescriptorRegistry::new();
    let err = registry.descriptor::<PromotedCollision>().unwrap_err();

    match err {
        BuildError::DuplicatePromotedColumn { column, field, .. } => {
            assert_eq!(column, "created_at");
            assert_eq!(field, "stamps");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn invalid_column_override_falls_back_to_the_field_name() {
    let registry = DescriptorRegistry::new();
    let descriptor = registry.descriptor::<InvalidName>().unwrap();

    assert_eq!(columns(&descriptor), ["a"]);
    assert!(!descriptor.get("a").unwrap().tagged);
}

#[test]
fn nested_failures_surface_at_build_time() {
    let registry = DescriptorRegistry::new();
    let err = registry.descriptor::<NestedInvalid>().unwrap_err();

    assert!(matches!(err, BuildError::Nested { field: "inner", .. }));
    assert!(matches!(
        err.root_cause(),
        BuildError::DuplicateColumn { .. }
    ));
    assert!(!registry.contains::<NestedInvalid>());
}

#[test]
fn promoting_a_record_into_itself_fails() {
    let registry = DescriptorRegistry::new();
    let err = registry.descriptor::<Cyclic>().unwrap_err();

    assert!(matches!(
        err,
        BuildError::RecursivePromotion { field: "next", .. }
    ));
}

#[test]
fn registry_returns_the_published_descriptor() {
    let registry = DescriptorRegistry::new();
    let first = registry.descriptor::<Person>().unwrap();
    let second = registry.descriptor::<Person>().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.len(), 1);
}

#[test]
fn concurrent_first_use_converges_on_one_descriptor() {
    let registry = Arc::new(DescriptorRegistry::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.descriptor::<Human>().unwrap())
        })
        .collect();
    let descriptors: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let retained = registry.descriptor::<Human>().unwrap();
    for descriptor in &descriptors {
        assert!(Arc::ptr_eq(descriptor, &retained));
    }
    assert_eq!(registry.len(), 2);
}

#[test]
fn promotion_back_through_a_join_builds_in_either_order() {
    for team_first in [true, false] {
        let registry = DescriptorRegistry::new();
        let (team, captain) = if team_first {
            let team = registry.descriptor::<Team>().unwrap();
            (team, registry.descriptor::<Captain>().unwrap())
        } else {
            let captain = registry.descriptor::<Captain>().unwrap();
            (registry.descriptor::<Team>().unwrap(), captain)
        };

        assert_eq!(columns(&team), ["captain", "id"]);
        assert_eq!(columns(&captain), ["number", "team_captain", "team_id"]);
    }
}

#[test]
fn nested_records_are_published_while_describing() {
    let registry = DescriptorRegistry::new();
    registry.descriptor::<Human>().unwrap();

    assert!(registry.contains::<Pet>());

    let pet = registry.get(std::any::TypeId::of::<Pet>()).unwrap();
    let again = registry.descriptor::<Pet>().unwrap();
    assert!(Arc::ptr_eq(&pet, &again));
}

#[test]
fn partially_described_records_are_not_published() {
    let registry = DescriptorRegistry::new();
    registry.descriptor::<Team>().unwrap();

    // Captain was only validated under Team, its team columns were skipped
    assert!(!registry.contains::<Captain>());
}

#[test]
fn every_entry_is_keyed_by_its_own_column() {
    let registry = DescriptorRegistry::new();
    let descriptors = [
        registry.descriptor::<Person>().unwrap(),
        registry.descriptor::<Human>().unwrap(),
        registry.descriptor::<Document>().unwrap(),
        registry.descriptor::<Audited>().unwrap(),
        registry.descriptor::<Captain>().unwrap(),
    ];

    for descriptor in &descriptors {
        for column in descriptor.columns() {
            let field = descriptor.get(column).unwrap();
            assert_eq!(field.column, column);
            assert!(!field.path.is_empty());
        }
        assert_eq!(descriptor.fields().count(), descriptor.len());
    }
}
