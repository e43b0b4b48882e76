//! Record types shared by unit tests.
use rowmap_derive::Mapped;

///
/// Person
/// Self-referential record joined to itself through `child`.
///

#[derive(Clone, Debug, Default, Mapped, PartialEq)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub child: Option<Box<Person>>,
}

///
/// Pet
///

#[derive(Clone, Debug, Default, Mapped, PartialEq)]
pub struct Pet {
    pub id: i64,
    pub name: String,
    #[rowmap(rename = "type")]
    pub kind: String,
}

///
/// Human
/// Person with a pet, a child, and an excluded field.
///

#[derive(Clone, Debug, Default, Mapped, PartialEq)]
pub struct Human {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[rowmap(skip)]
    pub notes: Vec<String>,
    pub pet: Option<Pet>,
    pub child: Option<Box<Human>>,
}

///
/// Timestamps
///

#[derive(Clone, Debug, Default, Mapped, PartialEq)]
pub struct Timestamps {
    pub created_at: i64,
    pub updated_at: i64,
}

///
/// Revision
/// Embedded without being visible; its visible fields still map.
///

#[derive(Clone, Debug, Default, Mapped, PartialEq)]
pub struct Revision {
    pub revision: i64,
}

///
/// Audited
///

#[derive(Clone, Debug, Default, Mapped, PartialEq)]
pub struct Audited {
    pub id: i64,
    #[rowmap(rename = "label")]
    pub name: String,
    #[rowmap(embed)]
    pub stamps: Timestamps,
    #[rowmap(embed)]
    revision: Revision,
    secret: String,
}

impl Audited {
    pub const fn revision(&self) -> i64 {
        self.revision.revision
    }
}

///
/// Document
/// Same record promoted twice under different prefixes.
///

#[derive(Clone, Debug, Default, Mapped, PartialEq)]
pub struct Document {
    pub id: i64,
    #[rowmap(rename = "created", promote)]
    pub created: Timestamps,
    #[rowmap(rename = "reviewed", promote)]
    pub reviewed: Option<Timestamps>,
}

///
/// Ledger
/// Promoted without a column name, so its columns merge unprefixed.
///

#[derive(Clone, Debug, Default, Mapped, PartialEq)]
pub struct Ledger {
    pub id: i64,
    #[rowmap(promote)]
    pub stamps: Timestamps,
}

///
/// Team
/// Joined to `Captain`, which promotes its team back.
///

#[derive(Clone, Debug, Default, Mapped, PartialEq)]
pub struct Team {
    pub id: i64,
    pub captain: Option<Captain>,
}

///
/// Captain
///

#[derive(Clone, Debug, Default, Mapped, PartialEq)]
pub struct Captain {
    pub number: i64,
    #[rowmap(rename = "team", promote)]
    pub team: Option<Box<Team>>,
}

///
/// DuplicateRename
///

#[derive(Clone, Debug, Default, Mapped, PartialEq)]
pub struct DuplicateRename {
    pub a: i64,
    #[rowmap(rename = "a")]
    pub b: i64,
}

///
/// PromotedCollision
///

#[derive(Clone, Debug, Default, Mapped, PartialEq)]
pub struct PromotedCollision {
    pub created_at: i64,
    #[rowmap(embed)]
    pub stamps: Timestamps,
}

///
/// InvalidName
///

#[derive(Clone, Debug, Default, Mapped, PartialEq)]
pub struct InvalidName {
    #[rowmap(rename = "bad\"name")]
    pub a: i64,
}

///
/// NestedInvalid
///

#[derive(Clone, Debug, Default, Mapped, PartialEq)]
pub struct NestedInvalid {
    pub id: i64,
    pub inner: Option<DuplicateRename>,
}

///
/// Cyclic
/// Promotes itself, which cannot be flattened.
///

#[derive(Clone, Debug, Default, Mapped, PartialEq)]
pub struct Cyclic {
    pub id: i64,
    #[rowmap(promote)]
    pub next: Option<Box<Cyclic>>,
}
