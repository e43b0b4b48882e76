//! Scan plan compilation.
//!
//! A plan is compiled once per query from the result columns and the
//! destination descriptor, then reused for every row of that query.


use crate::{
    descriptor::{DescriptorRegistry, PathStep, TypeDescriptor},
    error::{Error, ResolutionError, ShapeError},
    obs::sink::{self, MetricsEvent},
    resolve::resolve,
    traits::{FieldMut, Mapped, Record, Scan},
};
use serde::{Deserialize, Serialize};
use std::{any::TypeId, collections::BTreeSet};

///
/// UnknownColumnPolicy
///
/// What to do with a result column that does not resolve against the
/// destination type.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownColumnPolicy {
    /// Bind the column to a discard target. Tolerates wildcard projections.
    #[default]
    Ignore,
    /// Fail plan compilation.
    Error,
}

///
/// ScanOptions
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ScanOptions {
    pub unknown_columns: UnknownColumnPolicy,
}

impl ScanOptions {
    /// Options that reject unknown columns.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            unknown_columns: UnknownColumnPolicy::Error,
        }
    }

    #[must_use]
    pub const fn with_unknown_columns(mut self, policy: UnknownColumnPolicy) -> Self {
        self.unknown_columns = policy;
        self
    }
}

///
/// Target
///
/// The location one column value is scanned into for the current row.
///

pub enum Target<'a> {
    Discard,
    Leaf(&'a mut dyn Scan),
}

///
/// Targeter
///
/// Produces the target of one column on a live record, allocating
/// absent optional intermediates along the way.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Targeter {
    Discard,
    Direct { index: usize },
    Walk { path: Vec<PathStep> },
}

impl Targeter {
    fn from_path(path: Vec<PathStep>) -> Self {
        match path.as_slice() {
            [step] => Self::Direct { index: step.index },
            _ => Self::Walk { path },
        }
    }

    pub fn target<'a>(
        &self,
        root: &'a mut dyn Record,
        type_name: &'static str,
    ) -> Result<Target<'a>, ShapeError> {
        let (record, index) = match self {
            Self::Discard => return Ok(Target::Discard),
            Self::Direct { index } => (root, *index),
            Self::Walk { path } => {
                let Some((last, parents)) = path.split_last() else {
                    return Ok(Target::Discard);
                };

                (walk(root, parents, type_name)?, last.index)
            }
        };

        match record.field_mut(index) {
            Some(FieldMut::Leaf(leaf)) => Ok(Target::Leaf(leaf)),
            _ => Err(ShapeError::Accessor { type_name, index }),
        }
    }
}

// Descend through `steps`, touching optional records as they are reached.
fn walk<'a>(
    root: &'a mut dyn Record,
    steps: &[PathStep],
    type_name: &'static str,
) -> Result<&'a mut dyn Record, ShapeError> {
    let mut record = root;

    for step in steps {
        let current = record;
        let accessor = ShapeError::Accessor {
            type_name,
            index: step.index,
        };

        record = match current.field_mut(step.index) {
            Some(FieldMut::Record(nested)) => nested,
            Some(FieldMut::Optional(slot)) => slot.touch().ok_or(accessor)?,
            Some(FieldMut::Leaf(_)) | None => return Err(accessor),
        };
    }

    Ok(record)
}

///
/// ScanPlan
///
/// One targeter per result column in column order, plus the collapse set:
/// paths to optional nested records touched by the plan, deepest first.
///

#[derive(Clone, Debug)]
pub struct ScanPlan {
    type_id: TypeId,
    type_name: &'static str,
    columns: Vec<String>,
    targeters: Vec<Targeter>,
    collapse: Vec<Vec<PathStep>>,
}

impl ScanPlan {
    /// Compile a plan for `columns` against `descriptor`.
    pub fn compile(
        registry: &DescriptorRegistry,
        descriptor: &TypeDescriptor,
        columns: &[String],
        options: &ScanOptions,
    ) -> Result<Self, Error> {
        let mut targeters = Vec::with_capacity(columns.len());
        let mut collapse = BTreeSet::new();

        for column in columns {
            let resolution = match resolve(registry, descriptor, column) {
                Ok(resolution) => resolution,
                Err(err @ (ResolutionError::UnknownColumn { .. } | ResolutionError::NotALeaf { .. }))
                    if options.unknown_columns == UnknownColumnPolicy::Ignore =>
                {
                    tracing::trace!(column = %column, reason = %err, "discarding column");
                    targeters.push(Targeter::Discard);
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            collapse.extend(resolution.optional_prefixes().map(<[PathStep]>::to_vec));
            targeters.push(Targeter::from_path(resolution.path));
        }

        let mut collapse: Vec<_> = collapse.into_iter().collect();
        collapse.sort_by_key(|path| std::cmp::Reverse(path.len()));

        let plan = Self {
            type_id: descriptor.type_id(),
            type_name: descriptor.type_name(),
            columns: columns.to_vec(),
            targeters,
            collapse,
        };

        let discarded = plan.discarded();
        if discarded > 0 {
            tracing::debug!(
                type_name = plan.type_name,
                discarded,
                "scan plan discards unknown columns"
            );
        }
        sink::record(MetricsEvent::PlanCompiled {
            type_name: plan.type_name,
            columns: plan.columns.len() as u64,
            discarded: discarded as u64,
        });

        Ok(plan)
    }

    /// Compile a plan for `T` using the descriptor from `registry`.
    pub fn for_type<T: Mapped>(
        registry: &DescriptorRegistry,
        columns: &[String],
        options: &ScanOptions,
    ) -> Result<Self, Error> {
        let descriptor = registry.descriptor::<T>()?;

        Self::compile(registry, &descriptor, columns, options)
    }

    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn is_for<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn targeters(&self) -> &[Targeter] {
        &self.targeters
    }

    #[must_use]
    pub fn collapse_set(&self) -> &[Vec<PathStep>] {
        &self.collapse
    }

    /// Number of columns bound to a discard target.
    #[must_use]
    pub fn discarded(&self) -> usize {
        self.targeters
            .iter()
            .filter(|targeter| matches!(targeter, Targeter::Discard))
            .count()
    }
}
