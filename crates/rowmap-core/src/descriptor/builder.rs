use crate::{
    COLUMN_SEPARATOR,
    descriptor::{DescriptorRegistry, FieldDescriptor, PathStep, TypeDescriptor},
    error::BuildError,
    model::{FieldKind, FieldShape, RecordShape, is_valid_column, parse_tag},
};
use std::{any::TypeId, collections::BTreeMap, sync::Arc};

///
/// Built
///
/// A descriptor fresh out of the builder. `complete` is false when a promoted
/// record had to be skipped because it was already on the call chain; such a
/// descriptor is good for validation but must not be published.
///

pub(crate) struct Built {
    pub(crate) descriptor: TypeDescriptor,
    pub(crate) complete: bool,
}

// One record type currently being described.
#[derive(Clone, Copy)]
struct Link {
    type_id: TypeId,
    promoted: bool,
}

///
/// Builder
///
/// Walks a `RecordShape` into a descriptor. Nested records are fetched from
/// the registry when cached, and built then published otherwise.
///

pub(crate) struct Builder<'r> {
    registry: &'r DescriptorRegistry,
    chain: Vec<Link>,
}

impl<'r> Builder<'r> {
    pub(crate) const fn new(registry: &'r DescriptorRegistry) -> Self {
        Self {
            registry,
            chain: Vec::new(),
        }
    }

    pub(crate) fn build(&mut self, shape: &RecordShape) -> Result<Built, BuildError> {
        self.enter(shape, false)
    }

    fn enter(&mut self, shape: &RecordShape, promoted: bool) -> Result<Built, BuildError> {
        self.chain.push(Link {
            type_id: shape.type_id,
            promoted,
        });
        let result = self.columns(shape);
        self.chain.pop();

        result.map(|(by_column, complete)| Built {
            descriptor: TypeDescriptor::new(shape.type_id, shape.type_name, by_column),
            complete,
        })
    }

    fn columns(
        &mut self,
        shape: &RecordShape,
    ) -> Result<(BTreeMap<String, FieldDescriptor>, bool), BuildError> {
        let type_name = shape.type_name;
        let mut by_column = BTreeMap::new();
        let mut complete = true;

        for field in &shape.fields {
            if !participates(field) {
                continue;
            }

            let (column, tagged) = column_name(type_name, field)?;

            if let FieldKind::Unsupported { type_name: field_type } = field.kind {
                return Err(BuildError::UnsupportedField {
                    type_name,
                    field: field.ident,
                    field_type,
                });
            }

            let (_, options) = parse_tag(field.tag.unwrap_or_default());
            let promote =
                (options.promote() || (field.embedded && !tagged)) && field.kind.is_record();
            let step = PathStep::new(field.index, field.kind.is_optional_record());

            if let FieldKind::Record {
                type_id,
                shape: nested_shape,
                ..
            } = field.kind
            {
                let nested = self.nested(type_name, field.ident, type_id, nested_shape, promote)?;

                if promote {
                    match nested {
                        Some((nested, nested_complete)) => {
                            complete &= nested_complete;
                            let prefix = tagged.then_some(column);
                            merge_promoted(
                                &mut by_column,
                                &nested,
                                prefix,
                                step,
                                type_name,
                                field.ident,
                            )?;
                        }
                        None => complete = false,
                    }
                    continue;
                }
            }

            let descriptor = FieldDescriptor {
                column: column.to_string(),
                ident: field.ident,
                tagged,
                path: vec![step],
                declared_type: field.type_name,
                kind: field.kind,
                promote,
            };
            if by_column.contains_key(column) {
                return Err(BuildError::DuplicateColumn {
                    type_name,
                    column: column.to_string(),
                });
            }
            by_column.insert(column.to_string(), descriptor);
        }

        Ok((by_column, complete))
    }

    // Fetch or build a nested record's descriptor. `None` means the record is
    // already being described further up the chain and was not re-entered.
    fn nested(
        &mut self,
        type_name: &'static str,
        field: &'static str,
        type_id: TypeId,
        shape: fn() -> RecordShape,
        promote: bool,
    ) -> Result<Option<(Arc<TypeDescriptor>, bool)>, BuildError> {
        if let Some(found) = self.registry.get(type_id) {
            return Ok(Some((found, true)));
        }

        if let Some(at) = self.chain.iter().position(|link| link.type_id == type_id) {
            // every hop back to the record is a promotion: it would flatten forever
            if promote && self.chain[at + 1..].iter().all(|link| link.promoted) {
                return Err(BuildError::RecursivePromotion { type_name, field });
            }

            return Ok(None);
        }

        let built = self
            .enter(&shape(), promote)
            .map_err(|source| BuildError::Nested {
                type_name,
                field,
                source: Box::new(source),
            })?;

        if built.complete {
            Ok(Some((self.registry.publish(built.descriptor), true)))
        } else {
            Ok(Some((Arc::new(built.descriptor), false)))
        }
    }
}

// Explicit override when present and valid, the field name otherwise.
fn column_name(
    type_name: &'static str,
    field: &FieldShape,
) -> Result<(&'static str, bool), BuildError> {
    let (name, _) = parse_tag(field.tag.unwrap_or_default());

    if !name.is_empty() {
        if is_valid_column(name) {
            return Ok((name, true));
        }
        tracing::debug!(
            type_name,
            field = field.ident,
            column = name,
            "invalid column override, using the field name"
        );
    }

    if !is_valid_column(field.ident) {
        return Err(BuildError::InvalidColumnName {
            type_name,
            field: field.ident,
            column: field.ident.to_string(),
        });
    }

    Ok((field.ident, false))
}

// Excluded fields never participate; hidden ones only when embedded records.
fn participates(field: &FieldShape) -> bool {
    if field.is_excluded() {
        return false;
    }

    field.visible || (field.embedded && field.kind.is_record())
}

fn merge_promoted(
    by_column: &mut BTreeMap<String, FieldDescriptor>,
    nested: &TypeDescriptor,
    prefix: Option<&str>,
    step: PathStep,
    type_name: &'static str,
    field: &'static str,
) -> Result<(), BuildError> {
    for nested_field in nested.fields() {
        let column = match prefix {
            Some(prefix) => format!("{prefix}{COLUMN_SEPARATOR}{}", nested_field.column),
            None => nested_field.column.clone(),
        };
        if by_column.contains_key(&column) {
            return Err(BuildError::DuplicatePromotedColumn {
                type_name,
                column,
                field,
            });
        }

        let mut descriptor = nested_field.clone();
        descriptor.path.insert(0, step);
        descriptor.column.clone_from(&column);
        by_column.insert(column, descriptor);
    }

    Ok(())
}
