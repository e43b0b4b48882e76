use crate::{
    descriptor::PathStep,
    error::ShapeError,
    traits::{FieldMut, Record},
};

/// Reset every optional nested record in `paths` whose value equals its
/// default to absent. `paths` must be ordered deepest first.
///
/// Returns the number of records collapsed.
pub(crate) fn collapse(
    paths: &[Vec<PathStep>],
    root: &mut dyn Record,
    type_name: &'static str,
) -> Result<u64, ShapeError> {
    let mut collapsed = 0;

    for path in paths {
        if collapse_path(path, root, type_name)? {
            collapsed += 1;
        }
    }

    Ok(collapsed)
}

// Follow `path` to its final optional record; stop at the first absent one.
fn collapse_path(
    path: &[PathStep],
    root: &mut dyn Record,
    type_name: &'static str,
) -> Result<bool, ShapeError> {
    let Some((last, parents)) = path.split_last() else {
        return Ok(false);
    };

    let mut record = root;
    for step in parents {
        let current = record;
        record = match current.field_mut(step.index) {
            Some(FieldMut::Record(nested)) => nested,
            Some(FieldMut::Optional(slot)) => match slot.present_mut() {
                Some(nested) => nested,
                None => return Ok(false),
            },
            _ => return Err(accessor(type_name, step.index)),
        };
    }

    let Some(FieldMut::Optional(slot)) = record.field_mut(last.index) else {
        return Err(accessor(type_name, last.index));
    };
    if !slot.present_mut().is_some_and(|nested| nested.is_default()) {
        return Ok(false);
    }
    slot.clear();

    Ok(true)
}

const fn accessor(type_name: &'static str, index: usize) -> ShapeError {
    ShapeError::Accessor { type_name, index }
}
