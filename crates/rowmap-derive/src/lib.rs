use proc_macro::TokenStream;

mod mapped;

/// Derive `Mapped`, `Record` and `Field` for a struct with named fields.
///
/// Field attributes, all under `#[rowmap(...)]`:
/// - `rename = "column"`: explicit column name; an invalid name falls back
///   to the field name
/// - `skip`: never mapped
/// - `promote`: flatten a nested record's columns into the parent, prefixed
///   with `<rename>_` only when `rename` is given
/// - `embed`: flatten a nested record's columns without a prefix
#[proc_macro_derive(Mapped, attributes(rowmap))]
pub fn derive_mapped(input: TokenStream) -> TokenStream {
    mapped::derive_mapped(input.into()).into()
}
