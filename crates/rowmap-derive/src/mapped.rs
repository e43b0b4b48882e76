use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Error, Field, Fields, LitStr, Visibility, ext::IdentExt};

// derive_mapped
pub fn derive_mapped(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    match expand(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Struct(data) = &input.data else {
        return Err(Error::new_spanned(
            ident,
            "Mapped can only be derived for structs with named fields",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(Error::new_spanned(
            &data.fields,
            "Mapped can only be derived for structs with named fields",
        ));
    };

    let mut shapes = Vec::new();
    let mut accessors = Vec::new();

    for (index, field) in named.named.iter().enumerate() {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let name = field_ident.unraw().to_string();
        let attrs = FieldAttrs::parse(field)?;

        if attrs.skip {
            shapes.push(quote! {
                ::rowmap::model::FieldShape::excluded(#index, #name)
            });
            continue;
        }

        let ty = &field.ty;
        let visible = !matches!(field.vis, Visibility::Inherited);
        let tag = attrs.tag().map(|tag| quote!(.tag(#tag)));
        let embedded = attrs.embed.then(|| quote!(.embedded()));

        shapes.push(quote! {
            ::rowmap::model::FieldShape::of::<#ty>(#index, #name)
                #tag
                #embedded
                .visible(#visible)
        });
        accessors.push(quote! {
            #index => ::core::option::Option::Some(
                ::rowmap::traits::Field::access(&mut self.#field_ident)
            ),
        });
    }

    Ok(quote! {
        impl #impl_generics ::rowmap::traits::Mapped for #ident #ty_generics #where_clause {
            fn shape() -> ::rowmap::model::RecordShape {
                ::rowmap::model::RecordShape::new::<Self>(::std::vec![#(#shapes),*])
            }
        }

        impl #impl_generics ::rowmap::traits::Record for #ident #ty_generics #where_clause {
            fn field_mut(
                &mut self,
                index: usize,
            ) -> ::core::option::Option<::rowmap::traits::FieldMut<'_>> {
                match index {
                    #(#accessors)*
                    _ => ::core::option::Option::None,
                }
            }

            fn is_default(&self) -> bool {
                *self == <Self as ::core::default::Default>::default()
            }
        }

        impl #impl_generics ::rowmap::traits::Field for #ident #ty_generics #where_clause {
            fn kind() -> ::rowmap::model::FieldKind {
                ::rowmap::model::FieldKind::record::<Self>(false)
            }

            fn access(&mut self) -> ::rowmap::traits::FieldMut<'_> {
                ::rowmap::traits::FieldMut::Record(self)
            }

            fn option_kind() -> ::rowmap::model::FieldKind {
                ::rowmap::model::FieldKind::record::<Self>(true)
            }
        }
    })
}

///
/// FieldAttrs
///

#[derive(Default)]
struct FieldAttrs {
    rename: Option<LitStr>,
    skip: bool,
    promote: bool,
    embed: bool,
}

impl FieldAttrs {
    fn parse(field: &Field) -> syn::Result<Self> {
        let mut attrs = Self::default();

        for attr in &field.attrs {
            if !attr.path().is_ident("rowmap") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    attrs.rename = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("skip") {
                    attrs.skip = true;
                } else if meta.path.is_ident("promote") {
                    attrs.promote = true;
                } else if meta.path.is_ident("embed") {
                    attrs.embed = true;
                } else {
                    return Err(meta.error("expected `rename`, `skip`, `promote` or `embed`"));
                }

                Ok(())
            })?;
        }

        if attrs.skip && (attrs.rename.is_some() || attrs.promote || attrs.embed) {
            return Err(Error::new_spanned(
                field,
                "`skip` cannot be combined with other rowmap attributes",
            ));
        }

        Ok(attrs)
    }

    // Render as `name[,promote]`, the runtime tag syntax.
    fn tag(&self) -> Option<String> {
        let name = self.rename.as_ref().map(LitStr::value).unwrap_or_default();
        let tag = if self.promote {
            format!("{name},promote")
        } else {
            name
        };

        (!tag.is_empty()).then_some(tag)
    }
}
