use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Error, Field, Fields, Ident, LitStr, Result, Type,
    spanned::Spanned,
};

pub(crate) fn expand_decode(input: &DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    if let Some(hook) = Hook::parse(&input.attrs)? {
        let target = match hook {
            Hook::Html => quote! { ::pluck::bind::Target::Html(self) },
            Hook::Text => quote! { ::pluck::bind::Target::Text(self) },
        };

        let expanded = quote! {
            impl #impl_generics ::pluck::bind::Decode for #name #ty_generics #where_clause {
                fn shape(&self) -> ::pluck::bind::Shape {
                    ::pluck::bind::Shape::Hook
                }

                fn target(&mut self) -> ::pluck::bind::Target<'_> {
                    #target
                }
            }
        };

        return Ok(expanded.into());
    }

    let Data::Struct(data) = &input.data else {
        Err(Error::new(
            input.span(),
            "`Decode` may only be derived on structs, or on types with a `decode(html)` or `decode(text)` attribute.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new(
            input.span(),
            "`Decode` may only be derived on structs with named fields.",
        ))?
    };

    let fields = fields
        .named
        .iter()
        .map(FieldMetadata::parse)
        .map(Result::transpose)
        .flatten() // Skip fields without an attribute.
        .collect::<Result<Vec<_>>>()?;

    let bindings = fields.iter().map(|field| {
        let ident = &field.name;
        let name = ident.to_string();
        let query = &field.query;

        quote! {
            binder.field(#name, #query, &mut self.#ident);
        }
    });

    // Generic structs need each bound field type to be decodable.
    let mut where_clause = where_clause.cloned();
    if !input.generics.params.is_empty() {
        let predicates = &mut where_clause
            .get_or_insert_with(|| syn::parse_quote!(where))
            .predicates;

        for field in &fields {
            let ty = &field.ty;
            predicates.push(syn::parse_quote!(#ty: ::pluck::bind::Decode));
        }
    }

    let expanded = quote! {
        impl #impl_generics ::pluck::bind::Decode for #name #ty_generics #where_clause {
            fn shape(&self) -> ::pluck::bind::Shape {
                ::pluck::bind::Shape::Struct
            }

            fn target(&mut self) -> ::pluck::bind::Target<'_> {
                ::pluck::bind::Target::Struct(self)
            }
        }

        impl #impl_generics ::pluck::bind::Fields for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn bind(&mut self, binder: &mut ::pluck::bind::Binder<'_, '_>) {
                #(#bindings)*
            }
        }
    };

    Ok(expanded.into())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hook {
    Html,
    Text,
}

impl Hook {
    /// Read the container's `decode(..)` attributes. `html` wins over `text`.
    fn parse(attrs: &[Attribute]) -> Result<Option<Self>> {
        let mut hook = None;

        for attr in attrs.iter().filter(|a| a.path().is_ident("decode")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("html") {
                    hook = Some(Hook::Html);
                } else if meta.path.is_ident("text") {
                    hook = hook.or(Some(Hook::Text));
                } else {
                    Err(meta.error("Hook kind must be `html` or `text`."))?
                }

                Ok(())
            })?;
        }

        Ok(hook)
    }
}

#[derive(Debug)]
struct FieldMetadata {
    name: Ident,
    ty: Type,
    query: LitStr,
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let mut attrs = field.attrs.iter().filter(|a| a.path().is_ident("query"));

        let Some(attr) = attrs.next() else {
            return Ok(None);
        };

        if let Some(duplicate) = attrs.next() {
            Err(Error::new_spanned(
                duplicate,
                "Fields may have at most one `query` attribute.",
            ))?
        }

        let query: LitStr = attr.parse_args()?;

        if query.value().trim().is_empty() {
            Err(Error::new_spanned(
                &query,
                "Query expressions must not be empty.",
            ))?
        }

        let Some(name) = field.ident.clone() else {
            Err(Error::new_spanned(field, "Queried fields must be named."))?
        };

        Ok(Some(Self {
            name,
            ty: field.ty.clone(),
            query,
        }))
    }
}
