//! `#[derive(Injectable)]` expansion.

use darling::ast::Data;
use darling::{FromDeriveInput, FromField};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Attribute, DeriveInput, Expr, Lit, LitStr, Meta, Type};

const INJECT_TAG: &str = "*";

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(injectable), supports(struct_named, struct_unit))]
struct InjectableInput {
    ident: syn::Ident,
    generics: syn::Generics,
    data: Data<(), InjectableField>,
    #[darling(rename = "crate", default)]
    krate: Option<syn::Path>,
}

#[derive(Debug, FromField)]
#[darling(forward_attrs(inject))]
struct InjectableField {
    ident: Option<syn::Ident>,
    ty: Type,
    vis: syn::Visibility,
    attrs: Vec<Attribute>,
}

pub(crate) fn expand(input: &DeriveInput) -> darling::Result<TokenStream> {
    let input = InjectableInput::from_derive_input(input)?;

    if !input.generics.params.is_empty() {
        return Err(darling::Error::custom(
            "Injectable cannot be derived for generic structs",
        )
        .with_span(&input.generics));
    }

    let krate = input
        .krate
        .clone()
        .unwrap_or_else(|| syn::parse_quote!(::haqn));
    let ident = &input.ident;

    let Data::Struct(fields) = &input.data else {
        return Err(darling::Error::unsupported_shape("enum"));
    };

    let mut errors = darling::Error::accumulator();
    let entries: Vec<TokenStream> = fields
        .iter()
        .filter_map(|field| errors.handle(field_entry(&krate, ident, field)))
        .collect();
    errors.finish()?;

    Ok(quote! {
        impl #krate::Injectable for #ident {
            fn fields() -> ::std::vec::Vec<#krate::Field<Self>> {
                ::std::vec![#(#entries),*]
            }
        }

        const _: () = {
            fn register(types: &mut #krate::TypeTable) {
                types.register_struct::<#ident>();
            }
            #krate::inventory::submit! {
                #krate::TypeRegistration::new(register)
            }
        };
    })
}

fn field_entry(
    krate: &syn::Path,
    owner: &syn::Ident,
    field: &InjectableField,
) -> darling::Result<TokenStream> {
    let Some(name) = &field.ident else {
        return Err(darling::Error::unsupported_shape("tuple field"));
    };
    let name_str = name.to_string();

    let visibility = match field.vis {
        syn::Visibility::Public(_) => quote!(#krate::Visibility::Public),
        _ => quote!(#krate::Visibility::Private),
    };

    let tag = match inject_tag(&field.attrs)? {
        Some(tag) => quote!(::std::option::Option::Some(#tag)),
        None => quote!(::std::option::Option::None),
    };

    if is_injected(&field.ty) {
        Ok(quote! {
            #krate::Field::injected(#name_str, #visibility, #tag, |owner: &#owner| &owner.#name)
        })
    } else {
        Ok(quote! {
            #krate::Field::plain(#name_str, #visibility, #tag)
        })
    }
}

/// Reads the tag of the `#[inject]` attribute, if the field has one.
fn inject_tag(attrs: &[Attribute]) -> darling::Result<Option<String>> {
    let Some(attr) = attrs.iter().find(|attr| attr.path().is_ident("inject")) else {
        return Ok(None);
    };

    match &attr.meta {
        Meta::Path(_) => Ok(Some(INJECT_TAG.to_string())),
        Meta::NameValue(nv) => match &nv.value {
            Expr::Lit(expr) => match &expr.lit {
                Lit::Str(tag) => Ok(Some(tag.value())),
                other => Err(darling::Error::unexpected_lit_type(other)),
            },
            other => Err(darling::Error::unexpected_expr_type(other)),
        },
        Meta::List(_) => {
            let mut tag = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("tag") {
                    let value: LitStr = meta.value()?.parse()?;
                    tag = Some(value.value());
                    Ok(())
                } else {
                    Err(meta.error("expected `tag = \"...\"`"))
                }
            })?;
            Ok(Some(tag.unwrap_or_else(|| INJECT_TAG.to_string())))
        }
    }
}

/// `true` for `Injected<T>`, however the path to it is spelled.
fn is_injected(ty: &Type) -> bool {
    match ty {
        Type::Path(path) if path.qself.is_none() => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Injected"),
        _ => false,
    }
}
