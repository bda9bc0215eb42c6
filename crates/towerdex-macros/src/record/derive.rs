//! Code generation for `#[derive(Record)]`.
//!
//! Generates one `&'static str` constant per exposed field, a `FIELDS` list,
//! and a `towerdex_query::Record` implementation that matches on the field
//! name. `Option<_>` fields map `None` to `Value::None`.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, GenericArgument, PathArguments, Result, Type};

use super::attrs::{parse_record_attrs, FieldKind};

pub fn record_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Record can only be derived for structs",
            ))
        }
    };

    let mut field_arms: Vec<TokenStream> = Vec::new();
    let mut field_constants: Vec<TokenStream> = Vec::new();
    let mut query_names: Vec<String> = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_record_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let Some(kind) = attrs.kind else {
            continue;
        };

        let query_name = attrs.rename.unwrap_or_else(|| field_name.to_string());
        if query_names.contains(&query_name) {
            return Err(Error::new(
                field.span(),
                format!("duplicate record field name '{query_name}'"),
            ));
        }

        let const_name = format_ident!("{}", to_screaming_snake_case(&query_name));
        field_constants.push(quote! {
            pub const #const_name: &'static str = #query_name;
        });

        let value = match option_inner(&field.ty) {
            Some(_) => {
                let inner = value_expr(kind, quote! { value });
                quote! {
                    match &self.#field_name {
                        ::core::option::Option::Some(value) => #inner,
                        ::core::option::Option::None => ::towerdex_query::Value::None,
                    }
                }
            }
            None => value_expr(kind, quote! { &self.#field_name }),
        };

        field_arms.push(quote! {
            #query_name => #value,
        });
        query_names.push(query_name);
    }

    Ok(quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#field_constants)*

            /// Every field name this record exposes.
            pub const FIELDS: &'static [&'static str] = &[#(#query_names),*];
        }

        impl #impl_generics ::towerdex_query::Record for #struct_name #ty_generics #where_clause {
            fn field(&self, name: &str) -> ::towerdex_query::Value<'_> {
                match name {
                    #(#field_arms)*
                    _ => ::towerdex_query::Value::None,
                }
            }
        }
    })
}

/// `access` is an expression of type `&FieldType`.
fn value_expr(kind: FieldKind, access: TokenStream) -> TokenStream {
    match kind {
        FieldKind::String => quote! {
            ::towerdex_query::Value::String(::core::convert::AsRef::<str>::as_ref(#access))
        },
        FieldKind::Number => quote! {
            ::towerdex_query::Value::Number(::towerdex_query::Number::from(*#access))
        },
        FieldKind::Timestamp => quote! {
            ::towerdex_query::Value::Timestamp(
                ::towerdex_query::RecordTimestamp::record_timestamp(#access)
            )
        },
        FieldKind::Enum => quote! {
            ::towerdex_query::Value::String(::towerdex_query::RecordEnum::label(#access))
        },
        FieldKind::Bool => quote! {
            ::towerdex_query::Value::Bool(*#access)
        },
        FieldKind::Tags => quote! {
            ::towerdex_query::Value::Tags(
                (#access).iter().map(::towerdex_query::RecordTag::tag).collect()
            )
        },
    }
}

/// The `T` of an `Option<T>` field type, matched syntactically.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) if args.args.len() == 1 => match args.args.first()? {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' || c == '.' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = c.is_alphanumeric();
        }
    }

    result
}
