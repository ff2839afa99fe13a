//! Implementation of the `#[derive(Record)]` macro.
//!
//! This macro generates an implementation of the `Record` trait and
//! field name constants for building criteria without string typos.

use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, Result, Visibility};

use super::attrs::{parse_container_attrs, parse_field_attrs};

/// Main implementation of the Record derive macro.
pub fn record_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    // Ensure we have a struct with named fields
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

    let container = parse_container_attrs(&input.attrs)?;

    let mut names: HashSet<String> = HashSet::new();
    let mut member_arms: Vec<TokenStream> = Vec::new();
    let mut snapshot_entries: Vec<TokenStream> = Vec::new();
    let mut constants: Vec<TokenStream> = Vec::new();

    // Methods come first so they shadow fields of the same name.
    for method in &container.methods {
        let name = method.to_string();
        if !names.insert(name.clone()) {
            return Err(Error::new(
                method.span(),
                format!("method '{}' is listed twice", name),
            ));
        }
        constants.push(name_constant(&name));
        member_arms.push(quote! {
            #name => ::std::option::Option::Some(::sift::Field::owned(
                ::sift::ToValue::to_value(&self.#method())
            )),
        });
    }

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_field_attrs(&field.attrs)?;

        // Skip if marked with #[record(skip)]
        if attrs.skip {
            continue;
        }

        // Private fields need an explicit opt-in
        let public = matches!(field.vis, Visibility::Public(_));
        if !public && !attrs.expose && !attrs.nested && attrs.rename.is_none() {
            continue;
        }

        let lookup_name = attrs.rename.unwrap_or_else(|| field_name.to_string());

        let (member_expr, snapshot_expr) = if attrs.nested {
            (
                quote! { ::sift::Field::record(&self.#field_name) },
                quote! {
                    ::sift::Record::snapshot(&self.#field_name)
                        .unwrap_or(::sift::Value::Null)
                },
            )
        } else {
            let value = quote! { ::sift::ToValue::to_value(&self.#field_name) };
            (quote! { ::sift::Field::owned(#value) }, value)
        };

        snapshot_entries.push(quote! {
            (::std::string::String::from(#lookup_name), #snapshot_expr),
        });

        if !names.insert(lookup_name.clone()) {
            continue;
        }
        constants.push(name_constant(&lookup_name));
        member_arms.push(quote! {
            #lookup_name => ::std::option::Option::Some(#member_expr),
        });
    }

    let expanded = quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#constants)*
        }

        impl #impl_generics ::sift::Record for #struct_name #ty_generics #where_clause {
            fn member(&self, name: &str) -> ::std::option::Option<::sift::Field<'_>> {
                match name {
                    #(#member_arms)*
                    _ => ::std::option::Option::None,
                }
            }

            fn snapshot(&self) -> ::std::option::Option<::sift::Value> {
                let entries: ::std::vec::Vec<(::std::string::String, ::sift::Value)> =
                    ::std::vec![#(#snapshot_entries)*];
                ::std::option::Option::Some(::sift::Value::Map(entries.into_iter().collect()))
            }
        }
    };

    Ok(expanded)
}

fn name_constant(name: &str) -> TokenStream {
    let const_name = format_ident!("{}", to_screaming_snake_case(name));
    quote! {
        /// Field name constant for building criteria.
        pub const #const_name: &'static str = #name;
    }
}

/// Convert a string to SCREAMING_SNAKE_CASE.
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
            prev_was_lower = true;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screaming_snake_case() {
        assert_eq!(to_screaming_snake_case("name"), "NAME");
        assert_eq!(to_screaming_snake_case("created_at"), "CREATED_AT");
        assert_eq!(to_screaming_snake_case("createdAt"), "CREATED_AT");
        assert_eq!(to_screaming_snake_case("my-field"), "MY_FIELD");
        assert_eq!(to_screaming_snake_case("get_total"), "GET_TOTAL");
    }

    fn expand(input: DeriveInput) -> String {
        record_derive_impl(input).unwrap().to_string()
    }

    #[test]
    fn test_public_fields_exposed_private_hidden() {
        let out = expand(syn::parse_quote! {
            struct Task {
                pub name: String,
                secret: String,
                #[record(field)]
                priority: u8,
            }
        });
        assert!(out.contains("pub const NAME"));
        assert!(out.contains("pub const PRIORITY"));
        assert!(!out.contains("SECRET"));
    }

    #[test]
    fn test_method_shadows_field() {
        let out = expand(syn::parse_quote! {
            #[record(methods(total))]
            struct Order {
                pub total: u32,
            }
        });
        assert_eq!(out.matches("pub const TOTAL").count(), 1);
        assert!(out.contains("self . total ()"));
    }

    #[test]
    fn test_rejects_tuple_struct() {
        let input: DeriveInput = syn::parse_quote! {
            struct Pair(u8, u8);
        };
        let err = record_derive_impl(input).unwrap_err();
        assert!(err.to_string().contains("named fields"));
    }

    #[test]
    fn test_rejects_enum() {
        let input: DeriveInput = syn::parse_quote! {
            enum Status { Open }
        };
        assert!(record_derive_impl(input).is_err());
    }

    #[test]
    fn test_duplicate_method() {
        let input: DeriveInput = syn::parse_quote! {
            #[record(methods(a, a))]
            struct S {}
        };
        assert!(record_derive_impl(input).is_err());
    }
}
