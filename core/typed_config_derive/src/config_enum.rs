/*
 * Licensed to the Apache Software Foundation (ASF) under one
 * or more contributor license agreements.  See the NOTICE file
 * distributed with this work for additional information
 * regarding copyright ownership.  The ASF licenses this file
 * to you under the Apache License, Version 2.0 (the
 * "License"); you may not use this file except in compliance
 * with the License.  You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing,
 * software distributed under the License is distributed on an
 * "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
 * KIND, either express or implied.  See the License for the
 * specific language governing permissions and limitations
 * under the License.
 */

use convert_case::{Case, Casing};
use darling::{FromDeriveInput, FromVariant};
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use std::collections::HashSet;
use syn::{DeriveInput, Generics, Ident};

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(config), supports(enum_unit))]
struct ConfigEnumOpts {
    ident: Ident,
    generics: Generics,
    data: darling::ast::Data<VariantOpts, ()>,
}

#[derive(Debug, FromVariant)]
#[darling(attributes(config))]
struct VariantOpts {
    ident: Ident,

    /// Name matched instead of the SCREAMING_SNAKE form of the variant.
    #[darling(default)]
    name: Option<String>,
}

pub fn generate_impl(input: &DeriveInput) -> TokenStream2 {
    match ConfigEnumOpts::from_derive_input(input) {
        Ok(opts) => generate_from_opts(opts).unwrap_or_else(syn::Error::into_compile_error),
        Err(e) => e.write_errors(),
    }
}

fn canonical_name(variant: &VariantOpts) -> String {
    match &variant.name {
        Some(name) => name.trim().to_uppercase().replace([' ', '-'], "_"),
        None => variant.ident.to_string().to_case(Case::UpperSnake),
    }
}

fn generate_from_opts(opts: ConfigEnumOpts) -> syn::Result<TokenStream2> {
    let enum_name = &opts.ident;
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();
    let variants = match opts.data {
        darling::ast::Data::Enum(variants) => variants,
        darling::ast::Data::Struct(_) => {
            return Err(syn::Error::new(
                enum_name.span(),
                "ConfigEnum can only be derived for enums with unit variants",
            ));
        }
    };

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(variants.len());
    for variant in &variants {
        let name = canonical_name(variant);
        if !seen.insert(name.clone()) {
            return Err(syn::Error::new(
                variant.ident.span(),
                format!("another variant is already named `{name}`"),
            ));
        }
        let ident = &variant.ident;
        entries.push(quote! { (#name, Self::#ident) });
    }
    let type_name = enum_name.to_string();

    Ok(quote! {
        impl #impl_generics ::typed_config::ConfigEnum for #enum_name #ty_generics #where_clause {
            const VARIANTS: &'static [(&'static str, Self)] = &[#(#entries),*];
        }

        impl #impl_generics ::typed_config::FromValue for #enum_name #ty_generics #where_clause {
            fn type_name() -> ::std::borrow::Cow<'static, str> {
                ::std::borrow::Cow::Borrowed(#type_name)
            }

            fn from_value(value: &::typed_config::Value) -> ::typed_config::Result<Self> {
                ::typed_config::coerce::enum_from_value::<Self>(value)
            }
        }

        impl #impl_generics ::typed_config::Bind for #enum_name #ty_generics #where_clause {
            fn bind(
                value: &::typed_config::Value,
                _: &::typed_config::BindContext<'_>,
            ) -> ::typed_config::Result<Self> {
                <Self as ::typed_config::FromValue>::from_value(value)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn variant(ident: Ident, name: Option<&str>) -> VariantOpts {
        VariantOpts {
            ident,
            name: name.map(str::to_owned),
        }
    }

    #[test]
    fn variant_names_are_screaming_snake() {
        assert_eq!(canonical_name(&variant(parse_quote!(RoundRobin), None)), "ROUND_ROBIN");
        assert_eq!(canonical_name(&variant(parse_quote!(Tcp), None)), "TCP");
        assert_eq!(
            canonical_name(&variant(parse_quote!(Quic), Some("quic-v1"))),
            "QUIC_V1"
        );
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let input: DeriveInput = parse_quote! {
            enum Mode {
                Fast,
                #[config(name = "fast")]
                Quick,
            }
        };
        let output = generate_impl(&input).to_string();
        assert!(output.contains("compile_error"));
    }
}
