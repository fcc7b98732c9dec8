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

use crate::shared::{Errors, ExprArg, PathArg, is_mutable_type, naming_tokens};
use darling::{FromDeriveInput, FromField};
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::spanned::Spanned;
use syn::{DeriveInput, Generics, Ident, Type};

/// Container-level attributes for `#[config(...)]`
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(config), supports(struct_named))]
struct FieldConfigOpts {
    ident: Ident,
    generics: Generics,
    data: darling::ast::Data<(), FieldOpts>,

    /// Naming convention applied to field names without an explicit `name`.
    #[darling(default)]
    naming: Option<String>,

    /// Accept interior-mutable field types.
    #[darling(default)]
    allow_mutable: bool,

    /// Do not generate a `Display` implementation.
    #[darling(default)]
    no_display: bool,
}

/// Field-level attributes for `#[config(...)]`
#[derive(Debug, FromField)]
#[darling(attributes(config))]
struct FieldOpts {
    ident: Option<Ident>,
    ty: Type,

    #[darling(default)]
    name: Option<String>,
    #[darling(default)]
    required: bool,
    /// Default converted to the field type, e.g. `default = 30`.
    #[darling(default)]
    default: Option<ExprArg>,
    /// Function returning the typed default.
    #[darling(default)]
    default_with: Option<PathArg>,
    /// Function returning the node to bind from when the key is absent.
    #[darling(default)]
    fallback: Option<PathArg>,
    #[darling(default)]
    identity: bool,
    #[darling(default)]
    parent: bool,
    #[darling(default)]
    computed: bool,
    #[darling(default)]
    skip: bool,
    #[darling(default)]
    ignore: bool,
}

/// One field after its attributes were checked.
struct BoundField {
    ident: Ident,
    member: TokenStream2,
    init: TokenStream2,
    shown: bool,
}

pub fn generate_impl(input: &DeriveInput) -> TokenStream2 {
    match FieldConfigOpts::from_derive_input(input) {
        Ok(opts) => generate_from_opts(opts).unwrap_or_else(syn::Error::into_compile_error),
        Err(e) => e.write_errors(),
    }
}

fn generate_from_opts(opts: FieldConfigOpts) -> syn::Result<TokenStream2> {
    let struct_name = &opts.ident;
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();
    let naming = naming_tokens(opts.naming.as_deref(), struct_name.span())?;
    let allow_mutable = opts.allow_mutable;

    let fields = match opts.data {
        darling::ast::Data::Struct(fields) => fields.fields,
        darling::ast::Data::Enum(_) => {
            return Err(syn::Error::new(
                struct_name.span(),
                "FieldConfig can only be derived for structs with named fields",
            ));
        }
    };

    let mut errors = Errors::default();
    let bound = fields
        .into_iter()
        .filter_map(|field| bind_field(field).map_err(|e| errors.push(e)).ok())
        .collect::<Vec<_>>();
    errors.finish()?;

    let members = bound.iter().map(|field| &field.member);
    let inits = bound.iter().map(|field| {
        let ident = &field.ident;
        let init = &field.init;
        quote! { #ident: #init }
    });

    let display = (!opts.no_display).then(|| {
        let shown = bound.iter().filter(|field| field.shown).collect::<Vec<_>>();
        let format = format!(
            "{}{{{{{}}}}}",
            struct_name,
            shown
                .iter()
                .map(|field| format!("{}={{:?}}", field.ident))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let values = shown.iter().map(|field| {
            let ident = &field.ident;
            quote! { self.#ident }
        });
        quote! {
            impl #impl_generics ::std::fmt::Display for #struct_name #ty_generics #where_clause {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    ::std::write!(f, #format #(, #values)*)
                }
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::typed_config::Materialize for #struct_name #ty_generics #where_clause {
            const STYLE: ::typed_config::BindingStyle = ::typed_config::BindingStyle::Fields;

            fn members() -> ::std::vec::Vec<::typed_config::Member> {
                ::std::vec![#(#members),*]
            }

            fn settings() -> ::typed_config::Settings {
                ::typed_config::Settings {
                    naming: #naming,
                    allow_mutable: #allow_mutable,
                }
            }

            fn construct(
                ctx: &::typed_config::BindContext<'_>,
            ) -> ::typed_config::Result<Self> {
                ::typed_config::bind_fields::<Self, _>(ctx, |fields| {
                    ::core::result::Result::Ok(Self {
                        #(#inits),*
                    })
                })
            }
        }

        #display
    })
}

fn bind_field(field: FieldOpts) -> syn::Result<BoundField> {
    let span = field.ty.span();
    let Some(ident) = field.ident else {
        return Err(syn::Error::new(span, "FieldConfig requires named fields"));
    };
    let ty = &field.ty;
    let name = ident.to_string();

    if field.computed {
        return Err(syn::Error::new(
            ident.span(),
            "`computed` only applies to getters of a #[config_interface] trait",
        ));
    }

    let skipped = field.skip || field.ignore;
    let markers = [skipped, field.identity, field.parent]
        .iter()
        .filter(|set| **set)
        .count();
    let contracts = [
        field.required,
        field.default.is_some(),
        field.default_with.is_some(),
        field.fallback.is_some(),
    ]
    .iter()
    .filter(|set| **set)
    .count();

    if markers > 1 {
        return Err(syn::Error::new(
            ident.span(),
            "a field can carry only one of `skip`, `identity` and `parent`",
        ));
    }
    if contracts > 1 {
        return Err(syn::Error::new(
            ident.span(),
            "a field can carry only one of `required`, `default`, `default_with` and `fallback`",
        ));
    }
    if (field.identity || field.parent) && contracts > 0 {
        return Err(syn::Error::new(
            ident.span(),
            "`identity` and `parent` fields are not read from the node and take no default",
        ));
    }
    if skipped && (field.required || field.default.is_some() || field.fallback.is_some()) {
        return Err(syn::Error::new(
            ident.span(),
            "skipped fields can only take a `default_with` function",
        ));
    }

    let mut member = quote! { ::typed_config::Member::field::<#ty>(#name) };
    if let Some(rename) = &field.name {
        member = quote! { #member.rename(#rename) };
    }
    if is_mutable_type(ty) {
        member = quote! { #member.mutable() };
    }

    let (member, init) = if skipped {
        let init = match &field.default_with {
            Some(PathArg(path)) => quote! { #path() },
            None => quote! { ::core::default::Default::default() },
        };
        (quote! { #member.ignored() }, init)
    } else if field.identity {
        (quote! { #member.identity() }, quote! { fields.with()? })
    } else if field.parent {
        (quote! { #member.parent() }, quote! { fields.with()? })
    } else if field.required {
        (quote! { #member.required() }, quote! { fields.require()? })
    } else if let Some(ExprArg(default)) = &field.default {
        (
            quote! { #member.with_default() },
            quote! { fields.with_default_value(#default)? },
        )
    } else if let Some(PathArg(path)) = &field.default_with {
        (
            quote! { #member.with_default() },
            quote! { fields.with_default(#path())? },
        )
    } else if let Some(PathArg(path)) = &field.fallback {
        (
            quote! { #member.with_fallback() },
            quote! { fields.with_fallback(&#path())? },
        )
    } else {
        (member, quote! { fields.with()? })
    };

    Ok(BoundField {
        shown: !(skipped || field.identity || field.parent),
        ident,
        member,
        init,
    })
}
