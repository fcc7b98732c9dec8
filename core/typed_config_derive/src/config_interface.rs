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

//! `#[config_interface]`: turns a trait of getters into a config type.
//!
//! The trait is kept, with the default bodies of bound getters moved to
//! hidden `__config_default_*` methods, and a `Bound<Trait>` struct is
//! generated that stores one value (or memo cell) per getter.

use crate::shared::{Errors, into_syn, naming_tokens, parent_target};
use darling::ast::NestedMeta;
use darling::{FromAttributes, FromMeta};
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::{FnArg, Ident, ItemTrait, ReturnType, TraitItem, TraitItemFn, Type};

/// Arguments of `#[config_interface(...)]`
#[derive(Debug, Default, FromMeta)]
struct InterfaceOpts {
    #[darling(default)]
    naming: Option<String>,
    #[darling(default)]
    no_display: bool,
}

/// Getter-level attributes for `#[config(...)]`
#[derive(Debug, FromAttributes)]
#[darling(attributes(config))]
struct GetterOpts {
    #[darling(default)]
    name: Option<String>,
    #[darling(default)]
    identity: bool,
    #[darling(default)]
    parent: bool,
    #[darling(default)]
    computed: bool,
    #[darling(default)]
    ignore: bool,
    #[darling(default)]
    skip: bool,
}

enum GetterKind {
    /// Read from the node, zero value when absent.
    Property,
    /// Read from the node, default body when absent.
    Defaulted,
    Computed,
    Identity,
    Parent(Type),
}

struct Getter {
    ident: Ident,
    ty: Type,
    kind: GetterKind,
}

pub fn generate_impl(args: TokenStream2, item: TokenStream2) -> TokenStream2 {
    let opts = match NestedMeta::parse_meta_list(args)
        .map_err(darling::Error::from)
        .and_then(|items| InterfaceOpts::from_list(&items))
    {
        Ok(opts) => opts,
        Err(e) => return e.write_errors(),
    };
    let item = match syn::parse2::<ItemTrait>(item) {
        Ok(item) => item,
        Err(e) => return e.into_compile_error(),
    };
    generate_from_trait(opts, item).unwrap_or_else(syn::Error::into_compile_error)
}

fn generate_from_trait(opts: InterfaceOpts, mut item: ItemTrait) -> syn::Result<TokenStream2> {
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new(
            item.generics.span(),
            "config interfaces cannot be generic",
        ));
    }

    let trait_ident = item.ident.clone();
    let bound_ident = format_ident!("Bound{}", trait_ident);
    let naming = naming_tokens(opts.naming.as_deref(), trait_ident.span())?;

    let mut errors = Errors::default();
    let mut members = Vec::new();
    let mut getters = Vec::new();
    let mut hidden = Vec::new();
    for trait_item in &mut item.items {
        match trait_item {
            TraitItem::Fn(method) => match inspect_method(method) {
                Ok(Inspected::Bound {
                    member,
                    getter,
                    default_body,
                }) => {
                    members.push(member);
                    if let Some(body) = default_body {
                        hidden.push(body);
                    }
                    getters.push(getter);
                }
                Ok(Inspected::Unbound { member }) => members.extend(member),
                Err(e) => errors.push(e),
            },
            TraitItem::Const(constant) if constant.default.is_some() => {}
            other => errors.push(syn::Error::new(
                other.span(),
                "config interfaces can only declare getters, methods with default bodies and constants with values",
            )),
        }
    }
    errors.finish()?;
    item.items.extend(hidden);

    let vis = &item.vis;
    let fields = getters.iter().map(|getter| {
        let ident = &getter.ident;
        let ty = &getter.ty;
        match &getter.kind {
            GetterKind::Property | GetterKind::Identity => quote! { #ident: #ty },
            GetterKind::Defaulted | GetterKind::Computed => {
                quote! { #ident: ::typed_config::Memo<#ty> }
            }
            GetterKind::Parent(target) => quote! { #ident: ::typed_config::Parent<#target> },
        }
    });

    let inits = getters.iter().map(|getter| {
        let ident = &getter.ident;
        let name = ident.to_string();
        let init = match &getter.kind {
            GetterKind::Property => quote! { binding.property(#name)? },
            GetterKind::Defaulted => quote! { binding.defaulted(#name)? },
            GetterKind::Computed => quote! { binding.computed(#name)? },
            GetterKind::Identity => quote! { binding.identity(#name)? },
            GetterKind::Parent(target) => quote! { binding.parent::<#target>(#name)? },
        };
        quote! { #ident: #init }
    });

    let impls = getters.iter().map(|getter| {
        let ident = &getter.ident;
        let ty = &getter.ty;
        let name = ident.to_string();
        let default_ident = default_ident(ident);
        let body = match &getter.kind {
            GetterKind::Property | GetterKind::Identity => {
                quote! { ::core::clone::Clone::clone(&self.#ident) }
            }
            GetterKind::Defaulted | GetterKind::Computed => quote! {
                ::core::clone::Clone::clone(
                    self.#ident.get_or_eval(#name, || <Self as #trait_ident>::#default_ident(self)),
                )
            },
            GetterKind::Parent(_) => quote! { self.#ident.get() },
        };
        quote! {
            fn #ident(&self) -> #ty {
                #body
            }
        }
    });

    // Defaults first so computed getters observe every property.
    let forced = getters
        .iter()
        .filter(|getter| matches!(getter.kind, GetterKind::Defaulted))
        .chain(
            getters
                .iter()
                .filter(|getter| matches!(getter.kind, GetterKind::Computed)),
        )
        .map(|getter| {
            let ident = &getter.ident;
            quote! { let _ = <Self as #trait_ident>::#ident(self); }
        });

    let shown = getters
        .iter()
        .filter(|getter| matches!(getter.kind, GetterKind::Property | GetterKind::Defaulted))
        .map(|getter| &getter.ident)
        .collect::<Vec<_>>();
    let shown_names = shown.iter().map(|ident| ident.to_string()).collect::<Vec<_>>();
    let trait_name = trait_ident.to_string();

    let display = (!opts.no_display).then(|| {
        let format = format!(
            "{}{{{{{}}}}}",
            trait_name,
            shown_names
                .iter()
                .map(|name| format!("{name}={{:?}}"))
                .collect::<Vec<_>>()
                .join(", ")
        );
        quote! {
            impl ::std::fmt::Display for #bound_ident {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    ::std::write!(f, #format #(, <Self as #trait_ident>::#shown(self))*)
                }
            }
        }
    });

    Ok(quote! {
        #item

        #vis struct #bound_ident {
            #(#fields),*
        }

        impl #trait_ident for #bound_ident {
            #(#impls)*
        }

        impl ::typed_config::Materialize for #bound_ident {
            const STYLE: ::typed_config::BindingStyle = ::typed_config::BindingStyle::Getters;

            fn members() -> ::std::vec::Vec<::typed_config::Member> {
                ::std::vec![#(#members),*]
            }

            fn settings() -> ::typed_config::Settings {
                ::typed_config::Settings {
                    naming: #naming,
                    allow_mutable: false,
                }
            }

            fn construct(
                ctx: &::typed_config::BindContext<'_>,
            ) -> ::typed_config::Result<Self> {
                let binding = ::typed_config::GetterBinding::new::<Self>(ctx)?;
                ::core::result::Result::Ok(Self {
                    #(#inits),*
                })
            }

            fn complete(&self) {
                #(#forced)*
            }
        }

        impl ::std::fmt::Debug for #bound_ident {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_struct(#trait_name)
                    #(.field(#shown_names, &<Self as #trait_ident>::#shown(self)))*
                    .finish()
            }
        }

        impl ::core::cmp::PartialEq for #bound_ident {
            fn eq(&self, other: &Self) -> bool {
                true #(&& <Self as #trait_ident>::#shown(self) == <Self as #trait_ident>::#shown(other))*
            }
        }

        #display
    })
}

enum Inspected {
    Bound {
        member: TokenStream2,
        getter: Getter,
        default_body: Option<TraitItem>,
    },
    /// Left to the trait's own default body; still declared for
    /// classification unless it is an associated function.
    Unbound { member: Option<TokenStream2> },
}

fn default_ident(ident: &Ident) -> Ident {
    format_ident!("__config_default_{}", ident)
}

fn inspect_method(method: &mut TraitItemFn) -> syn::Result<Inspected> {
    let opts = GetterOpts::from_attributes(&method.attrs).map_err(into_syn)?;
    method.attrs.retain(|attr| !attr.path().is_ident("config"));

    let ident = method.sig.ident.clone();
    let name = ident.to_string();
    let has_body = method.default.is_some();
    let receiver = method.sig.inputs.first().and_then(|input| match input {
        FnArg::Receiver(receiver) => Some(receiver),
        FnArg::Typed(_) => None,
    });

    let Some(receiver) = receiver else {
        if has_body {
            return Ok(Inspected::Unbound { member: None });
        }
        return Err(syn::Error::new(
            ident.span(),
            "associated functions of a config interface need a default body",
        ));
    };
    let by_ref = receiver.reference.is_some() && receiver.mutability.is_none();
    let takes_arguments = method.sig.inputs.len() > 1 || !by_ref;

    let ret = match &method.sig.output {
        ReturnType::Type(_, ty) => Some((**ty).clone()),
        ReturnType::Default => None,
    };
    let declared = ret.clone().unwrap_or_else(|| syn::parse_quote!(()));
    let mut member = quote! { ::typed_config::Member::getter::<#declared>(#name) };
    if let Some(rename) = &opts.name {
        member = quote! { #member.rename(#rename) };
    }

    let ignored = opts.ignore || opts.skip;
    let markers = [ignored, opts.identity, opts.parent, opts.computed]
        .iter()
        .filter(|set| **set)
        .count();
    if markers > 1 {
        return Err(syn::Error::new(
            ident.span(),
            "a getter can carry only one of `ignore`, `identity`, `parent` and `computed`",
        ));
    }

    if ignored {
        if !has_body {
            return Err(syn::Error::new(
                ident.span(),
                "ignored getters need a default body",
            ));
        }
        return Ok(Inspected::Unbound {
            member: Some(quote! { #member.ignored().default_body() }),
        });
    }

    if takes_arguments || method.sig.asyncness.is_some() || !method.sig.generics.params.is_empty() {
        if markers > 0 {
            return Err(syn::Error::new(
                ident.span(),
                "only `&self` getters without arguments can carry binding markers",
            ));
        }
        if !has_body {
            return Err(syn::Error::new(
                ident.span(),
                "is not a getter and there is no default implementation",
            ));
        }
        return Ok(Inspected::Unbound {
            member: Some(quote! { #member.arguments().default_body() }),
        });
    }

    let Some(ty) = ret else {
        return Err(syn::Error::new(
            method.sig.span(),
            "getters of a config interface must return a value",
        ));
    };

    let (kind, member) = if opts.identity || opts.parent {
        if has_body {
            return Err(syn::Error::new(
                ident.span(),
                "`identity` and `parent` getters are provided by the binding and cannot have a body",
            ));
        }
        if opts.identity {
            (GetterKind::Identity, quote! { #member.identity() })
        } else {
            let Some(target) = parent_target(&ty) else {
                return Err(syn::Error::new(
                    ty.span(),
                    "`parent` getters must return `Option<Arc<T>>`",
                ));
            };
            (GetterKind::Parent(target.clone()), quote! { #member.parent() })
        }
    } else if opts.computed {
        if !has_body {
            return Err(syn::Error::new(
                ident.span(),
                "`computed` getters need a default body",
            ));
        }
        (GetterKind::Computed, quote! { #member.computed().default_body() })
    } else if has_body {
        (GetterKind::Defaulted, quote! { #member.default_body() })
    } else {
        (GetterKind::Property, member)
    };

    let default_body = match method.default.take() {
        Some(block) => {
            method.semi_token = Some(Default::default());
            let hidden_ident = default_ident(&ident);
            Some(syn::parse_quote! {
                #[doc(hidden)]
                fn #hidden_ident(&self) -> #ty #block
            })
        }
        None => None,
    };

    Ok(Inspected::Bound {
        member,
        getter: Getter { ident, ty, kind },
        default_body,
    })
}
