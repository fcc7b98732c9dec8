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

use darling::FromMeta;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{Expr, ExprLit, GenericArgument, Lit, Path, PathArguments, Type};

/// Last path segments of types that allow mutation through `&self`.
const MUTABLE_TYPES: &[&str] = &[
    "Cell",
    "RefCell",
    "UnsafeCell",
    "OnceCell",
    "Mutex",
    "RwLock",
    "AtomicBool",
    "AtomicI8",
    "AtomicI16",
    "AtomicI32",
    "AtomicI64",
    "AtomicIsize",
    "AtomicU8",
    "AtomicU16",
    "AtomicU32",
    "AtomicU64",
    "AtomicUsize",
    "AtomicPtr",
];

/// Any expression, kept verbatim (string literals included).
#[derive(Debug, Clone)]
pub(crate) struct ExprArg(pub Expr);

impl FromMeta for ExprArg {
    fn from_expr(expr: &Expr) -> darling::Result<Self> {
        Ok(Self(expr.clone()))
    }
}

/// A path given bare (`default_with = defaults::port`) or quoted.
#[derive(Debug, Clone)]
pub(crate) struct PathArg(pub Path);

impl FromMeta for PathArg {
    fn from_expr(expr: &Expr) -> darling::Result<Self> {
        match expr {
            Expr::Path(path) => Ok(Self(path.path.clone())),
            Expr::Lit(ExprLit {
                lit: Lit::Str(text),
                ..
            }) => text.parse().map(Self).map_err(darling::Error::from),
            _ => Err(darling::Error::custom("expected a path to a function").with_span(expr)),
        }
    }
}

/// Tokens of the `Naming` variant named by a `naming = "..."` attribute.
pub(crate) fn naming_tokens(naming: Option<&str>, span: Span) -> syn::Result<TokenStream2> {
    let variant = match naming.unwrap_or("as_declared") {
        "as_declared" => quote!(AsDeclared),
        "camel_case" => quote!(CamelCase),
        "lower_case" => quote!(LowerCase),
        "pascal_case" => quote!(PascalCase),
        "snake_case" => quote!(SnakeCase),
        other => {
            return Err(syn::Error::new(
                span,
                format!(
                    "unknown naming `{other}`, expected one of: as_declared, camel_case, lower_case, pascal_case, snake_case"
                ),
            ));
        }
    };
    Ok(quote!(::typed_config::Naming::#variant))
}

fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(path) => path.path.segments.last(),
        Type::Group(group) => last_segment(&group.elem),
        Type::Paren(paren) => last_segment(&paren.elem),
        _ => None,
    }
}

pub(crate) fn is_mutable_type(ty: &Type) -> bool {
    last_segment(ty).is_some_and(|segment| {
        MUTABLE_TYPES.iter().any(|name| segment.ident == *name)
    })
}

/// The single generic argument of `ty` when its last segment is `wrapper`.
pub(crate) fn generic_inner<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let segment = last_segment(ty)?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };
    match arguments.args.first()? {
        GenericArgument::Type(inner) if arguments.args.len() == 1 => Some(inner),
        _ => None,
    }
}

/// `P` from `Option<Arc<P>>`.
pub(crate) fn parent_target(ty: &Type) -> Option<&Type> {
    generic_inner(generic_inner(ty, "Option")?, "Arc")
}

pub(crate) fn into_syn(error: darling::Error) -> syn::Error {
    syn::Error::new(error.span(), error)
}

/// Collects errors so a single expansion reports every problem at once.
#[derive(Default)]
pub(crate) struct Errors(Option<syn::Error>);

impl Errors {
    pub(crate) fn push(&mut self, error: syn::Error) {
        match &mut self.0 {
            Some(existing) => existing.combine(error),
            None => self.0 = Some(error),
        }
    }

    pub(crate) fn finish(self) -> syn::Result<()> {
        self.0.map_or(Ok(()), Err)
    }
}
