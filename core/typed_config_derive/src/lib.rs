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

//! Code generation for `typed_config`.
//!
//! - `#[derive(FieldConfig)]` binds the named fields of a struct in
//!   declaration order.
//! - `#[config_interface]` turns a trait of getters into a config type and
//!   generates its `Bound<Trait>` implementation.
//! - `#[derive(ConfigEnum)]` makes a unit-variant enum parseable from its
//!   SCREAMING_SNAKE name.
//!
//! Generated code refers to `::typed_config`, so the library crate must be a
//! dependency of the crate using these macros.

mod config_enum;
mod config_interface;
mod field_config;
mod shared;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derive macro binding a struct's named fields in declaration order.
///
/// # Container Attributes
/// - `#[config(naming = "camel_case")]` - Naming convention for keys: `as_declared` (default),
///   `camel_case`, `lower_case`, `pascal_case` or `snake_case`
/// - `#[config(allow_mutable)]` - Accept interior-mutable field types
/// - `#[config(no_display)]` - Skip the generated `Display` implementation
///
/// # Field Attributes
/// - `#[config(name = "http.port")]` - Explicit key, dotted paths allowed
/// - `#[config(required)]` - Fail when the key is absent
/// - `#[config(default = 30)]` - Default converted to the field type
/// - `#[config(default_with = path::to::fn)]` - Function returning the typed default
/// - `#[config(fallback = path::to::fn)]` - Function returning a node to bind from when absent
/// - `#[config(identity)]` - The backing `Node` itself
/// - `#[config(parent)]` - A `Parent<T>` reference to the nearest enclosing `T`
/// - `#[config(skip)]` / `#[config(ignore)]` - Not bound, `Default::default()` or `default_with`
///
/// Fields without attributes use the type's zero value when absent. The generated `Display`
/// prints bound fields with their `Debug` representation.
///
/// ```ignore
/// #[derive(Debug, FieldConfig)]
/// #[config(naming = "camel_case")]
/// pub struct TcpConfig {
///     #[config(required)]
///     pub address: String,
///     #[config(default = 8090)]
///     pub port: u16,
///     pub servers: Vec<Arc<ServerConfig>>,
/// }
/// ```
#[proc_macro_derive(FieldConfig, attributes(config))]
pub fn derive_field_config(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    field_config::generate_impl(&input).into()
}

/// Derive macro parsing a unit-variant enum from its SCREAMING_SNAKE name.
///
/// `RoundRobin` matches `ROUND_ROBIN`, `round-robin` and `round robin`;
/// `#[config(name = "...")]` on a variant replaces its name.
#[proc_macro_derive(ConfigEnum, attributes(config))]
pub fn derive_config_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    config_enum::generate_impl(&input).into()
}

/// Attribute macro turning a trait of getters into a config type.
///
/// # Arguments
/// - `naming = "camel_case"` - Naming convention for keys, as for `FieldConfig`
/// - `no_display` - Skip the generated `Display` implementation
///
/// # Getter Attributes
/// - `#[config(name = "...")]` - Explicit key
/// - `#[config(computed)]` - Evaluated from its default body after every property
/// - `#[config(identity)]` - Returns the backing `Node`
/// - `#[config(parent)]` - Returns `Option<Arc<T>>` of the nearest enclosing `T`
/// - `#[config(ignore)]` / `#[config(skip)]` - Left to its default body
///
/// A getter without a body reads its key or falls back to the type's zero value; with a
/// body, the body runs once when the key is absent. Methods taking arguments keep their
/// default bodies. Property types must implement `Clone`, `Debug` and `PartialEq`.
///
/// ```ignore
/// #[config_interface(naming = "camel_case")]
/// pub trait Server {
///     fn host(&self) -> String;
///     fn port(&self) -> u16 {
///         8080
///     }
///     #[config(computed)]
///     fn url(&self) -> String {
///         format!("http://{}:{}", self.host(), self.port())
///     }
/// }
///
/// let server = node.materialize::<BoundServer>()?;
/// ```
#[proc_macro_attribute]
pub fn config_interface(args: TokenStream, item: TokenStream) -> TokenStream {
    config_interface::generate_impl(args.into(), item.into()).into()
}
