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

//! Materializes strongly-typed, immutable configuration objects from
//! hierarchical key-value trees.
//!
//! Sources (maps, environment variables, `.properties` text, JSON, or any
//! `figment` provider) produce a [`Node`]. A config type declares how its
//! members are bound, either as an ordered list of fields with
//! `#[derive(FieldConfig)]` or as a trait of getters with
//! `#[config_interface]`, and [`materialize`] builds a shared `Arc<T>`
//! from the node.
//!
//! ```ignore
//! use typed_config::{FieldConfig, Node};
//!
//! #[derive(Debug, FieldConfig)]
//! struct Http {
//!     #[config(required)]
//!     address: String,
//!     #[config(default = 30)]
//!     timeout_secs: u64,
//! }
//!
//! let http = Node::from_map([("address", "0.0.0.0:80")]).materialize::<Http>()?;
//! assert_eq!(http.timeout_secs, 30);
//! ```

extern crate self as typed_config;

mod binding;
pub mod coerce;
pub mod error;
mod loader;
pub mod naming;
mod node;
mod source;

pub use binding::bind::Bind;
pub use binding::context::BindContext;
pub use binding::descriptor::{
    BindingDescriptor, BindingKind, BindingStyle, Contract, Marker, Member, MemberShape, Settings,
    classify,
};
pub use binding::engine::{MAX_DEPTH, Materialize, materialize};
pub use binding::fields::{FieldQueue, bind_fields};
pub use binding::getters::GetterBinding;
pub use binding::lineage::{Lineage, Parent};
pub use binding::memo::Memo;
pub use coerce::{ConfigEnum, FromValue};
pub use error::{ConfigError, Result};
pub use loader::ConfigLoader;
pub use naming::Naming;
pub use node::{Node, Value, template};
pub use source::EnvSource;
pub use typed_config_derive::{ConfigEnum, FieldConfig, config_interface};
