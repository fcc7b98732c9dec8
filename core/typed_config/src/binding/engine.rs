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

use super::context::BindContext;
use super::descriptor::{BindingDescriptor, BindingStyle, Member, Settings, classify};
use super::lineage::Lineage;
use crate::error::{ConfigError, Result};
use crate::node::Node;
use std::any::type_name;
use std::sync::Arc;
use tracing::debug;

/// Nested instances deeper than this fail instead of recursing further.
pub const MAX_DEPTH: usize = 64;

/// A config type the engine can construct.
///
/// Usually implemented by `#[derive(FieldConfig)]` or `#[config_interface]`;
/// hand-written implementations pair [`Materialize::members`] with a
/// [`Materialize::construct`] built on [`crate::bind_fields`] or
/// [`crate::GetterBinding`].
pub trait Materialize: Sized + Send + Sync + 'static {
    const STYLE: BindingStyle;

    /// Declared members, in declaration order.
    fn members() -> Vec<Member>;

    fn settings() -> Settings {
        Settings::default()
    }

    fn construct(ctx: &BindContext<'_>) -> Result<Self>;

    /// Evaluates members left pending by [`Materialize::construct`]. Called
    /// once the outermost instance of the call has been published, so every
    /// parent reference is readable.
    fn complete(&self) {}

    /// Classifies [`Materialize::members`] for this type.
    fn descriptors() -> Result<Vec<BindingDescriptor>> {
        classify(
            type_name::<Self>(),
            Self::STYLE,
            Self::settings(),
            &Self::members(),
        )
    }
}

/// Builds an immutable `T` from `node`.
pub fn materialize<T: Materialize>(node: &Node) -> Result<Arc<T>> {
    materialize_within(node, &Lineage::root())
}

pub(crate) fn materialize_nested<T: Materialize>(
    node: &Node,
    ctx: &BindContext<'_>,
) -> Result<Arc<T>> {
    materialize_within(node, ctx.lineage())
}

fn materialize_within<T: Materialize>(node: &Node, enclosing: &Lineage) -> Result<Arc<T>> {
    let type_name = type_name::<T>();
    let depth = enclosing.depth();
    if depth >= MAX_DEPTH {
        return Err(ConfigError::DepthLimitExceeded {
            type_name: type_name.to_owned(),
            depth: MAX_DEPTH,
        });
    }

    debug!("Materializing config: {type_name} at depth: {depth}...");
    let (lineage, slot) = enclosing.enter::<T>();
    let ctx = BindContext::new(node, lineage, type_name);
    let instance = Arc::new(T::construct(&ctx)?);
    slot.publish(&instance);

    let pending = Arc::clone(&instance);
    ctx.lineage().defer(move || pending.complete());
    if depth == 0 {
        ctx.lineage().run_deferred();
    }
    debug!("Materialized config: {type_name}.");
    Ok(instance)
}
