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

//! Ordered, positional binding of field-style configs.

use super::bind::Bind;
use super::context::BindContext;
use super::descriptor::{BindingDescriptor, BindingKind};
use super::engine::Materialize;
use crate::error::{ConfigError, Result};
use crate::node::{Node, Value};
use std::collections::VecDeque;
use tracing::trace;

/// Runs `construct` against a queue of `T`'s bindable fields and checks that
/// every field was consumed exactly once.
///
/// ```ignore
/// fn construct(ctx: &BindContext<'_>) -> Result<Self> {
///     bind_fields::<Self, _>(ctx, |fields| {
///         Ok(Self {
///             host: fields.require()?,
///             port: fields.with_default_value(8090)?,
///         })
///     })
/// }
/// ```
pub fn bind_fields<'a, T, F>(ctx: &'a BindContext<'a>, construct: F) -> Result<T>
where
    T: Materialize,
    F: FnOnce(&mut FieldQueue<'a>) -> Result<T>,
{
    let mut queue = FieldQueue::new::<T>(ctx)?;
    let instance = construct(&mut queue)?;
    queue.finish()?;
    Ok(instance)
}

/// Bindable fields of the type under construction, in declaration order.
pub struct FieldQueue<'a> {
    ctx: &'a BindContext<'a>,
    pending: VecDeque<BindingDescriptor>,
    declared: usize,
    consumed: usize,
}

impl<'a> FieldQueue<'a> {
    pub fn new<T: Materialize>(ctx: &'a BindContext<'a>) -> Result<Self> {
        let pending = T::descriptors()?
            .into_iter()
            .filter(|descriptor| descriptor.kind != BindingKind::Ignored)
            .collect::<VecDeque<_>>();
        Ok(Self {
            ctx,
            declared: pending.len(),
            pending,
            consumed: 0,
        })
    }

    /// Binds the next field, failing when its key is absent.
    pub fn require<T: Bind>(&mut self) -> Result<T> {
        self.next_with(|queue, descriptor| {
            trace!(
                "Required member: {}::{} has no key: '{}'.",
                queue.ctx.type_name(),
                descriptor.member,
                descriptor.logical_name
            );
            Err(ConfigError::missing(&descriptor.logical_name))
        })
    }

    /// Binds the next field, using the type's zero value when its key is
    /// absent.
    pub fn with<T: Bind>(&mut self) -> Result<T> {
        self.next_with(|queue, descriptor| {
            T::zero(queue.ctx)
                .map_err(|error| error.within(&descriptor.logical_name))?
                .ok_or_else(|| ConfigError::missing(&descriptor.logical_name))
        })
    }

    /// Binds the next field, using `default` when its key is absent.
    pub fn with_default<T: Bind>(&mut self, default: T) -> Result<T> {
        self.next_with(|_, _| Ok(default))
    }

    /// Binds the next field, converting `default` to the field's type when
    /// its key is absent.
    pub fn with_default_value<T: Bind>(&mut self, default: impl Into<Value>) -> Result<T> {
        let default = default.into();
        self.next_with(|queue, descriptor| {
            T::bind(&default, queue.ctx).map_err(|error| error.within(&descriptor.logical_name))
        })
    }

    /// Binds the next field, materializing it from `fallback` when its key is
    /// absent.
    pub fn with_fallback<T: Bind>(&mut self, fallback: &Node) -> Result<T> {
        self.next_with(|queue, descriptor| {
            T::from_node(fallback, queue.ctx).map_err(|error| error.within(&descriptor.logical_name))
        })
    }

    /// Number of bindable fields not consumed yet.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    pub fn finish(self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        Err(self.arity_mismatch(self.consumed))
    }

    fn next_with<T: Bind>(
        &mut self,
        absent: impl FnOnce(&Self, &BindingDescriptor) -> Result<T>,
    ) -> Result<T> {
        let Some(descriptor) = self.pending.pop_front() else {
            return Err(self.arity_mismatch(self.consumed + 1));
        };
        self.consumed += 1;

        match descriptor.kind {
            BindingKind::Identity => {
                return T::from_identity(self.ctx.node()).ok_or_else(|| {
                    ConfigError::UnassignableIdentityType {
                        type_name: self.ctx.type_name().to_owned(),
                        member: descriptor.member.to_owned(),
                        declared_type: descriptor.declared_type.to_owned(),
                    }
                });
            }
            BindingKind::ParentRef => {
                return T::from_parent(self.ctx).ok_or_else(|| {
                    ConfigError::InvalidAnnotationUsage {
                        type_name: self.ctx.type_name().to_owned(),
                        member: descriptor.member.to_owned(),
                        reason: format!(
                            "is marked as parent but its type {} is not a parent reference",
                            descriptor.declared_type
                        ),
                    }
                });
            }
            _ => {}
        }

        match self.ctx.node().lookup(&descriptor.logical_name) {
            Some(value) => {
                trace!(
                    "Binding member: {}::{} from key: '{}'.",
                    self.ctx.type_name(),
                    descriptor.member,
                    descriptor.logical_name
                );
                T::bind(value, self.ctx).map_err(|error| error.within(&descriptor.logical_name))
            }
            None => absent(&*self, &descriptor),
        }
    }

    fn arity_mismatch(&self, consumed: usize) -> ConfigError {
        ConfigError::ConstructionArityMismatch {
            type_name: self.ctx.type_name().to_owned(),
            declared: self.declared,
            consumed,
        }
    }
}
