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

//! Unordered binding of getter-style configs generated by
//! `#[config_interface]`.

use super::bind::Bind;
use super::context::BindContext;
use super::descriptor::{BindingDescriptor, BindingKind};
use super::engine::Materialize;
use super::lineage::Parent;
use super::memo::Memo;
use crate::error::{ConfigError, Result};
use std::any::Any;
use std::collections::HashMap;
use tracing::trace;

/// Classified getters of the type under construction, looked up by member
/// name.
///
/// Values found in the node are bound eagerly. Default bodies and computed
/// getters are left as pending [`Memo`] cells, evaluated by the generated
/// [`Materialize::complete`] once parent references are readable, properties
/// first.
pub struct GetterBinding<'a> {
    ctx: &'a BindContext<'a>,
    descriptors: HashMap<&'static str, BindingDescriptor>,
}

impl<'a> GetterBinding<'a> {
    pub fn new<T: Materialize>(ctx: &'a BindContext<'a>) -> Result<Self> {
        let descriptors = T::descriptors()?
            .into_iter()
            .map(|descriptor| (descriptor.member, descriptor))
            .collect();
        Ok(Self { ctx, descriptors })
    }

    /// A property without a default body: bound from the node, or the type's
    /// zero value when the key is absent.
    pub fn property<V: Bind>(&self, member: &str) -> Result<V> {
        let descriptor = self.descriptor(member)?;
        match self.bind_present(descriptor)? {
            Some(value) => Ok(value),
            None => V::zero(self.ctx)
                .map_err(|error| error.within(&descriptor.logical_name))?
                .ok_or_else(|| ConfigError::missing(&descriptor.logical_name)),
        }
    }

    /// A property with a default body: bound from the node, or pending until
    /// the default body runs.
    pub fn defaulted<V: Bind>(&self, member: &str) -> Result<Memo<V>> {
        let descriptor = self.descriptor(member)?;
        Ok(match self.bind_present(descriptor)? {
            Some(value) => Memo::ready(value),
            None => Memo::pending(),
        })
    }

    pub fn computed<V>(&self, member: &str) -> Result<Memo<V>> {
        self.expect_kind(member, BindingKind::Computed)?;
        Ok(Memo::pending())
    }

    pub fn identity<V: Bind>(&self, member: &str) -> Result<V> {
        let descriptor = self.expect_kind(member, BindingKind::Identity)?;
        V::from_identity(self.ctx.node()).ok_or_else(|| ConfigError::UnassignableIdentityType {
            type_name: self.ctx.type_name().to_owned(),
            member: descriptor.member.to_owned(),
            declared_type: descriptor.declared_type.to_owned(),
        })
    }

    pub fn parent<P: Any + Send + Sync>(&self, member: &str) -> Result<Parent<P>> {
        self.expect_kind(member, BindingKind::ParentRef)?;
        Ok(self.ctx.parent::<P>())
    }

    fn bind_present<V: Bind>(&self, descriptor: &BindingDescriptor) -> Result<Option<V>> {
        let Some(value) = self.ctx.node().lookup(&descriptor.logical_name) else {
            return Ok(None);
        };
        trace!(
            "Binding getter: {}::{} from key: '{}'.",
            self.ctx.type_name(),
            descriptor.member,
            descriptor.logical_name
        );
        V::bind(value, self.ctx)
            .map(Some)
            .map_err(|error| error.within(&descriptor.logical_name))
    }

    fn descriptor(&self, member: &str) -> Result<&BindingDescriptor> {
        self.descriptors
            .get(member)
            .ok_or_else(|| ConfigError::InvalidAnnotationUsage {
                type_name: self.ctx.type_name().to_owned(),
                member: member.to_owned(),
                reason: "is not a declared property".to_owned(),
            })
    }

    fn expect_kind(&self, member: &str, kind: BindingKind) -> Result<&BindingDescriptor> {
        let descriptor = self.descriptor(member)?;
        if descriptor.kind == kind {
            return Ok(descriptor);
        }
        Err(ConfigError::InvalidAnnotationUsage {
            type_name: self.ctx.type_name().to_owned(),
            member: member.to_owned(),
            reason: format!("is declared as {:?} but bound as {kind:?}", descriptor.kind),
        })
    }
}
