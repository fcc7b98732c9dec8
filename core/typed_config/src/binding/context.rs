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

use super::lineage::{Lineage, Parent};
use crate::node::Node;
use std::any::Any;

/// State for one construction call: the node being bound and the chain of
/// instances enclosing the one under construction.
///
/// A fresh context is created for every (nested) instance and passed down
/// explicitly, nothing outlives the call that created it.
#[derive(Debug, Clone)]
pub struct BindContext<'a> {
    node: &'a Node,
    lineage: Lineage,
    type_name: &'static str,
}

impl<'a> BindContext<'a> {
    pub(crate) fn new(node: &'a Node, lineage: Lineage, type_name: &'static str) -> Self {
        Self {
            node,
            lineage,
            type_name,
        }
    }

    pub fn node(&self) -> &'a Node {
        self.node
    }

    /// The chain whose innermost entry is the instance under construction.
    pub fn lineage(&self) -> &Lineage {
        &self.lineage
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The nearest enclosing `T`, excluding the instance under construction.
    pub fn parent<T: Any + Send + Sync>(&self) -> Parent<T> {
        Parent::resolve(&self.lineage.enclosing())
    }
}
