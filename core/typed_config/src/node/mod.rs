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

//! The immutable configuration tree every source produces and the engine
//! consumes.

mod resolve;
pub mod template;
mod tree;
mod value;

pub use value::Value;

use crate::coerce::{FromValue, items_of};
use crate::error::Result;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::{self, Debug, Display};
use std::hash::Hash;
use std::sync::Arc;

/// Read-only mapping from string keys to [`Value`]s.
///
/// Dotted keys are expanded into nested nodes when the node is built, so
/// `{"db.host": "x"}` and `{"db": {"host": "x"}}` are the same node. Cloning
/// is cheap: the entry table is shared.
#[derive(Clone, Default, PartialEq)]
pub struct Node {
    entries: Arc<BTreeMap<String, Value>>,
}

impl Node {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a node from flat or nested entries, expanding dotted keys.
    pub fn from_map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::from_entries(tree::expand(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into())),
        ))
    }

    pub(crate) fn from_entries(entries: BTreeMap<String, Value>) -> Self {
        Self {
            entries: Arc::new(entries),
        }
    }

    /// True when every segment of `path` exists and each non-final segment
    /// holds a node.
    pub fn has(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    /// The raw value at `path`, or `None` when any segment is missing or a
    /// non-final segment is not a node.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let last = segments.next_back()?;
        let mut current = self;
        for segment in segments {
            match current.entries.get(segment)? {
                Value::Node(node) => current = node,
                _ => return None,
            }
        }
        current.entries.get(last)
    }

    /// Coerces the value at `path`, falling back to `default` when it is
    /// absent or cannot be converted.
    pub fn get<T: FromValue>(&self, path: &str, default: T) -> T {
        self.get_opt(path).unwrap_or(default)
    }

    pub fn get_opt<T: FromValue>(&self, path: &str) -> Option<T> {
        self.try_get(path).ok().flatten()
    }

    /// Strict variant of [`Node::get`]: absence is `Ok(None)`, a value that
    /// cannot be converted is an error carrying `path`.
    pub fn try_get<T: FromValue>(&self, path: &str) -> Result<Option<T>> {
        self.lookup(path)
            .map(|value| T::from_value(value).map_err(|error| error.within(path)))
            .transpose()
    }

    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get_opt(path)
    }

    pub fn get_int(&self, path: &str, default: i32) -> i32 {
        self.get(path, default)
    }

    pub fn get_long(&self, path: &str, default: i64) -> i64 {
        self.get(path, default)
    }

    pub fn get_bool(&self, path: &str, default: bool) -> bool {
        self.get(path, default)
    }

    pub fn get_node(&self, path: &str) -> Option<Node> {
        self.lookup(path).and_then(Value::as_node).cloned()
    }

    pub fn get_enum<E: crate::coerce::ConfigEnum + FromValue>(&self, path: &str, default: E) -> E {
        self.get(path, default)
    }

    /// Reads a list (or a bracketed list string), converting each element.
    /// Any element that fails to convert yields `default`.
    pub fn get_list<T: FromValue>(&self, path: &str, default: Vec<T>) -> Vec<T> {
        self.lookup(path)
            .and_then(items_of)
            .and_then(|items| items.iter().map(T::from_value).collect::<Result<_>>().ok())
            .unwrap_or(default)
    }

    pub fn get_set<T: FromValue + Eq + Hash>(&self, path: &str, default: HashSet<T>) -> HashSet<T> {
        self.lookup(path)
            .and_then(items_of)
            .and_then(|items| items.iter().map(T::from_value).collect::<Result<_>>().ok())
            .unwrap_or(default)
    }

    /// Reads a nested node as a map, converting keys from their string form.
    pub fn get_map<K, V>(&self, path: &str, default: HashMap<K, V>) -> HashMap<K, V>
    where
        K: FromValue + Eq + Hash,
        V: FromValue,
    {
        let Some(node) = self.lookup(path).and_then(Value::as_node) else {
            return default;
        };
        node.iter()
            .map(|(key, value)| {
                Ok((
                    K::from_value(&Value::String(key.clone()))?,
                    V::from_value(value)?,
                ))
            })
            .collect::<Result<_>>()
            .unwrap_or(default)
    }

    /// Folds `others` into this node left to right, later values winning.
    pub fn merge<'a>(&self, others: impl IntoIterator<Item = &'a Node>) -> Node {
        let mut entries = (*self.entries).clone();
        for other in others {
            tree::merge_into(&mut entries, &other.entries);
        }
        Node::from_entries(entries)
    }

    pub fn merge_all<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Node {
        Node::empty().merge(nodes)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, Value> {
        &self.entries
    }

    /// Materializes `T` from this node, see [`crate::materialize`].
    pub fn materialize<T: crate::Materialize>(&self) -> Result<Arc<T>> {
        crate::materialize(self)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Node {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Node::from_map(iter)
    }
}

impl Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.entries.serialize(serializer)
    }
}
