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

use super::{Node, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Expands dotted keys into nested nodes.
///
/// Collisions follow the merge rules: a node is never replaced by a scalar,
/// two nodes are merged, and otherwise the later entry wins.
pub(super) fn expand(entries: impl IntoIterator<Item = (String, Value)>) -> BTreeMap<String, Value> {
    let mut result = BTreeMap::new();
    for (key, value) in entries {
        let segments = key.split('.').collect::<Vec<_>>();
        insert_path(&mut result, &segments, value);
    }
    result
}

fn insert_path(map: &mut BTreeMap<String, Value>, segments: &[&str], value: Value) {
    let [head, rest @ ..] = segments else {
        return;
    };
    if rest.is_empty() {
        match map.get_mut(*head) {
            Some(existing) => merge_value(existing, value),
            None => {
                map.insert((*head).to_owned(), value);
            }
        }
        return;
    }

    let slot = map
        .entry((*head).to_owned())
        .or_insert_with(|| Value::Node(Node::empty()));
    if !slot.is_node() {
        *slot = Value::Node(Node::empty());
    }
    if let Value::Node(node) = slot {
        insert_path(Arc::make_mut(&mut node.entries), rest, value);
    }
}

pub(super) fn merge_into(target: &mut BTreeMap<String, Value>, other: &BTreeMap<String, Value>) {
    for (key, incoming) in other {
        match target.get_mut(key) {
            Some(existing) => merge_value(existing, incoming.clone()),
            None => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
}

fn merge_value(existing: &mut Value, incoming: Value) {
    match (existing, incoming) {
        (Value::Node(current), Value::Node(next)) => {
            merge_into(Arc::make_mut(&mut current.entries), &next.entries);
        }
        (Value::Node(_), _) => {}
        (slot, incoming) => *slot = incoming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_keys_become_nested_nodes() {
        let node = Node::from_map([("a.b", 1)]);
        let nested = Node::from_map([("a", Node::from_map([("b", 1)]))]);
        assert_eq!(node, nested);
    }

    #[test]
    fn expanding_a_nested_node_is_a_no_op() {
        let nested = Node::from_map([(
            "x",
            Node::from_map([("y", Value::from(1)), ("z", Value::from("w"))]),
        )]);
        let again = Node::from_map(nested.iter().map(|(key, value)| (key.clone(), value.clone())));
        assert_eq!(again, nested);
    }

    #[test]
    fn plain_key_does_not_clobber_expanded_structure() {
        let node = Node::from_map([("a.b", Value::from(1)), ("a", Value::from("flat"))]);
        assert_eq!(node.get_int("a.b", 0), 1);

        let node = Node::from_map([("a", Value::from("flat")), ("a.b", Value::from(1))]);
        assert_eq!(node.get_int("a.b", 0), 1);
    }

    #[test]
    fn expansion_never_touches_the_source_node() {
        let shared = Node::from_map([("b", 1)]);
        let derived = Node::from_map([("a", Value::from(shared.clone())), ("a.c", Value::from(2))]);
        assert_eq!(derived.get_int("a.c", 0), 2);
        assert!(!shared.has("c"));
    }
}
