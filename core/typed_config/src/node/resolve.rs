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

use super::{Node, Value, template};
use tracing::warn;

impl Node {
    /// Replaces `${key}` templates in every string leaf, looking keys up in
    /// `lookup`. Substituted text is resolved again; a key reached while it is
    /// already being expanded is left as its literal token.
    pub fn resolve(&self, lookup: &Node) -> Node {
        let resolver = Resolver { lookup };
        Node::from_entries(
            self.iter()
                .map(|(key, value)| (key.clone(), resolver.value(value)))
                .collect(),
        )
    }

    pub fn resolve_self(&self) -> Node {
        self.resolve(self)
    }
}

struct Resolver<'a> {
    lookup: &'a Node,
}

impl Resolver<'_> {
    fn value(&self, value: &Value) -> Value {
        match value {
            Value::String(text) => Value::String(self.text(text, &mut Vec::new())),
            Value::List(items) => Value::List(items.iter().map(|item| self.value(item)).collect()),
            Value::Node(node) => Value::Node(node.resolve(self.lookup)),
            other => other.clone(),
        }
    }

    fn text(&self, input: &str, visiting: &mut Vec<String>) -> String {
        template::substitute(input, |key| {
            if visiting.iter().any(|visited| visited == key) {
                warn!("Template key: '{key}' refers back to itself, leaving it unresolved.");
                return None;
            }
            let raw = self.lookup.get_string(key)?;
            visiting.push(key.to_owned());
            let resolved = self.text(&raw, &mut *visiting);
            visiting.pop();
            Some(resolved)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_against_itself() {
        let node = Node::from_map([("base", "x"), ("path", "${base}/y")]).resolve_self();
        assert_eq!(node.get_string("path").as_deref(), Some("x/y"));
    }

    #[test]
    fn resolves_nested_templates_lists_and_subtrees() {
        let node = Node::from_map([
            ("root", Value::from("/srv")),
            ("data", Value::from("${root}/data")),
            ("dirs.logs", Value::from("${data}/logs")),
            ("mirrors", Value::from(vec!["${root}/a", "${root}/b"])),
            ("port", Value::from(80)),
        ])
        .resolve_self();

        assert_eq!(node.get_string("dirs.logs").as_deref(), Some("/srv/data/logs"));
        assert_eq!(
            node.get_list::<String>("mirrors", Vec::new()),
            vec!["/srv/a".to_owned(), "/srv/b".to_owned()]
        );
        assert_eq!(node.get_int("port", 0), 80);
    }

    #[test]
    fn cyclic_templates_terminate() {
        let node = Node::from_map([("a", "${b}"), ("b", "${a}")]).resolve_self();
        assert_eq!(node.get_string("a").as_deref(), Some("${b}"));
        assert_eq!(node.get_string("b").as_deref(), Some("${a}"));
    }

    #[test]
    fn resolving_twice_is_stable() {
        let node = Node::from_map([("base", "x"), ("path", "${base}/y")]);
        let once = node.resolve_self();
        assert_eq!(once.resolve_self(), once);
    }

    #[test]
    fn keys_are_never_substituted() {
        let lookup = Node::from_map([("k", "v")]);
        let node = Node::from_map([("${k}", "${k}")]).resolve(&lookup);
        assert_eq!(node.keys().collect::<Vec<_>>(), vec!["${k}"]);
        assert_eq!(node.get_string("${k}").as_deref(), Some("v"));
    }
}
