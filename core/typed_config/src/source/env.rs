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

use crate::node::{Node, Value};
use std::collections::BTreeMap;
use std::env;
use tracing::{info, warn};

const SECRET_MASK: &str = "******";
const DEFAULT_SEPARATOR: &str = "__";
/// Indexed variables may leave gaps, but a list never gets more slots than
/// this many per variable.
const SLOTS_PER_INDEX: usize = 4;

/// Maps prefixed environment variables onto nested keys.
///
/// With prefix `APP_` and the default `__` separator, `APP_DB__HOST` becomes
/// `db.host`. Segments that are all numeric turn their parent into a list, so
/// `APP_SERVERS__0__HOST` populates `servers[0].host`.
///
/// # Example
/// ```ignore
/// let node = EnvSource::new("APP_").secret_keys(&["APP_DB__PASSWORD"]).load();
/// ```
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
    separator: String,
    secret_keys: Vec<String>,
}

impl EnvSource {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_owned(),
            separator: DEFAULT_SEPARATOR.to_owned(),
            secret_keys: Vec::new(),
        }
    }

    pub fn separator(mut self, separator: &str) -> Self {
        self.separator = separator.to_owned();
        self
    }

    /// Variable names whose values are masked when logged.
    pub fn secret_keys(mut self, keys: &[&str]) -> Self {
        self.secret_keys = keys.iter().map(|key| key.to_string()).collect();
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Reads the current process environment.
    pub fn load(&self) -> Node {
        self.from_vars(env::vars())
    }

    pub fn from_vars(&self, vars: impl IntoIterator<Item = (String, String)>) -> Node {
        let mut entries = BTreeMap::new();
        for (name, value) in vars {
            if value.is_empty() {
                continue;
            }
            let Some(path) = self.config_path(&name) else {
                continue;
            };

            let display_value = if self.secret_keys.contains(&name) {
                SECRET_MASK
            } else {
                value.as_str()
            };
            info!("{name} value changed to: {display_value} from environment variable");
            entries.insert(path, Value::String(value));
        }

        let node = Node::from_map(entries);
        match numeric_nodes_to_lists(Value::Node(node)) {
            Value::Node(node) => node,
            _ => Node::empty(),
        }
    }

    fn config_path(&self, name: &str) -> Option<String> {
        let stripped = name.strip_prefix(&self.prefix)?;
        if stripped.is_empty() {
            return None;
        }
        let segments = stripped
            .to_lowercase()
            .split(self.separator.as_str())
            .map(str::to_owned)
            .collect::<Vec<_>>();
        if segments.iter().any(String::is_empty) {
            return None;
        }
        Some(segments.join("."))
    }
}

/// Turns nodes whose keys are all indices into lists, recursively.
fn numeric_nodes_to_lists(value: Value) -> Value {
    match value {
        Value::Node(node) => {
            let entries = node
                .iter()
                .map(|(key, value)| (key.clone(), numeric_nodes_to_lists(value.clone())))
                .collect::<BTreeMap<_, _>>();
            if is_index_map(&entries) {
                index_map_to_list(entries)
            } else {
                Value::Node(Node::from_entries(entries))
            }
        }
        Value::List(items) => Value::List(items.into_iter().map(numeric_nodes_to_lists).collect()),
        other => other,
    }
}

fn is_index_map(entries: &BTreeMap<String, Value>) -> bool {
    !entries.is_empty() && entries.keys().all(|key| key.parse::<usize>().is_ok())
}

/// Turns `{"0": a, "2": c}` into `[a, {}, c]`. Indices too sparse for the
/// number of entries keep the map as a node.
fn index_map_to_list(entries: BTreeMap<String, Value>) -> Value {
    let indexed = entries
        .iter()
        .filter_map(|(key, value)| key.parse::<usize>().ok().map(|index| (index, value)))
        .collect::<BTreeMap<_, _>>();
    let limit = indexed.len().saturating_mul(SLOTS_PER_INDEX);
    let len = match indexed.last_key_value() {
        Some((index, _)) => index.checked_add(1).filter(|len| *len <= limit),
        None => Some(0),
    };
    let Some(len) = len else {
        warn!(
            "Indexed environment entries too sparse for a list ({} entries), keeping them as keys.",
            indexed.len()
        );
        return Value::Node(Node::from_entries(entries));
    };

    let mut list = vec![Value::Node(Node::empty()); len];
    for (index, value) in indexed {
        list[index] = value.clone();
    }
    Value::List(list)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn maps_prefixed_variables_to_nested_keys() {
        let node = EnvSource::new("APP_").from_vars(vars(&[
            ("APP_DB__HOST", "db.local"),
            ("APP_DB__POOL_SIZE", "8"),
            ("APP_NAME", "svc"),
            ("OTHER_NAME", "ignored"),
            ("APP_EMPTY", ""),
        ]));

        assert_eq!(node.get_string("db.host").as_deref(), Some("db.local"));
        assert_eq!(node.get_int("db.pool_size", 0), 8);
        assert_eq!(node.get_string("name").as_deref(), Some("svc"));
        assert_eq!(node.len(), 2);
    }

    #[test]
    fn indexed_segments_become_lists() {
        let node = EnvSource::new("APP_").from_vars(vars(&[
            ("APP_SERVERS__1__HOST", "b"),
            ("APP_SERVERS__0__HOST", "a"),
        ]));

        let Some(Value::List(servers)) = node.lookup("servers") else {
            panic!("servers should be a list");
        };
        let hosts = servers
            .iter()
            .filter_map(Value::as_node)
            .filter_map(|server| server.get_string("host"))
            .collect::<Vec<_>>();
        assert_eq!(hosts, vec!["a", "b"]);
    }

    #[test]
    fn sparse_indices_stay_keyed() {
        let node = EnvSource::new("APP_").from_vars(vars(&[
            ("APP_SERVERS__18446744073709551615", "x"),
            ("APP_PORTS__4000000000", "80"),
        ]));
        assert_eq!(node.get_string("servers.18446744073709551615").as_deref(), Some("x"));
        assert_eq!(node.get_int("ports.4000000000", 0), 80);
    }

    #[test]
    fn small_gaps_are_filled_with_empty_nodes() {
        let node = EnvSource::new("APP_").from_vars(vars(&[("APP_HOSTS__2", "c")]));
        let Some(Value::List(hosts)) = node.lookup("hosts") else {
            panic!("hosts should be a list");
        };
        assert_eq!(hosts.len(), 3);
        assert_eq!(hosts[0], Value::Node(Node::empty()));
        assert_eq!(hosts[2], Value::from("c"));
    }

    #[test]
    fn custom_separator_is_honoured() {
        let node = EnvSource::new("SVC_")
            .separator("_")
            .from_vars(vars(&[("SVC_HTTP_PORT", "80")]));
        assert_eq!(node.get_int("http.port", 0), 80);
    }
}
