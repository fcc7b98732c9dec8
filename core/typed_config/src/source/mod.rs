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

//! Constructors producing a [`Node`] from the supported raw sources.

mod env;
mod properties;

pub use env::EnvSource;

use crate::error::{ConfigError, Result};
use crate::node::{Node, Value};
use figment::value::{Dict, Map};
use figment::{Figment, Metadata, Profile, Provider, providers::Serialized};
use std::env as process_env;
use tracing::error;

impl Node {
    /// Every variable of the process environment under its own name.
    pub fn from_env() -> Node {
        Node::from_map(process_env::vars())
    }

    pub fn from_properties(text: &str) -> Node {
        Node::from_map(properties::parse_properties(text))
    }

    /// Converts a JSON object; `null` members are treated as absent.
    pub fn from_json(value: serde_json::Value) -> Result<Node> {
        match Value::from_json(value) {
            Some(Value::Node(node)) => Ok(node),
            Some(other) => Err(ConfigError::CannotLoadConfiguration {
                reason: format!("expected a JSON object, found a {}", other.kind()),
            }),
            None => Ok(Node::empty()),
        }
    }

    /// Extracts the selected profile of any figment provider, such as
    /// `Toml::file` or `Toml::string`.
    pub fn from_provider<P: Provider>(provider: P) -> Result<Node> {
        let value = Figment::from(provider)
            .extract::<serde_json::Value>()
            .map_err(|e| {
                error!("Failed to read configuration source: {e}");
                ConfigError::CannotLoadConfiguration {
                    reason: e.to_string(),
                }
            })?;
        Node::from_json(value)
    }
}

impl Provider for EnvSource {
    fn metadata(&self) -> Metadata {
        Metadata::named(format!("environment variables prefixed with '{}'", self.prefix()))
    }

    fn data(&self) -> std::result::Result<Map<Profile, Dict>, figment::Error> {
        Serialized::defaults(self.load()).data()
    }
}
