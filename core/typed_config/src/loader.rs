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

//! Layered loading: embedded defaults, then a TOML file, then environment
//! variables, later layers winning.

use crate::binding::engine::{Materialize, materialize};
use crate::error::{ConfigError, Result};
use crate::node::Node;
use crate::source::EnvSource;
use figment::providers::{Format, Toml};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

const DISPLAY_CONFIG_ENV: &str = "TYPED_CONFIG_DISPLAY_CONFIG";
const DISPLAY_CONFIG_SUFFIX: &str = "DISPLAY_CONFIG";

#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    file_path: Option<String>,
    default_config: Option<String>,
    env: Option<EnvSource>,
    display_config: bool,
    resolve_templates: bool,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// TOML file to merge over the defaults. Relative paths are searched for
    /// from the working directory upwards.
    pub fn file(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Embedded TOML document forming the lowest layer.
    pub fn defaults(mut self, toml: impl Into<String>) -> Self {
        self.default_config = Some(toml.into());
        self
    }

    pub fn env(mut self, source: EnvSource) -> Self {
        self.env = Some(source);
        self
    }

    pub fn display_config(mut self, display: bool) -> Self {
        self.display_config = display;
        self
    }

    /// Resolves `${key}` templates against the merged node.
    pub fn resolve_templates(mut self, resolve: bool) -> Self {
        self.resolve_templates = resolve;
        self
    }

    pub fn load(&self) -> Result<Node> {
        let mut layers = Vec::with_capacity(3);
        let has_default = self.default_config.is_some();
        match &self.default_config {
            Some(default) => layers.push(Node::from_provider(Toml::string(default))?),
            None => warn!("No default configuration provided."),
        }

        if let Some(file_path) = &self.file_path {
            info!("Loading config from path: '{file_path}'...");
            match locate(file_path) {
                Some(found) => {
                    info!("Found configuration file at path: '{}'.", found.display());
                    layers.push(Node::from_provider(Toml::file(&found))?);
                }
                None if has_default => {
                    warn!("Configuration file not found at path: '{file_path}'.");
                    info!("Using default configuration, as no config file was found.");
                }
                None => {
                    error!("Configuration file not found at path: '{file_path}'.");
                    return Err(ConfigError::CannotLoadConfiguration {
                        reason: format!("configuration file not found: '{file_path}'"),
                    });
                }
            }
        }

        if let Some(env) = &self.env {
            layers.push(env.load());
        }

        let mut node = Node::merge_all(&layers);
        if self.resolve_templates {
            node = node.resolve_self();
        }

        info!("Config loaded successfully.");
        if self.should_display() {
            info!("Using Config: {node}");
        }
        Ok(node)
    }

    /// Loads the layers and materializes `T` from the result.
    pub fn load_as<T: Materialize>(&self) -> Result<Arc<T>> {
        materialize(&self.load()?)
    }

    fn should_display(&self) -> bool {
        let variable = match &self.env {
            Some(env) => format!("{}{DISPLAY_CONFIG_SUFFIX}", env.prefix()),
            None => DISPLAY_CONFIG_ENV.to_owned(),
        };
        env::var(variable)
            .map(|value| value == "1" || value.to_lowercase() == "true")
            .unwrap_or(self.display_config)
    }
}

/// Finds `path`, walking up from the working directory for relative paths.
fn locate<P: AsRef<Path>>(path: P) -> Option<PathBuf> {
    let path = path.as_ref();
    if path.is_absolute() {
        return path.is_file().then(|| path.to_path_buf());
    }

    let cwd = env::current_dir().ok()?;
    cwd.ancestors()
        .map(|dir| dir.join(path))
        .find(|candidate| candidate.is_file())
}
