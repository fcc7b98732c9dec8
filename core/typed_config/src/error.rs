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

//! Failure taxonomy shared by the node, coercion, classifier and engine layers.

use thiserror::Error;

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Missing required property: '{key}'")]
    MissingRequiredProperty { key: String },
    #[error(
        "Unable to convert value: {value} (of type: {source_type}) to: {target_type}{}{}",
        at_key(.key),
        possible_values(.valid_values)
    )]
    TypeConversion {
        key: Option<String>,
        value: String,
        source_type: &'static str,
        target_type: String,
        valid_values: Vec<String>,
    },
    #[error(
        "Config type: {type_name} declares {declared} bindable members but its constructor consumed {consumed}, every member must be bound exactly once or marked as skipped"
    )]
    ConstructionArityMismatch {
        type_name: String,
        declared: usize,
        consumed: usize,
    },
    #[error(
        "Member: {type_name}::{member} is marked as identity but its type {declared_type} cannot hold the backing node"
    )]
    UnassignableIdentityType {
        type_name: String,
        member: String,
        declared_type: String,
    },
    #[error("Member: {type_name}::{member} {reason}")]
    InvalidAnnotationUsage {
        type_name: String,
        member: String,
        reason: String,
    },
    #[error(
        "Member: {type_name}::{member} of type {declared_type} is mutable, all members must be immutable, use #[config(allow_mutable)] if this is not desired"
    )]
    MutableField {
        type_name: String,
        member: String,
        declared_type: String,
    },
    #[error("Type: {type_name} cannot be materialized from a node{}", at_key(.key))]
    UnresolvableTargetType {
        type_name: String,
        key: Option<String>,
    },
    #[error("Materializing {type_name} exceeded the maximum nesting depth of {depth}")]
    DepthLimitExceeded { type_name: String, depth: usize },
    #[error("Cannot load configuration: {reason}")]
    CannotLoadConfiguration { reason: String },
}

impl ConfigError {
    pub(crate) fn conversion(
        value: impl Into<String>,
        source_type: &'static str,
        target_type: impl Into<String>,
    ) -> Self {
        Self::TypeConversion {
            key: None,
            value: value.into(),
            source_type,
            target_type: target_type.into(),
            valid_values: Vec::new(),
        }
    }

    pub(crate) fn missing(key: impl Into<String>) -> Self {
        Self::MissingRequiredProperty { key: key.into() }
    }

    /// Prefixes the logical key carried by this error with `parent`, so errors
    /// bubbling out of nested materialization report the full path.
    pub fn within(self, parent: &str) -> Self {
        match self {
            Self::MissingRequiredProperty { key } => Self::MissingRequiredProperty {
                key: join_key(parent, Some(&key)),
            },
            Self::TypeConversion {
                key,
                value,
                source_type,
                target_type,
                valid_values,
            } => Self::TypeConversion {
                key: Some(join_key(parent, key.as_deref())),
                value,
                source_type,
                target_type,
                valid_values,
            },
            Self::UnresolvableTargetType { type_name, key } => Self::UnresolvableTargetType {
                type_name,
                key: Some(join_key(parent, key.as_deref())),
            },
            other => other,
        }
    }

    /// The logical key the failure was reported for, if known.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::MissingRequiredProperty { key } => Some(key),
            Self::TypeConversion { key, .. } | Self::UnresolvableTargetType { key, .. } => {
                key.as_deref()
            }
            _ => None,
        }
    }
}

fn join_key(parent: &str, child: Option<&str>) -> String {
    match child {
        None => parent.to_owned(),
        Some(child) if child.starts_with('[') => format!("{parent}{child}"),
        Some(child) => format!("{parent}.{child}"),
    }
}

fn at_key(key: &Option<String>) -> String {
    key.as_ref()
        .map(|key| format!(" at key: '{key}'"))
        .unwrap_or_default()
}

fn possible_values(values: &[String]) -> String {
    if values.is_empty() {
        String::new()
    } else {
        format!(", possible values: {}", values.join(", "))
    }
}
