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

use super::Node;
use serde::{Serialize, Serializer};
use std::fmt::{self, Display};

/// A single entry of a [`Node`].
///
/// Sets are stored as lists and deduplicated when read back as a set.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Node(Node),
}

impl Value {
    /// Short name of the value's kind, used in conversion errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Node(_) => "node",
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_node(&self) -> bool {
        matches!(self, Value::Node(_))
    }

    /// Converts a JSON value, `null` has no counterpart and yields `None`.
    pub fn from_json(value: serde_json::Value) -> Option<Value> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::Bool(value) => Some(Value::Bool(value)),
            serde_json::Value::Number(number) => {
                if let Some(n) = number.as_i64() {
                    Some(Value::Int(n))
                } else if let Some(n) = number.as_u64() {
                    // Beyond i64, kept textual so u64 targets can still parse it.
                    Some(Value::String(n.to_string()))
                } else {
                    number.as_f64().map(Value::Float)
                }
            }
            serde_json::Value::String(value) => Some(Value::String(value)),
            serde_json::Value::Array(items) => Some(Value::List(
                items.into_iter().filter_map(Value::from_json).collect(),
            )),
            serde_json::Value::Object(map) => Some(Value::Node(Node::from_map(
                map.into_iter()
                    .filter_map(|(key, value)| Value::from_json(value).map(|value| (key, value))),
            ))),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::String(value) => f.write_str(value),
            Value::List(_) | Value::Node(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::Int(value) => serializer.serialize_i64(*value),
            Value::Float(value) => serializer.serialize_f64(*value),
            Value::String(value) => serializer.serialize_str(value),
            Value::List(items) => items.serialize(serializer),
            Value::Node(node) => node.serialize(serializer),
        }
    }
}

macro_rules! value_from_small_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Int(i64::from(value))
                }
            }
        )*
    };
}

value_from_small_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! value_from_wide_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    i64::try_from(value)
                        .map(Value::Int)
                        .unwrap_or_else(|_| Value::String(value.to_string()))
                }
            }
        )*
    };
}

value_from_wide_int!(u64, usize, isize, i128, u128);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Node> for Value {
    fn from(value: Node) -> Self {
        Value::Node(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_integers_outside_i64_are_kept_as_text() {
        assert_eq!(Value::from(u64::MAX), Value::String(u64::MAX.to_string()));
        assert_eq!(Value::from(42_u64), Value::Int(42));
    }

    #[test]
    fn json_conversion_drops_nulls() {
        let value = Value::from_json(serde_json::json!({"a": null, "b": [1, null, "x"]}))
            .expect("object converts");
        let node = value.as_node().expect("object is a node");
        assert!(!node.has("a"));
        assert_eq!(
            node.lookup("b"),
            Some(&Value::List(vec![Value::Int(1), Value::from("x")]))
        );
    }

    #[test]
    fn display_renders_scalars_raw_and_structures_as_json() {
        assert_eq!(Value::from("plain").to_string(), "plain");
        assert_eq!(Value::from(vec![1, 2]).to_string(), "[1,2]");
    }
}
