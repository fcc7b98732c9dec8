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

//! Scalar coercion between the value kinds a source produces and the types a
//! config declares.

use crate::error::{ConfigError, Result};
use crate::node::{Node, Value};
use std::borrow::Cow;

/// Conversion from a raw [`Value`] into a declared type.
pub trait FromValue: Sized {
    /// Name used for the target type in conversion errors.
    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed(std::any::type_name::<Self>())
    }

    fn from_value(value: &Value) -> Result<Self>;
}

/// Unit-variant enums that can be parsed from their SCREAMING_SNAKE name.
///
/// Implemented by `#[derive(ConfigEnum)]`.
pub trait ConfigEnum: Sized + Clone + 'static {
    const VARIANTS: &'static [(&'static str, Self)];

    fn names() -> Vec<&'static str> {
        Self::VARIANTS.iter().map(|(name, _)| *name).collect()
    }
}

fn mismatch<T: FromValue>(value: &Value) -> ConfigError {
    ConfigError::conversion(value.to_string(), value.kind(), T::type_name())
}

enum Number {
    Int(i128),
    Float(f64),
}

/// Text without a `.` is read as an integer, with one as a float.
fn parse_number(text: &str) -> Option<Number> {
    if text.contains('.') {
        text.parse().ok().map(Number::Float)
    } else {
        text.parse().ok().map(Number::Int)
    }
}

pub fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        _ => None,
    }
}

/// Splits a `[a, b, c]` list string into trimmed, non-empty items.
pub fn parse_list(text: &str) -> Option<Vec<String>> {
    let inner = text.trim().strip_prefix('[')?.strip_suffix(']')?;
    Some(
        inner
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_owned)
            .collect(),
    )
}

/// The elements of a list value, or of a bracketed list string.
pub(crate) fn items_of(value: &Value) -> Option<Cow<'_, [Value]>> {
    match value {
        Value::List(items) => Some(Cow::Borrowed(items)),
        Value::String(text) => parse_list(text)
            .map(|items| Cow::Owned(items.into_iter().map(Value::String).collect())),
        _ => None,
    }
}

/// Upper-cases `text` and maps spaces and dashes to underscores.
pub fn normalize_enum_name(text: &str) -> String {
    text.trim().to_uppercase().replace([' ', '-'], "_")
}

pub fn enum_from_value<E: ConfigEnum + FromValue>(value: &Value) -> Result<E> {
    let Value::String(text) = value else {
        return Err(mismatch::<E>(value));
    };
    let wanted = normalize_enum_name(text);
    E::VARIANTS
        .iter()
        .find(|(name, _)| *name == wanted)
        .map(|(_, variant)| variant.clone())
        .ok_or_else(|| ConfigError::TypeConversion {
            key: None,
            value: text.clone(),
            source_type: value.kind(),
            target_type: E::type_name().into_owned(),
            valid_values: E::names().into_iter().map(str::to_owned).collect(),
        })
}

macro_rules! integer_from_value {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn type_name() -> Cow<'static, str> {
                    Cow::Borrowed(stringify!($ty))
                }

                fn from_value(value: &Value) -> Result<Self> {
                    match value {
                        Value::Int(number) => Ok(*number as $ty),
                        Value::Float(number) => Ok(*number as $ty),
                        Value::String(text) => match parse_number(text) {
                            Some(Number::Int(number)) => Ok(number as $ty),
                            Some(Number::Float(number)) => Ok(number as $ty),
                            None => Err(mismatch::<Self>(value)),
                        },
                        _ => Err(mismatch::<Self>(value)),
                    }
                }
            }
        )*
    };
}

integer_from_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! float_from_value {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn type_name() -> Cow<'static, str> {
                    Cow::Borrowed(stringify!($ty))
                }

                fn from_value(value: &Value) -> Result<Self> {
                    match value {
                        Value::Int(number) => Ok(*number as $ty),
                        Value::Float(number) => Ok(*number as $ty),
                        // Also accepts exponents, `inf` and `NaN`.
                        Value::String(text) => text
                            .parse::<$ty>()
                            .map_err(|_| mismatch::<Self>(value)),
                        _ => Err(mismatch::<Self>(value)),
                    }
                }
            }
        )*
    };
}

float_from_value!(f32, f64);

impl FromValue for bool {
    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed("bool")
    }

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Bool(flag) => Ok(*flag),
            Value::String(text) => parse_bool(text).ok_or_else(|| ConfigError::TypeConversion {
                key: None,
                value: text.clone(),
                source_type: value.kind(),
                target_type: "bool".to_owned(),
                valid_values: ["true", "false", "yes", "no"].map(str::to_owned).to_vec(),
            }),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl FromValue for String {
    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed("String")
    }

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(text) => Ok(text.clone()),
            Value::Bool(_) | Value::Int(_) | Value::Float(_) => Ok(value.to_string()),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl FromValue for char {
    fn from_value(value: &Value) -> Result<Self> {
        let text = String::from_value(value)?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(single), None) => Ok(single),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl FromValue for Node {
    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed("Node")
    }

    fn from_value(value: &Value) -> Result<Self> {
        value.as_node().cloned().ok_or_else(|| mismatch::<Self>(value))
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("Vec<{}>", T::type_name()))
    }

    fn from_value(value: &Value) -> Result<Self> {
        let items = items_of(value).ok_or_else(|| mismatch::<Self>(value))?;
        items
            .iter()
            .enumerate()
            .map(|(index, item)| T::from_value(item).map_err(|error| error.within(&format!("[{index}]"))))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Value::from("42"), 42 ; "integer string")]
    #[test_case(Value::from("42.9"), 42 ; "float string truncates")]
    #[test_case(Value::from(42.9), 42 ; "float truncates")]
    #[test_case(Value::from(i64::from(u32::MAX) + 43), 42 ; "wide integer wraps")]
    fn converts_to_u32(value: Value, expected: u32) {
        assert_eq!(u32::from_value(&value), Ok(expected));
    }

    #[test_case("2.5", 2.5 ; "decimal")]
    #[test_case("7", 7.0 ; "integer")]
    #[test_case("1e5", 100000.0 ; "exponent")]
    #[test_case("-2.5E-1", -0.25 ; "signed exponent")]
    #[test_case("inf", f64::INFINITY ; "infinity")]
    fn converts_strings_to_f64(text: &str, expected: f64) {
        assert_eq!(f64::from_value(&Value::from(text)), Ok(expected));
    }

    #[test]
    fn non_numeric_text_is_not_a_float() {
        assert!(f64::from_value(&Value::from("fast")).is_err());
        assert!(f64::from_value(&Value::from("NaN")).is_ok_and(f64::is_nan));
    }

    #[test_case("true", true)]
    #[test_case("YES", true)]
    #[test_case("False", false)]
    #[test_case("no", false)]
    fn parses_booleans(text: &str, expected: bool) {
        assert_eq!(bool::from_value(&Value::from(text)), Ok(expected));
    }

    #[test]
    fn rejects_unknown_boolean_with_valid_names() {
        let Err(ConfigError::TypeConversion { valid_values, .. }) =
            bool::from_value(&Value::from("maybe"))
        else {
            panic!("expected a conversion failure");
        };
        assert_eq!(valid_values, vec!["true", "false", "yes", "no"]);
    }

    #[test_case(Value::from(8080), "8080" ; "integer")]
    #[test_case(Value::from(true), "true" ; "boolean")]
    #[test_case(Value::from(1.5), "1.5" ; "float")]
    fn stringifies_scalars(value: Value, expected: &str) {
        assert_eq!(String::from_value(&value).as_deref(), Ok(expected));
    }

    #[test]
    fn integer_from_text_is_reported_with_source_and_target() {
        let error = i32::from_value(&Value::from("ten")).expect_err("not numeric");
        assert_eq!(
            error.to_string(),
            "Unable to convert value: ten (of type: string) to: i32"
        );
    }

    #[test_case("[a, b ,c]", Some(vec!["a", "b", "c"]) ; "trimmed")]
    #[test_case("[a,,b, ]", Some(vec!["a", "b"]) ; "empty segments dropped")]
    #[test_case("[]", Some(vec![]) ; "empty list")]
    #[test_case("a, b", None ; "missing brackets")]
    fn parses_list_strings(text: &str, expected: Option<Vec<&str>>) {
        let expected = expected.map(|items| items.into_iter().map(str::to_owned).collect::<Vec<_>>());
        assert_eq!(parse_list(text), expected);
    }

    #[test]
    fn list_element_failures_carry_the_index() {
        let error = Vec::<u8>::from_value(&Value::from("[1, x]")).expect_err("x is not a number");
        assert_eq!(error.key(), Some("[1]"));
    }

    #[test]
    fn enum_names_are_normalized() {
        assert_eq!(normalize_enum_name("round-robin"), "ROUND_ROBIN");
        assert_eq!(normalize_enum_name("round robin"), "ROUND_ROBIN");
    }
}
