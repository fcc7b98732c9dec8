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

//! How each declarable member type is produced from a value, from absence,
//! or from the special identity/parent/fallback sources.

use super::context::BindContext;
use super::engine::{Materialize, materialize_nested};
use super::lineage::Parent;
use crate::coerce::{FromValue, items_of};
use crate::error::{ConfigError, Result};
use crate::node::{Node, Value};
use std::any::{Any, type_name};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;
use std::sync::atomic::{
    AtomicBool, AtomicI32, AtomicI64, AtomicIsize, AtomicU32, AtomicU64, AtomicUsize,
};
use std::sync::{Arc, Mutex, RwLock};

/// A type a config member can be declared as.
pub trait Bind: Sized {
    /// Produces the member from the value found under its key.
    fn bind(value: &Value, ctx: &BindContext<'_>) -> Result<Self>;

    /// The value used when the key is absent and no default was given.
    /// `None` means the type has no zero value.
    fn zero(ctx: &BindContext<'_>) -> Result<Option<Self>> {
        let _ = ctx;
        Ok(None)
    }

    /// Materializes the member from a whole node, used for fallback nodes.
    fn from_node(node: &Node, ctx: &BindContext<'_>) -> Result<Self> {
        let _ = (node, ctx);
        Err(ConfigError::UnresolvableTargetType {
            type_name: type_name::<Self>().to_owned(),
            key: None,
        })
    }

    /// The member for an identity marker, `None` when the type cannot hold
    /// the backing node.
    fn from_identity(node: &Node) -> Option<Self> {
        let _ = node;
        None
    }

    /// The member for a parent marker, `None` when the type is not a parent
    /// reference.
    fn from_parent(ctx: &BindContext<'_>) -> Option<Self> {
        let _ = ctx;
        None
    }
}

macro_rules! scalar_bind {
    ($($ty:ty => $zero:expr),* $(,)?) => {
        $(
            impl Bind for $ty {
                fn bind(value: &Value, _: &BindContext<'_>) -> Result<Self> {
                    <$ty as FromValue>::from_value(value)
                }

                fn zero(_: &BindContext<'_>) -> Result<Option<Self>> {
                    Ok(Some($zero))
                }
            }
        )*
    };
}

scalar_bind!(
    i8 => 0, i16 => 0, i32 => 0, i64 => 0, i128 => 0, isize => 0,
    u8 => 0, u16 => 0, u32 => 0, u64 => 0, u128 => 0, usize => 0,
    f32 => 0.0, f64 => 0.0,
    bool => false,
    String => String::new(),
);

impl Bind for char {
    fn bind(value: &Value, _: &BindContext<'_>) -> Result<Self> {
        char::from_value(value)
    }
}

impl Bind for Value {
    fn bind(value: &Value, _: &BindContext<'_>) -> Result<Self> {
        Ok(value.clone())
    }
}

impl Bind for Node {
    fn bind(value: &Value, _: &BindContext<'_>) -> Result<Self> {
        Node::from_value(value)
    }

    fn zero(_: &BindContext<'_>) -> Result<Option<Self>> {
        Ok(Some(Node::empty()))
    }

    fn from_node(node: &Node, _: &BindContext<'_>) -> Result<Self> {
        Ok(node.clone())
    }

    fn from_identity(node: &Node) -> Option<Self> {
        Some(node.clone())
    }
}

impl<T: Bind> Bind for Option<T> {
    fn bind(value: &Value, ctx: &BindContext<'_>) -> Result<Self> {
        T::bind(value, ctx).map(Some)
    }

    fn zero(_: &BindContext<'_>) -> Result<Option<Self>> {
        Ok(Some(None))
    }

    fn from_node(node: &Node, ctx: &BindContext<'_>) -> Result<Self> {
        T::from_node(node, ctx).map(Some)
    }

    fn from_identity(node: &Node) -> Option<Self> {
        T::from_identity(node).map(Some)
    }
}

/// Nested configs recurse into the engine with the current instance as
/// their parent.
impl<M: Materialize> Bind for Arc<M> {
    fn bind(value: &Value, ctx: &BindContext<'_>) -> Result<Self> {
        match value {
            Value::Node(node) => materialize_nested(node, ctx),
            other => Err(ConfigError::conversion(
                other.to_string(),
                other.kind(),
                type_name::<M>(),
            )),
        }
    }

    fn zero(ctx: &BindContext<'_>) -> Result<Option<Self>> {
        materialize_nested(&Node::empty(), ctx).map(Some)
    }

    fn from_node(node: &Node, ctx: &BindContext<'_>) -> Result<Self> {
        materialize_nested(node, ctx)
    }
}

impl<P: Any + Send + Sync> Bind for Parent<P> {
    fn bind(_: &Value, _: &BindContext<'_>) -> Result<Self> {
        Err(ConfigError::UnresolvableTargetType {
            type_name: type_name::<Self>().to_owned(),
            key: None,
        })
    }

    fn from_parent(ctx: &BindContext<'_>) -> Option<Self> {
        Some(ctx.parent::<P>())
    }
}

// Interior-mutable members are only accepted with `allow_mutable`.
macro_rules! wrapper_bind {
    ($($wrapper:ident),*) => {
        $(
            impl<T: Bind> Bind for $wrapper<T> {
                fn bind(value: &Value, ctx: &BindContext<'_>) -> Result<Self> {
                    T::bind(value, ctx).map($wrapper::new)
                }

                fn zero(ctx: &BindContext<'_>) -> Result<Option<Self>> {
                    T::zero(ctx).map(|zero| zero.map($wrapper::new))
                }
            }
        )*
    };
}

wrapper_bind!(Mutex, RwLock);

macro_rules! atomic_bind {
    ($($atomic:ty => $inner:ty),* $(,)?) => {
        $(
            impl Bind for $atomic {
                fn bind(value: &Value, ctx: &BindContext<'_>) -> Result<Self> {
                    <$inner as Bind>::bind(value, ctx).map(<$atomic>::new)
                }

                fn zero(_: &BindContext<'_>) -> Result<Option<Self>> {
                    Ok(Some(<$atomic>::default()))
                }
            }
        )*
    };
}

atomic_bind!(
    AtomicBool => bool,
    AtomicI32 => i32,
    AtomicI64 => i64,
    AtomicIsize => isize,
    AtomicU32 => u32,
    AtomicU64 => u64,
    AtomicUsize => usize,
);

fn bind_items<T, C>(value: &Value, ctx: &BindContext<'_>) -> Result<C>
where
    T: Bind,
    C: FromIterator<T>,
{
    let items = items_of(value).ok_or_else(|| {
        ConfigError::conversion(value.to_string(), value.kind(), type_name::<C>())
    })?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| T::bind(item, ctx).map_err(|error| error.within(&format!("[{index}]"))))
        .collect()
}

fn bind_entries<K, V, C>(value: &Value, ctx: &BindContext<'_>) -> Result<C>
where
    K: FromValue,
    V: Bind,
    C: FromIterator<(K, V)>,
{
    let node = value.as_node().ok_or_else(|| {
        ConfigError::conversion(value.to_string(), value.kind(), type_name::<C>())
    })?;
    node.iter()
        .map(|(key, item)| {
            let bound_key = K::from_value(&Value::String(key.clone()));
            bound_key
                .and_then(|bound_key| V::bind(item, ctx).map(|bound| (bound_key, bound)))
                .map_err(|error| error.within(key))
        })
        .collect()
}

impl<T: Bind> Bind for Vec<T> {
    fn bind(value: &Value, ctx: &BindContext<'_>) -> Result<Self> {
        bind_items(value, ctx)
    }

    fn zero(_: &BindContext<'_>) -> Result<Option<Self>> {
        Ok(Some(Vec::new()))
    }
}

impl<T: Bind + Eq + Hash> Bind for HashSet<T> {
    fn bind(value: &Value, ctx: &BindContext<'_>) -> Result<Self> {
        bind_items(value, ctx)
    }

    fn zero(_: &BindContext<'_>) -> Result<Option<Self>> {
        Ok(Some(HashSet::new()))
    }
}

impl<T: Bind + Ord> Bind for BTreeSet<T> {
    fn bind(value: &Value, ctx: &BindContext<'_>) -> Result<Self> {
        bind_items(value, ctx)
    }

    fn zero(_: &BindContext<'_>) -> Result<Option<Self>> {
        Ok(Some(BTreeSet::new()))
    }
}

impl<K: FromValue + Eq + Hash, V: Bind> Bind for HashMap<K, V> {
    fn bind(value: &Value, ctx: &BindContext<'_>) -> Result<Self> {
        bind_entries(value, ctx)
    }

    fn zero(_: &BindContext<'_>) -> Result<Option<Self>> {
        Ok(Some(HashMap::new()))
    }
}

impl<K: FromValue + Ord, V: Bind> Bind for BTreeMap<K, V> {
    fn bind(value: &Value, ctx: &BindContext<'_>) -> Result<Self> {
        bind_entries(value, ctx)
    }

    fn zero(_: &BindContext<'_>) -> Result<Option<Self>> {
        Ok(Some(BTreeMap::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::lineage::Lineage;

    fn bind<T: Bind>(value: Value) -> Result<T> {
        let node = Node::empty();
        let ctx = BindContext::new(&node, Lineage::root(), "Test");
        T::bind(&value, &ctx)
    }

    fn zero<T: Bind>() -> Result<Option<T>> {
        let node = Node::empty();
        let ctx = BindContext::new(&node, Lineage::root(), "Test");
        T::zero(&ctx)
    }

    #[test]
    fn zero_values_follow_the_declared_type() {
        assert_eq!(zero::<u16>(), Ok(Some(0)));
        assert_eq!(zero::<String>(), Ok(Some(String::new())));
        assert_eq!(zero::<Option<u8>>(), Ok(Some(None)));
        assert_eq!(zero::<Vec<u8>>(), Ok(Some(Vec::new())));
        assert_eq!(zero::<char>(), Ok(None));
    }

    #[test]
    fn collections_bind_each_element() {
        assert_eq!(bind::<Vec<u16>>(Value::from(vec![1, 2])), Ok(vec![1, 2]));
        assert_eq!(bind::<BTreeSet<u8>>(Value::from("[3, 1, 3]")), Ok(BTreeSet::from([1, 3])));

        let limits = Value::from(Node::from_map([("burst", 10), ("rate", 5)]));
        assert_eq!(
            bind::<BTreeMap<String, u32>>(limits),
            Ok(BTreeMap::from([("burst".to_owned(), 10), ("rate".to_owned(), 5)]))
        );
    }

    #[test]
    fn element_failures_report_their_position() {
        let error = bind::<Vec<u8>>(Value::from(vec!["1", "x"])).expect_err("x is not a number");
        assert_eq!(error.key(), Some("[1]"));

        let limits = Value::from(Node::from_map([("burst", "lots")]));
        let error = bind::<HashMap<String, u32>>(limits).expect_err("lots is not a number");
        assert_eq!(error.key(), Some("burst"));
    }

    #[test]
    fn identity_is_only_available_for_nodes() {
        let node = Node::from_map([("a", 1)]);
        assert_eq!(Node::from_identity(&node), Some(node.clone()));
        assert_eq!(<Option<Node>>::from_identity(&node), Some(Some(node.clone())));
        assert_eq!(String::from_identity(&node), None);
    }
}
