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

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use typed_config::{ConfigEnum, ConfigError, Node, Value, config_interface, materialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ConfigEnum)]
pub enum Transport {
    Tcp,
    Quic,
}

#[config_interface(naming = "camel_case")]
pub trait Server {
    fn host(&self) -> String;

    fn port(&self) -> u16 {
        8080
    }

    fn admin_port(&self) -> u16 {
        self.port() + 1
    }

    fn api_key(&self) -> Option<String>;

    #[config(computed)]
    fn url(&self) -> String {
        format!("http://{}:{}", self.host(), self.port())
    }

    #[config(identity)]
    fn node(&self) -> Node;

    fn describe(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.host())
    }
}

#[test]
fn properties_defaults_and_computed_values() {
    let node = Node::from_map([("host", "a"), ("apiKey", "secret")]);
    let server = materialize::<BoundServer>(&node).expect("server");

    assert_eq!(server.host(), "a");
    assert_eq!(server.port(), 8080);
    assert_eq!(server.admin_port(), 8081);
    assert_eq!(server.api_key().as_deref(), Some("secret"));
    assert_eq!(server.url(), "http://a:8080");
    assert_eq!(server.node(), node);
    assert_eq!(server.describe("host: "), "host: a");
}

#[test]
fn configured_values_replace_default_bodies() {
    let node = Node::from_map([
        ("host", Value::from("b")),
        ("port", Value::from("9000")),
        ("adminPort", Value::from(1)),
    ]);
    let server = materialize::<BoundServer>(&node).expect("server");
    assert_eq!(server.port(), 9000);
    assert_eq!(server.admin_port(), 1);
    assert_eq!(server.url(), "http://b:9000");
}

#[test]
fn absent_properties_without_body_take_the_zero_value() {
    let server = materialize::<BoundServer>(&Node::empty()).expect("server");
    assert_eq!(server.host(), "");
    assert_eq!(server.api_key(), None);
}

#[test]
fn generated_representation_skips_derived_members() {
    let node = Node::from_map([("host", "a")]);
    let server = materialize::<BoundServer>(&node).expect("server");
    assert_eq!(
        server.to_string(),
        r#"Server{host="a", port=8080, admin_port=8081, api_key=None}"#
    );

    let other = materialize::<BoundServer>(&node.merge([&Node::from_map([("unused", 1)])]))
        .expect("server");
    assert_eq!(*server, *other);
}

static NONCE_CALLS: AtomicUsize = AtomicUsize::new(0);

#[config_interface]
pub trait Tokens {
    #[config(computed)]
    fn nonce(&self) -> usize {
        NONCE_CALLS.fetch_add(1, Ordering::SeqCst)
    }

    #[config(computed)]
    fn first(&self) -> usize {
        self.nonce()
    }

    #[config(computed)]
    fn second(&self) -> usize {
        self.nonce()
    }
}

#[test]
fn computed_getters_are_evaluated_once() {
    let before = NONCE_CALLS.load(Ordering::SeqCst);
    let tokens = materialize::<BoundTokens>(&Node::empty()).expect("tokens");
    assert_eq!(tokens.first(), tokens.second());
    assert_eq!(tokens.first(), tokens.nonce());
    assert_eq!(NONCE_CALLS.load(Ordering::SeqCst) - before, 1);
}

#[config_interface(naming = "camel_case")]
pub trait Root {
    fn name(&self) -> String;
    fn child(&self) -> Arc<BoundChild>;

    fn default_timeout(&self) -> u32 {
        5
    }
}

#[config_interface]
pub trait Child {
    fn label(&self) -> String;

    #[config(parent)]
    fn root(&self) -> Option<Arc<BoundRoot>>;

    fn timeout(&self) -> u32 {
        self.root().map(|root| root.default_timeout()).unwrap_or(1)
    }

    #[config(computed)]
    fn qualified(&self) -> String {
        match self.root() {
            Some(root) => format!("{}.{}", root.name(), self.label()),
            None => self.label(),
        }
    }
}

#[test]
fn parent_getter_returns_the_enclosing_instance() {
    let node = Node::from_map([("name", "r"), ("child.label", "c")]);
    let root = materialize::<BoundRoot>(&node).expect("root");
    let child = root.child();
    assert_eq!(child.label(), "c");
    let parent = child.root().expect("constructed under root");
    assert!(Arc::ptr_eq(&parent, &root));
}

#[test]
fn default_bodies_of_nested_configs_read_their_parent() {
    let node = Node::from_map([
        ("name", Value::from("r")),
        ("defaultTimeout", Value::from(30)),
        ("child.label", Value::from("c")),
    ]);
    let root = materialize::<BoundRoot>(&node).expect("root");
    assert_eq!(root.child().timeout(), 30);
    assert_eq!(root.child().qualified(), "r.c");

    let root = materialize::<BoundRoot>(&Node::from_map([("child.label", "c")])).expect("root");
    assert_eq!(root.child().timeout(), 5);
}

#[test]
fn parent_getter_is_absent_for_standalone_configs() {
    let child = materialize::<BoundChild>(&Node::from_map([("label", "c")])).expect("child");
    assert!(child.root().is_none());
    assert_eq!(child.timeout(), 1);
    assert_eq!(child.qualified(), "c");
}

#[config_interface]
pub trait Listener {
    fn transport(&self) -> Transport;

    fn backlog(&self) -> u32 {
        128
    }
}

#[test]
fn enum_property_without_zero_value_is_required() {
    let error = materialize::<BoundListener>(&Node::empty()).expect_err("no transport");
    assert_eq!(
        error,
        ConfigError::MissingRequiredProperty {
            key: "transport".to_owned()
        }
    );

    let listener =
        materialize::<BoundListener>(&Node::from_map([("transport", "quic")])).expect("listener");
    assert_eq!(listener.transport(), Transport::Quic);
    assert_eq!(listener.backlog(), 128);
}

#[config_interface]
pub trait Misdeclared {
    #[config(identity)]
    fn raw(&self) -> String;
}

#[test]
fn identity_getter_must_hold_a_node() {
    let error = materialize::<BoundMisdeclared>(&Node::empty()).expect_err("String is not a node");
    assert!(matches!(error, ConfigError::UnassignableIdentityType { .. }));
}

#[config_interface]
pub trait Looping {
    fn a(&self) -> u32 {
        self.b()
    }

    fn b(&self) -> u32 {
        self.a()
    }
}

#[test]
#[should_panic(expected = "depends on itself")]
fn cyclic_default_bodies_panic() {
    let _ = materialize::<BoundLooping>(&Node::empty());
}
