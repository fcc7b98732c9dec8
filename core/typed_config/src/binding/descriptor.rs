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

//! Member declarations and their classification into binding kinds.

use crate::error::{ConfigError, Result};
use crate::naming::Naming;
use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Required,
    OptionalWithDefault,
    OptionalWithFallbackNode,
    OptionalZeroValue,
    Computed,
    Identity,
    ParentRef,
    Ignored,
}

impl BindingKind {
    /// Kinds that take their value from the node under the logical name.
    pub fn reads_node(self) -> bool {
        matches!(
            self,
            BindingKind::Required
                | BindingKind::OptionalWithDefault
                | BindingKind::OptionalWithFallbackNode
                | BindingKind::OptionalZeroValue
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Ignore,
    Identity,
    Parent,
    Computed,
}

impl Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Marker::Ignore => "ignore",
            Marker::Identity => "identity",
            Marker::Parent => "parent",
            Marker::Computed => "computed",
        })
    }
}

/// How a field-style member says it wants to be bound when its key is absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Contract {
    Required,
    Default,
    Fallback,
    #[default]
    Zero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberShape {
    Field {
        mutable: bool,
        contract: Contract,
    },
    Getter {
        has_default_body: bool,
        takes_arguments: bool,
    },
}

/// Declaration of one member of a config type, written by the derive macros
/// or by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: &'static str,
    pub rename: Option<&'static str>,
    pub declared_type: &'static str,
    pub markers: Vec<Marker>,
    pub shape: MemberShape,
}

impl Member {
    pub fn field<T: ?Sized>(name: &'static str) -> Self {
        Self::new(
            name,
            std::any::type_name::<T>(),
            MemberShape::Field {
                mutable: false,
                contract: Contract::Zero,
            },
        )
    }

    pub fn getter<T: ?Sized>(name: &'static str) -> Self {
        Self::new(
            name,
            std::any::type_name::<T>(),
            MemberShape::Getter {
                has_default_body: false,
                takes_arguments: false,
            },
        )
    }

    pub fn new(name: &'static str, declared_type: &'static str, shape: MemberShape) -> Self {
        Self {
            name,
            rename: None,
            declared_type,
            markers: Vec::new(),
            shape,
        }
    }

    pub fn rename(mut self, name: &'static str) -> Self {
        self.rename = Some(name);
        self
    }

    pub fn marked(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn ignored(self) -> Self {
        self.marked(Marker::Ignore)
    }

    pub fn identity(self) -> Self {
        self.marked(Marker::Identity)
    }

    pub fn parent(self) -> Self {
        self.marked(Marker::Parent)
    }

    pub fn computed(self) -> Self {
        self.marked(Marker::Computed)
    }

    pub fn required(self) -> Self {
        self.contract(Contract::Required)
    }

    pub fn with_default(self) -> Self {
        self.contract(Contract::Default)
    }

    pub fn with_fallback(self) -> Self {
        self.contract(Contract::Fallback)
    }

    fn contract(mut self, contract: Contract) -> Self {
        if let MemberShape::Field { contract: current, .. } = &mut self.shape {
            *current = contract;
        }
        self
    }

    pub fn mutable(mut self) -> Self {
        if let MemberShape::Field { mutable, .. } = &mut self.shape {
            *mutable = true;
        }
        self
    }

    pub fn default_body(mut self) -> Self {
        if let MemberShape::Getter {
            has_default_body, ..
        } = &mut self.shape
        {
            *has_default_body = true;
        }
        self
    }

    pub fn arguments(mut self) -> Self {
        if let MemberShape::Getter {
            takes_arguments, ..
        } = &mut self.shape
        {
            *takes_arguments = true;
        }
        self
    }
}

/// Per-type settings declared on the target with `#[config(...)]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    pub naming: Naming,
    pub allow_mutable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingStyle {
    Fields,
    Getters,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingDescriptor {
    pub member: &'static str,
    pub logical_name: String,
    pub declared_type: &'static str,
    pub kind: BindingKind,
}

/// Classifies every declared member of `type_name`.
///
/// Getters that take arguments and have a default body are not properties
/// and do not appear in the result. Ignored members do, so callers can tell
/// them apart from undeclared ones.
pub fn classify(
    type_name: &str,
    style: BindingStyle,
    settings: Settings,
    members: &[Member],
) -> Result<Vec<BindingDescriptor>> {
    let mut descriptors = Vec::with_capacity(members.len());
    for member in members {
        if let Some(kind) = classify_member(type_name, style, settings, member)? {
            let logical_name = match (member.rename, member.shape) {
                (Some(rename), _) => rename.to_owned(),
                (None, MemberShape::Getter { .. }) => settings.naming.convert_getter(member.name),
                (None, MemberShape::Field { .. }) => settings.naming.convert(member.name),
            };
            descriptors.push(BindingDescriptor {
                member: member.name,
                logical_name,
                declared_type: member.declared_type,
                kind,
            });
        }
    }
    Ok(descriptors)
}

fn classify_member(
    type_name: &str,
    style: BindingStyle,
    settings: Settings,
    member: &Member,
) -> Result<Option<BindingKind>> {
    let invalid = |reason: String| ConfigError::InvalidAnnotationUsage {
        type_name: type_name.to_owned(),
        member: member.name.to_owned(),
        reason,
    };

    let marker = match member.markers.as_slice() {
        [] => None,
        [marker] => Some(*marker),
        markers => {
            let names = markers
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(invalid(format!(
                "carries more than one binding marker: {names}"
            )));
        }
    };

    if let MemberShape::Field { mutable: true, .. } = member.shape
        && marker != Some(Marker::Ignore)
        && !settings.allow_mutable
    {
        return Err(ConfigError::MutableField {
            type_name: type_name.to_owned(),
            member: member.name.to_owned(),
            declared_type: member.declared_type.to_owned(),
        });
    }

    let (has_default_body, takes_arguments) = match member.shape {
        MemberShape::Getter {
            has_default_body,
            takes_arguments,
        } => (has_default_body, takes_arguments),
        MemberShape::Field { .. } => (false, false),
    };
    let is_getter = matches!(member.shape, MemberShape::Getter { .. });

    let kind = match marker {
        Some(Marker::Ignore) => {
            if is_getter && !has_default_body {
                return Err(invalid(
                    "is marked as ignored but does not have a default implementation".to_owned(),
                ));
            }
            BindingKind::Ignored
        }
        Some(marker) if takes_arguments => {
            return Err(invalid(format!("is marked as {marker} but is not a getter")));
        }
        Some(Marker::Identity) => BindingKind::Identity,
        Some(Marker::Parent) => BindingKind::ParentRef,
        Some(Marker::Computed) => {
            if style == BindingStyle::Fields || !is_getter {
                return Err(invalid(
                    "is marked as computed, which only applies to getter-style configs".to_owned(),
                ));
            }
            if !has_default_body {
                return Err(invalid(
                    "is marked as computed but does not have a default implementation".to_owned(),
                ));
            }
            BindingKind::Computed
        }
        None if takes_arguments => {
            if has_default_body {
                return Ok(None);
            }
            return Err(invalid(
                "is not a getter and there is no default implementation".to_owned(),
            ));
        }
        None => match member.shape {
            MemberShape::Field { contract, .. } => match contract {
                Contract::Required => BindingKind::Required,
                Contract::Default => BindingKind::OptionalWithDefault,
                Contract::Fallback => BindingKind::OptionalWithFallbackNode,
                Contract::Zero => BindingKind::OptionalZeroValue,
            },
            MemberShape::Getter { .. } if has_default_body => BindingKind::OptionalWithDefault,
            MemberShape::Getter { .. } => BindingKind::OptionalZeroValue,
        },
    };
    Ok(Some(kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_getters(members: &[Member]) -> Result<Vec<BindingDescriptor>> {
        classify("Server", BindingStyle::Getters, Settings::default(), members)
    }

    fn kinds(descriptors: &[BindingDescriptor]) -> Vec<(&str, BindingKind)> {
        descriptors
            .iter()
            .map(|descriptor| (descriptor.member, descriptor.kind))
            .collect()
    }

    #[test]
    fn classifies_getters_by_marker_and_body() {
        let descriptors = classify_getters(&[
            Member::getter::<String>("host"),
            Member::getter::<u16>("port").default_body(),
            Member::getter::<String>("url").computed().default_body(),
            Member::getter::<crate::Node>("node").identity(),
            Member::getter::<u8>("helper").arguments().default_body(),
            Member::getter::<u8>("cache").ignored().default_body(),
        ])
        .expect("valid declarations");

        assert_eq!(
            kinds(&descriptors),
            vec![
                ("host", BindingKind::OptionalZeroValue),
                ("port", BindingKind::OptionalWithDefault),
                ("url", BindingKind::Computed),
                ("node", BindingKind::Identity),
                ("cache", BindingKind::Ignored),
            ]
        );
    }

    #[test]
    fn field_contracts_map_to_kinds() {
        let descriptors = classify(
            "Db",
            BindingStyle::Fields,
            Settings::default(),
            &[
                Member::field::<String>("url").required(),
                Member::field::<u32>("pool").with_default(),
                Member::field::<u32>("timeout"),
                Member::field::<u32>("tls").with_fallback(),
            ],
        )
        .expect("valid declarations");
        assert_eq!(
            kinds(&descriptors),
            vec![
                ("url", BindingKind::Required),
                ("pool", BindingKind::OptionalWithDefault),
                ("timeout", BindingKind::OptionalZeroValue),
                ("tls", BindingKind::OptionalWithFallbackNode),
            ]
        );
    }

    #[test]
    fn logical_names_use_rename_then_naming() {
        let settings = Settings {
            naming: Naming::CamelCase,
            allow_mutable: false,
        };
        let descriptors = classify(
            "Server",
            BindingStyle::Getters,
            settings,
            &[
                Member::getter::<String>("get_api_key"),
                Member::getter::<String>("host").rename("http.host"),
            ],
        )
        .expect("valid declarations");
        assert_eq!(descriptors[0].logical_name, "apiKey");
        assert_eq!(descriptors[1].logical_name, "http.host");
    }

    #[test]
    fn computed_without_body_is_rejected() {
        let error = classify_getters(&[Member::getter::<String>("url").computed()])
            .expect_err("computed needs a body");
        assert_eq!(
            error,
            ConfigError::InvalidAnnotationUsage {
                type_name: "Server".into(),
                member: "url".into(),
                reason: "is marked as computed but does not have a default implementation".into(),
            }
        );
    }

    #[test]
    fn non_getter_without_body_is_rejected() {
        let error = classify_getters(&[Member::getter::<u8>("lookup").arguments()])
            .expect_err("needs a body");
        assert!(matches!(error, ConfigError::InvalidAnnotationUsage { member, .. } if member == "lookup"));
    }

    #[test]
    fn two_markers_are_rejected() {
        let error = classify_getters(&[Member::getter::<u8>("x").identity().parent()])
            .expect_err("one marker only");
        assert!(error.to_string().contains("more than one binding marker: identity, parent"));
    }

    #[test]
    fn mutable_fields_need_opt_in() {
        let members = [Member::field::<std::cell::Cell<u8>>("hits").mutable()];
        let error = classify("Stats", BindingStyle::Fields, Settings::default(), &members)
            .expect_err("mutable field");
        assert!(matches!(error, ConfigError::MutableField { .. }));

        let relaxed = Settings {
            allow_mutable: true,
            ..Settings::default()
        };
        assert!(classify("Stats", BindingStyle::Fields, relaxed, &members).is_ok());
    }
}
