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

use convert_case::{Boundary, Case, Casing};

const WORD_BOUNDARIES: [Boundary; 2] = [Boundary::Underscore, Boundary::LowerUpper];

/// Maps a member name to the key looked up in the node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Naming {
    #[default]
    AsDeclared,
    CamelCase,
    /// All lowercase with separators removed: `api_key` -> `apikey`.
    LowerCase,
    PascalCase,
    SnakeCase,
}

impl Naming {
    pub fn convert(self, member: &str) -> String {
        let words = member.with_boundaries(&WORD_BOUNDARIES);
        match self {
            Naming::AsDeclared => member.to_owned(),
            Naming::CamelCase => words.to_case(Case::Camel),
            Naming::LowerCase => words.to_case(Case::Flat),
            Naming::PascalCase => words.to_case(Case::Pascal),
            Naming::SnakeCase => words.to_case(Case::Snake),
        }
    }

    /// Converts a getter name, dropping a leading `get_` or `is_` first.
    pub fn convert_getter(self, getter: &str) -> String {
        self.convert(property_name(getter))
    }
}

pub fn property_name(getter: &str) -> &str {
    ["get_", "is_"]
        .iter()
        .find_map(|prefix| getter.strip_prefix(prefix))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(getter)
}
