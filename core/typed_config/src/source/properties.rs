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

//! Reader for `.properties` text: `key=value`, `key: value` or `key value`
//! entries, `#`/`!` comments, backslash line continuations and escapes.

pub(crate) fn parse_properties(text: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    let mut lines = text.lines();
    while let Some(line) = lines.next() {
        let mut logical = line.trim_start().to_owned();
        if logical.is_empty() || logical.starts_with('#') || logical.starts_with('!') {
            continue;
        }
        while continues(&logical) {
            logical.pop();
            match lines.next() {
                Some(next) => logical.push_str(next.trim_start()),
                None => break,
            }
        }
        entries.push(split_entry(&logical));
    }
    entries
}

fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn is_separator(c: char) -> bool {
    matches!(c, '=' | ':' | ' ' | '\t' | '\u{c}')
}

fn split_entry(line: &str) -> (String, String) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (index, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if is_separator(c) {
            key_end = index;
            break;
        }
    }

    let rest = line[key_end..].trim_start_matches([' ', '\t', '\u{c}']);
    let rest = rest
        .strip_prefix(['=', ':'])
        .unwrap_or(rest)
        .trim_start_matches([' ', '\t', '\u{c}']);
    (unescape(&line[..key_end]), unescape(rest))
}

fn unescape(raw: &str) -> String {
    let mut output = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            output.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => output.push('\t'),
            Some('n') => output.push('\n'),
            Some('r') => output.push('\r'),
            Some('f') => output.push('\u{c}'),
            Some('u') => {
                let code = chars.by_ref().take(4).collect::<String>();
                match u32::from_str_radix(&code, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => output.push(decoded),
                    None => {
                        output.push_str("\\u");
                        output.push_str(&code);
                    }
                }
            }
            Some(other) => output.push(other),
            None => {}
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(text: &str) -> Vec<(String, String)> {
        parse_properties(text)
    }

    fn pair(key: &str, value: &str) -> (String, String) {
        (key.to_owned(), value.to_owned())
    }

    #[test]
    fn reads_all_separator_styles() {
        let text = "a=1\nb: 2\nc 3\n  d = spaced value  \n";
        assert_eq!(
            pairs(text),
            vec![pair("a", "1"), pair("b", "2"), pair("c", "3"), pair("d", "spaced value  ")]
        );
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let text = "# comment\n! also comment\n\n   \nkey=value";
        assert_eq!(pairs(text), vec![pair("key", "value")]);
    }

    #[test]
    fn joins_continuation_lines() {
        let text = "list=[a, \\\n      b]\npath=c:\\\\dir";
        assert_eq!(pairs(text), vec![pair("list", "[a, b]"), pair("path", "c:\\dir")]);
    }

    #[test]
    fn decodes_escapes_in_keys_and_values() {
        let text = "my\\ key=tab\\there\nsnow=\\u2603";
        assert_eq!(pairs(text), vec![pair("my key", "tab\there"), pair("snow", "\u{2603}")]);
    }

    #[test]
    fn key_without_value_is_empty() {
        assert_eq!(pairs("flag"), vec![pair("flag", "")]);
    }
}
