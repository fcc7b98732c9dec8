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

//! `${key}` substitution within a single string.

const OPEN: &str = "${";
const ESCAPED_OPEN: &str = "$${";
const CLOSE: char = '}';
const DEFAULT_SEPARATOR: &str = ":-";

/// Replaces every `${key}` token in `input` with `lookup(key)`.
///
/// `${key:-fallback}` uses `fallback` when the lookup misses, `$${` yields a
/// literal `${`, and tokens that cannot be resolved are left verbatim.
pub fn substitute(input: &str, mut lookup: impl FnMut(&str) -> Option<String>) -> String {
    if !input.contains(OPEN) {
        return input.to_owned();
    }

    let mut output = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find('$') {
        output.push_str(&rest[..start]);
        let candidate = &rest[start..];

        if let Some(after) = candidate.strip_prefix(ESCAPED_OPEN) {
            output.push_str(OPEN);
            rest = after;
            continue;
        }

        let Some(body) = candidate.strip_prefix(OPEN) else {
            output.push('$');
            rest = &candidate[1..];
            continue;
        };

        let Some(end) = body.find(CLOSE) else {
            output.push_str(candidate);
            return output;
        };

        let token = &body[..end];
        let (key, fallback) = match token.split_once(DEFAULT_SEPARATOR) {
            Some((key, fallback)) => (key, Some(fallback)),
            None => (token, None),
        };
        match lookup(key).or_else(|| fallback.map(str::to_owned)) {
            Some(value) => output.push_str(&value),
            None => {
                output.push_str(OPEN);
                output.push_str(token);
                output.push(CLOSE);
            }
        }
        rest = &body[end + 1..];
    }
    output.push_str(rest);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn lookup(key: &str) -> Option<String> {
        match key {
            "base" => Some("x".to_owned()),
            "port" => Some("8080".to_owned()),
            _ => None,
        }
    }

    #[test_case("${base}/y", "x/y" ; "single token")]
    #[test_case("http://${base}:${port}", "http://x:8080" ; "several tokens")]
    #[test_case("plain", "plain" ; "no tokens")]
    #[test_case("${missing}", "${missing}" ; "unknown token left verbatim")]
    #[test_case("${missing:-dflt}", "dflt" ; "fallback used on miss")]
    #[test_case("${base:-dflt}", "x" ; "fallback ignored on hit")]
    #[test_case("$${base}", "${base}" ; "escaped token")]
    #[test_case("cost: $5 ${base}", "cost: $5 x" ; "lone dollar")]
    #[test_case("${base", "${base" ; "unterminated token")]
    fn substitutes_tokens(input: &str, expected: &str) {
        assert_eq!(substitute(input, lookup), expected);
    }
}
