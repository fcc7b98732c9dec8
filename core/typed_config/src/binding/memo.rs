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

use std::fmt::{self, Debug};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Write-once cell holding the result of a getter's default body.
///
/// The body runs at most once; later calls, including re-entrant calls from
/// other default bodies, return the stored value.
pub struct Memo<T> {
    value: OnceLock<T>,
    evaluating: AtomicBool,
}

impl<T> Memo<T> {
    pub fn pending() -> Self {
        Self {
            value: OnceLock::new(),
            evaluating: AtomicBool::new(false),
        }
    }

    pub fn ready(value: T) -> Self {
        Self {
            value: OnceLock::from(value),
            evaluating: AtomicBool::new(false),
        }
    }

    pub fn get(&self) -> Option<&T> {
        self.value.get()
    }

    /// Returns the stored value, running `evaluate` first if there is none.
    ///
    /// # Panics
    ///
    /// When `evaluate` (directly or through other getters) asks for this same
    /// member again before returning, which is a cycle between default bodies.
    pub fn get_or_eval(&self, member: &str, evaluate: impl FnOnce() -> T) -> &T {
        if let Some(value) = self.value.get() {
            return value;
        }
        if self.evaluating.swap(true, Ordering::AcqRel) {
            panic!("Default implementation of getter: {member} depends on itself.");
        }
        let value = evaluate();
        self.evaluating.store(false, Ordering::Release);
        self.value.get_or_init(|| value)
    }
}

impl<T: Debug> Debug for Memo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.get() {
            Some(value) => value.fmt(f),
            None => f.write_str("<pending>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn evaluates_at_most_once() {
        let memo = Memo::pending();
        let calls = Cell::new(0);
        for _ in 0..3 {
            let value = memo.get_or_eval("port", || {
                calls.set(calls.get() + 1);
                8080
            });
            assert_eq!(*value, 8080);
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn ready_cells_never_evaluate() {
        let memo = Memo::ready("bound".to_owned());
        let value = memo.get_or_eval("host", || unreachable!("value was bound"));
        assert_eq!(value, "bound");
    }

    #[test]
    #[should_panic(expected = "getter: url depends on itself")]
    fn reentrant_evaluation_panics() {
        let memo = Memo::<String>::pending();
        memo.get_or_eval("url", || memo.get_or_eval("url", String::new).clone());
    }
}
