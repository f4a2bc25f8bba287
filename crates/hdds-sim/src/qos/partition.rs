// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! PARTITION policy with `*` wildcards.
//!
//! Writers and readers communicate only if their partition sets intersect.
//!
//! - Writer `[]`, Reader `[]` -> compatible (both in the default partition)
//! - Writer `["robot1"]`, Reader `["robot*"]` -> compatible
//! - Writer `["robot*"]`, Reader `["robot*"]` -> compatible (identical patterns)
//! - Writer `["robot*"]`, Reader `["*"]` -> incompatible (two patterns never glob each other)
//!
//! An empty set stands for the default partition `""`, so `[]` also matches
//! a `"*"` pattern on the other side.

const WILDCARD: char = '*';

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Partition {
    /// Partition names or patterns. Empty means the default partition.
    pub names: Vec<String>,
}

impl Partition {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn single(name: &str) -> Self {
        Self {
            names: vec![name.to_string()],
        }
    }

    pub fn is_default(&self) -> bool {
        self.names.is_empty()
    }

    /// RxO check: at least one offered name matches one requested name.
    pub fn is_compatible_with(&self, requested: &Partition) -> bool {
        if self.is_default() && requested.is_default() {
            return true;
        }
        let offered = effective_names(&self.names);
        let requested = effective_names(&requested.names);
        offered
            .iter()
            .any(|o| requested.iter().any(|r| names_match(o, r)))
    }
}

fn effective_names(names: &[String]) -> Vec<&str> {
    if names.is_empty() {
        vec![""]
    } else {
        names.iter().map(String::as_str).collect()
    }
}

fn names_match(a: &str, b: &str) -> bool {
    match (a.contains(WILDCARD), b.contains(WILDCARD)) {
        (true, false) => glob_match(a, b),
        (false, true) => glob_match(b, a),
        _ => a == b,
    }
}

/// Match `name` against `pattern`, where `*` matches any run of characters.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    let mut parts = pattern.split(WILDCARD);
    let head = parts.next().unwrap_or("");
    let Some(mut rest) = name.strip_prefix(head) else {
        return false;
    };

    let middle: Vec<&str> = parts.collect();
    let Some((tail, middle)) = middle.split_last() else {
        // No wildcard at all.
        return rest.is_empty();
    };

    for segment in middle {
        match rest.find(segment) {
            Some(idx) => rest = &rest[idx + segment.len()..],
            None => return false,
        }
    }
    rest.ends_with(tail)
}
