// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! OWNERSHIP policy. Writer and reader kinds must match exactly.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Ownership {
    /// Every matched writer may update an instance.
    #[default]
    Shared,
    /// Only the strongest writer updates an instance.
    Exclusive,
}

impl fmt::Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ownership::Shared => write!(f, "SHARED"),
            Ownership::Exclusive => write!(f, "EXCLUSIVE"),
        }
    }
}
