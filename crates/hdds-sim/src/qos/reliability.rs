// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! RELIABILITY, DURABILITY and HISTORY policies.

use std::fmt;

/// RELIABILITY policy kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Reliability {
    /// Fire and forget; samples may be lost.
    BestEffort,
    /// Lost samples are repaired by retransmission.
    #[default]
    Reliable,
}

impl fmt::Display for Reliability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reliability::BestEffort => write!(f, "BEST_EFFORT"),
            Reliability::Reliable => write!(f, "RELIABLE"),
        }
    }
}

/// DURABILITY policy kind, ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Durability {
    #[default]
    Volatile,
    TransientLocal,
    Transient,
    Persistent,
}

impl Durability {
    /// Ordinal used by the RxO rule (offered >= requested).
    pub const fn rank(self) -> u8 {
        match self {
            Durability::Volatile => 0,
            Durability::TransientLocal => 1,
            Durability::Transient => 2,
            Durability::Persistent => 3,
        }
    }

    pub const ALL: [Durability; 4] = [
        Durability::Volatile,
        Durability::TransientLocal,
        Durability::Transient,
        Durability::Persistent,
    ];
}

impl fmt::Display for Durability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Durability::Volatile => write!(f, "VOLATILE"),
            Durability::TransientLocal => write!(f, "TRANSIENT_LOCAL"),
            Durability::Transient => write!(f, "TRANSIENT"),
            Durability::Persistent => write!(f, "PERSISTENT"),
        }
    }
}

/// HISTORY policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum History {
    /// Keep the most recent `depth` samples per instance.
    KeepLast(u32),
    /// Keep every sample until delivered.
    KeepAll,
}

impl Default for History {
    fn default() -> Self {
        History::KeepLast(10)
    }
}

impl fmt::Display for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            History::KeepLast(depth) => write!(f, "KEEP_LAST({})", depth),
            History::KeepAll => write!(f, "KEEP_ALL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durability_rank_is_strictly_increasing() {
        let ranks: Vec<u8> = Durability::ALL.iter().map(|d| d.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Reliability::default(), Reliability::Reliable);
        assert_eq!(Durability::default(), Durability::Volatile);
        assert_eq!(History::default(), History::KeepLast(10));
    }
}
