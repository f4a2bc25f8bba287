// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Symmetric writer/reader match table.
//!
//! `w` is in `matched(r)` iff `r` is in `matched(w)`. Insertion is
//! idempotent and removing an endpoint clears it from every peer's set.

use super::guid::Guid;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchTable {
    matches: BTreeMap<Guid, BTreeSet<Guid>>,
}

impl MatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a match in both directions. Returns `true` if the pair is new.
    pub fn insert(&mut self, writer: Guid, reader: Guid) -> bool {
        let added = self.matches.entry(writer).or_default().insert(reader);
        self.matches.entry(reader).or_default().insert(writer);
        added
    }

    /// Remove a single pair. Returns `true` if it existed.
    pub fn remove_pair(&mut self, a: &Guid, b: &Guid) -> bool {
        let existed = self.detach(a, b);
        self.detach(b, a);
        existed
    }

    /// Remove an endpoint and every pair it takes part in.
    ///
    /// Returns the peers it was matched with.
    pub fn remove_endpoint(&mut self, guid: &Guid) -> Vec<Guid> {
        let Some(peers) = self.matches.remove(guid) else {
            return Vec::new();
        };
        for peer in &peers {
            self.detach(peer, guid);
        }
        peers.into_iter().collect()
    }

    /// Endpoints matched with `guid`, in GUID order.
    pub fn matched(&self, guid: &Guid) -> Vec<Guid> {
        self.matches
            .get(guid)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_matched(&self, a: &Guid, b: &Guid) -> bool {
        self.matches.get(a).is_some_and(|set| set.contains(b))
    }

    pub fn match_count(&self, guid: &Guid) -> usize {
        self.matches.get(guid).map_or(0, BTreeSet::len)
    }

    /// Number of distinct pairs.
    pub fn pair_count(&self) -> usize {
        self.matches.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Every `(a, b)` entry has its mirror `(b, a)`.
    pub fn is_symmetric(&self) -> bool {
        self.matches
            .iter()
            .all(|(a, peers)| peers.iter().all(|b| self.is_matched(b, a)))
    }

    fn detach(&mut self, owner: &Guid, peer: &Guid) -> bool {
        let Some(set) = self.matches.get_mut(owner) else {
            return false;
        };
        let removed = set.remove(peer);
        if set.is_empty() {
            self.matches.remove(owner);
        }
        removed
    }
}
