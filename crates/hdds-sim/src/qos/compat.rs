// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! QoS compatibility checking (RxO - Requested vs Offered).
//!
//! Unlike a boolean matcher, [`check`] evaluates every policy and reports
//! all of the ones that failed, so a caller can explain *why* a writer and a
//! reader did not match.
//!
//! # Compatibility Rules
//!
//! | Policy      | Rule                                                       |
//! |-------------|------------------------------------------------------------|
//! | Reliability | Fails only for RELIABLE reader + BEST_EFFORT writer         |
//! | Durability  | Writer rank >= Reader rank (VOLATILE < ... < PERSISTENT)    |
//! | Deadline    | Writer period <= Reader period                             |
//! | Lifespan    | Writer duration >= Reader duration                         |
//! | Liveliness  | Writer kind rank >= Reader kind rank, writer lease <= reader lease |
//! | History     | KEEP_ALL reader needs KEEP_ALL writer; KEEP_LAST depths writer >= reader |
//! | Ownership   | Must match exactly                                         |
//! | Partition   | Both default, or at least one name/pattern in common       |
//!
//! The function is total: any two profiles produce a result.

use super::{History, QosProfile, Reliability};
use std::collections::BTreeMap;
use std::fmt;

/// Deadline margin under which a warning is raised (writer > 80% of reader).
const DEADLINE_MARGIN_NUM: u64 = 4;
const DEADLINE_MARGIN_DEN: u64 = 5;
/// KEEP_LAST depths below this trigger a warning.
const SHALLOW_HISTORY_DEPTH: u32 = 5;

/// Policy dimension named in a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PolicyKind {
    Reliability,
    Durability,
    Deadline,
    Lifespan,
    Liveliness,
    History,
    Ownership,
    Partition,
}

impl PolicyKind {
    pub const fn name(self) -> &'static str {
        match self {
            PolicyKind::Reliability => "reliability",
            PolicyKind::Durability => "durability",
            PolicyKind::Deadline => "deadline",
            PolicyKind::Lifespan => "lifespan",
            PolicyKind::Liveliness => "liveliness",
            PolicyKind::History => "history",
            PolicyKind::Ownership => "ownership",
            PolicyKind::Partition => "partition",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one compatibility check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compatibility {
    pub compatible: bool,
    /// Failed policies, in evaluation order.
    pub violations: Vec<PolicyKind>,
    /// Advisory notes; never affect `compatible`.
    pub warnings: Vec<String>,
}

impl Compatibility {
    /// Human-readable summary of the violations.
    pub fn error_message(&self) -> String {
        if self.compatible {
            return "QoS profiles are compatible".to_string();
        }
        let names: Vec<&str> = self.violations.iter().map(|v| v.name()).collect();
        format!("Incompatible QoS policies: {}", names.join(", "))
    }

    /// Violation names, e.g. for trace fields.
    pub fn violation_names(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.name().to_string()).collect()
    }
}

/// Check an offered (writer) profile against a requested (reader) profile.
pub fn check(offered: &QosProfile, requested: &QosProfile) -> Compatibility {
    let mut violations = Vec::new();

    // 1. Reliability
    if offered.reliability == Reliability::BestEffort
        && requested.reliability == Reliability::Reliable
    {
        log::debug!(
            "[MATCH-QOS] Reliability mismatch (writer={}, reader={})",
            offered.reliability,
            requested.reliability
        );
        violations.push(PolicyKind::Reliability);
    }

    // 2. Durability
    if offered.durability.rank() < requested.durability.rank() {
        log::debug!(
            "[MATCH-QOS] Durability mismatch (writer={}, reader={})",
            offered.durability,
            requested.durability
        );
        violations.push(PolicyKind::Durability);
    }

    // 3. Deadline
    if offered.deadline.period > requested.deadline.period {
        log::debug!(
            "[MATCH-QOS] Deadline mismatch (writer={}, reader={})",
            offered.deadline.period,
            requested.deadline.period
        );
        violations.push(PolicyKind::Deadline);
    }

    // 4. Lifespan
    if offered.lifespan.duration < requested.lifespan.duration {
        log::debug!(
            "[MATCH-QOS] Lifespan mismatch (writer={}, reader={})",
            offered.lifespan.duration,
            requested.lifespan.duration
        );
        violations.push(PolicyKind::Lifespan);
    }

    // 5. Liveliness
    let liveliness_ok = offered.liveliness.kind.rank() >= requested.liveliness.kind.rank()
        && offered.liveliness.lease_duration <= requested.liveliness.lease_duration;
    if !liveliness_ok {
        log::debug!(
            "[MATCH-QOS] Liveliness mismatch (writer={} lease={}, reader={} lease={})",
            offered.liveliness.kind,
            offered.liveliness.lease_duration,
            requested.liveliness.kind,
            requested.liveliness.lease_duration
        );
        violations.push(PolicyKind::Liveliness);
    }

    // 6. History
    let history_ok = match (requested.history, offered.history) {
        (History::KeepLast(r_depth), History::KeepLast(w_depth)) => w_depth >= r_depth,
        (History::KeepLast(_), History::KeepAll) => true,
        (History::KeepAll, History::KeepAll) => true,
        (History::KeepAll, History::KeepLast(_)) => false,
    };
    if !history_ok {
        log::debug!(
            "[MATCH-QOS] History mismatch (writer={}, reader={})",
            offered.history,
            requested.history
        );
        violations.push(PolicyKind::History);
    }

    // 7. Ownership
    if offered.ownership != requested.ownership {
        log::debug!(
            "[MATCH-QOS] Ownership mismatch (writer={}, reader={})",
            offered.ownership,
            requested.ownership
        );
        violations.push(PolicyKind::Ownership);
    }

    // 8. Partition
    if !offered.partition.is_compatible_with(&requested.partition) {
        log::debug!(
            "[MATCH-QOS] Partition mismatch (writer={:?}, reader={:?})",
            offered.partition.names,
            requested.partition.names
        );
        violations.push(PolicyKind::Partition);
    }

    Compatibility {
        compatible: violations.is_empty(),
        violations,
        warnings: warnings(offered, requested),
    }
}

/// Non-blocking advisories about a pair of profiles.
fn warnings(offered: &QosProfile, requested: &QosProfile) -> Vec<String> {
    let mut out = Vec::new();

    let offered_deadline = offered.deadline.period;
    let requested_deadline = requested.deadline.period;
    if offered_deadline.is_finite()
        && requested_deadline.is_finite()
        && offered_deadline.as_nanos().saturating_mul(DEADLINE_MARGIN_DEN)
            > requested_deadline
                .as_nanos()
                .saturating_mul(DEADLINE_MARGIN_NUM)
    {
        out.push(format!(
            "writer deadline ({}) is close to reader deadline ({}), may cause violations",
            offered_deadline, requested_deadline
        ));
    }

    if let History::KeepLast(depth) = offered.history {
        if depth < SHALLOW_HISTORY_DEPTH {
            out.push(format!(
                "writer history depth ({}) is very small, may lose samples under load",
                depth
            ));
        }
    }

    if offered.deadline.period.is_finite()
        && offered.lifespan.duration < offered.deadline.period.saturating_mul(2)
    {
        out.push(
            "sample lifespan is less than 2x deadline, samples may expire before deadline misses are detected"
                .to_string(),
        );
    }

    out
}

/// Pairwise compatibility of every writer against every reader.
///
/// Keys are `(writer_index, reader_index)`.
pub fn check_matrix(
    writers: &[QosProfile],
    readers: &[QosProfile],
) -> BTreeMap<(usize, usize), Compatibility> {
    let mut results = BTreeMap::new();
    for (w, offered) in writers.iter().enumerate() {
        for (r, requested) in readers.iter().enumerate() {
            results.insert((w, r), check(offered, requested));
        }
    }
    results
}
