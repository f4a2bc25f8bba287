// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! LIVELINESS policy.

use crate::time::SimTime;
use std::fmt;

/// How a writer asserts it is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LivelinessKind {
    /// Infrastructure asserts liveliness (participant heartbeats).
    #[default]
    Automatic,
    /// Application asserts per writer/topic.
    ManualByTopic,
    /// Application asserts per participant.
    ManualByParticipant,
}

impl LivelinessKind {
    /// Ordinal used by the RxO rule (offered >= requested).
    pub const fn rank(self) -> u8 {
        match self {
            LivelinessKind::Automatic => 0,
            LivelinessKind::ManualByTopic => 1,
            LivelinessKind::ManualByParticipant => 2,
        }
    }
}

impl fmt::Display for LivelinessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LivelinessKind::Automatic => write!(f, "AUTOMATIC"),
            LivelinessKind::ManualByTopic => write!(f, "MANUAL_BY_TOPIC"),
            LivelinessKind::ManualByParticipant => write!(f, "MANUAL_BY_PARTICIPANT"),
        }
    }
}

/// LIVELINESS policy: kind plus lease duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Liveliness {
    pub kind: LivelinessKind,
    pub lease_duration: SimTime,
}

impl Liveliness {
    #[must_use]
    pub const fn automatic(lease_duration: SimTime) -> Self {
        Self {
            kind: LivelinessKind::Automatic,
            lease_duration,
        }
    }

    #[must_use]
    pub const fn manual_by_topic(lease_duration: SimTime) -> Self {
        Self {
            kind: LivelinessKind::ManualByTopic,
            lease_duration,
        }
    }

    #[must_use]
    pub const fn manual_by_participant(lease_duration: SimTime) -> Self {
        Self {
            kind: LivelinessKind::ManualByParticipant,
            lease_duration,
        }
    }

    /// AUTOMATIC with an infinite lease.
    #[must_use]
    pub const fn infinite() -> Self {
        Self::automatic(SimTime::INFINITY)
    }
}

impl Default for Liveliness {
    fn default() -> Self {
        Self::infinite()
    }
}
