// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DEADLINE and LIFESPAN policies.
//!
//! Both default to an infinite duration, which disables them.

use crate::time::SimTime;

/// DEADLINE policy: maximum interval between consecutive samples.
///
/// RxO: offered period must be <= requested period (a faster writer is fine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Deadline {
    pub period: SimTime,
}

impl Deadline {
    pub const fn new(period: SimTime) -> Self {
        Self { period }
    }

    pub const fn infinite() -> Self {
        Self {
            period: SimTime::INFINITY,
        }
    }

    pub const fn is_infinite(&self) -> bool {
        self.period.is_infinite()
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::infinite()
    }
}

/// LIFESPAN policy: how long a written sample stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lifespan {
    pub duration: SimTime,
}

impl Lifespan {
    pub const fn new(duration: SimTime) -> Self {
        Self { duration }
    }

    pub const fn infinite() -> Self {
        Self {
            duration: SimTime::INFINITY,
        }
    }

    /// True when a sample written at `written` is stale at `now`.
    pub fn is_expired(&self, written: SimTime, now: SimTime) -> bool {
        match now.checked_since(written) {
            Some(age) => age > self.duration,
            None => false,
        }
    }
}

impl Default for Lifespan {
    fn default() -> Self {
        Self::infinite()
    }
}
