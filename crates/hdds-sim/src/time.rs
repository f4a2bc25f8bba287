// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Virtual simulation time.
//!
//! Time is kept as integer nanoseconds so that periodic schedules started
//! together stay tied forever (no float drift) and replays are bit-exact.
//! `u64::MAX` is reserved as the "never" sentinel and absorbs additions.
//!
//! The same type is used for instants and for spans (time advances, leases,
//! latencies); the kernel only ever adds spans to instants.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

const NANOS_PER_SEC: u64 = 1_000_000_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_MICRO: u64 = 1_000;

/// Point or span on the virtual time line, in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimTime(u64);

impl SimTime {
    /// Time zero (simulation start).
    pub const ZERO: SimTime = SimTime(0);
    /// "Never": a passive model's time advance.
    pub const INFINITY: SimTime = SimTime(u64::MAX);

    pub const fn from_nanos(nanos: u64) -> Self {
        SimTime(nanos)
    }

    pub const fn from_micros(micros: u64) -> Self {
        SimTime(micros.saturating_mul(NANOS_PER_MICRO))
    }

    pub const fn from_millis(millis: u64) -> Self {
        SimTime(millis.saturating_mul(NANOS_PER_MILLI))
    }

    pub const fn from_secs(secs: u64) -> Self {
        SimTime(secs.saturating_mul(NANOS_PER_SEC))
    }

    /// Convert from floating seconds, rejecting negative and NaN values.
    ///
    /// `f64::INFINITY` maps to [`SimTime::INFINITY`].
    pub fn try_from_secs_f64(secs: f64) -> Option<Self> {
        if secs.is_nan() || secs < 0.0 {
            return None;
        }
        if secs.is_infinite() {
            return Some(SimTime::INFINITY);
        }
        let nanos = (secs * NANOS_PER_SEC as f64).round();
        if nanos >= u64::MAX as f64 {
            Some(SimTime::INFINITY)
        } else {
            Some(SimTime(nanos as u64))
        }
    }

    /// Saturating conversion from floating seconds (negative/NaN -> zero).
    pub fn from_secs_f64(secs: f64) -> Self {
        SimTime::try_from_secs_f64(secs).unwrap_or(SimTime::ZERO)
    }

    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    pub fn as_secs_f64(self) -> f64 {
        if self.is_infinite() {
            f64::INFINITY
        } else {
            self.0 as f64 / NANOS_PER_SEC as f64
        }
    }

    pub const fn is_infinite(self) -> bool {
        self.0 == u64::MAX
    }

    pub const fn is_finite(self) -> bool {
        self.0 != u64::MAX
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Span multiplied by an integer factor, saturating to `INFINITY`.
    pub const fn saturating_mul(self, factor: u64) -> Self {
        if self.is_infinite() {
            return SimTime::INFINITY;
        }
        SimTime(self.0.saturating_mul(factor))
    }

    /// `self - earlier`, or `None` if `earlier` is later than `self`.
    pub fn checked_since(self, earlier: SimTime) -> Option<SimTime> {
        if self.is_infinite() {
            return Some(SimTime::INFINITY);
        }
        self.0.checked_sub(earlier.0).map(SimTime)
    }
}

impl Add for SimTime {
    type Output = SimTime;

    /// Saturating; anything plus `INFINITY` is `INFINITY`.
    fn add(self, rhs: SimTime) -> SimTime {
        SimTime(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for SimTime {
    fn add_assign(&mut self, rhs: SimTime) {
        *self = *self + rhs;
    }
}

impl Sub for SimTime {
    type Output = SimTime;

    /// Saturating at zero. `INFINITY - t` stays `INFINITY`.
    fn sub(self, rhs: SimTime) -> SimTime {
        if self.is_infinite() {
            return SimTime::INFINITY;
        }
        SimTime(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinite() {
            write!(f, "inf")
        } else {
            write!(f, "{:.6}s", self.as_secs_f64())
        }
    }
}

impl Serialize for SimTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_secs_f64())
    }
}

impl<'de> Deserialize<'de> for SimTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        SimTime::try_from_secs_f64(secs).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid duration {} (must be >= 0 seconds)", secs))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infinity_absorbs_addition() {
        assert_eq!(SimTime::INFINITY + SimTime::from_secs(1), SimTime::INFINITY);
        assert_eq!(SimTime::from_secs(1) + SimTime::INFINITY, SimTime::INFINITY);
        assert_eq!(SimTime::INFINITY - SimTime::from_secs(1), SimTime::INFINITY);
    }

    #[test]
    fn test_periodic_sums_tie_exactly() {
        let period = SimTime::from_secs_f64(0.1);
        let mut t = SimTime::ZERO;
        for _ in 0..10 {
            t += period;
        }
        assert_eq!(t, SimTime::from_secs(1));
    }

    #[test]
    fn test_float_conversion_rejects_negative_and_nan() {
        assert_eq!(SimTime::try_from_secs_f64(-0.5), None);
        assert_eq!(SimTime::try_from_secs_f64(f64::NAN), None);
        assert_eq!(
            SimTime::try_from_secs_f64(f64::INFINITY),
            Some(SimTime::INFINITY)
        );
        assert_eq!(SimTime::from_secs_f64(0.25), SimTime::from_millis(250));
    }

    #[test]
    fn test_checked_since() {
        let a = SimTime::from_millis(300);
        let b = SimTime::from_millis(100);
        assert_eq!(a.checked_since(b), Some(SimTime::from_millis(200)));
        assert_eq!(b.checked_since(a), None);
        assert_eq!(b - a, SimTime::ZERO);
    }

    #[test]
    fn test_display() {
        assert_eq!(SimTime::from_millis(1500).to_string(), "1.500000s");
        assert_eq!(SimTime::INFINITY.to_string(), "inf");
    }
}
