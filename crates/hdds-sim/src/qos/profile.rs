// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! QoS profile: the policy set attached to every writer and reader.
//!
//! Presets mirror the well-known ROS 2 profiles (`sensor_data`,
//! `parameters`, `services`, ...). Fluent setters take `self` by value so
//! profiles read like `QosProfile::reliable().transient_local().keep_last(1)`.

use super::{
    Deadline, Durability, History, Lifespan, Liveliness, Ownership, Partition, Reliability,
};
use crate::error::{Error, Result};
use crate::time::SimTime;

/// Aggregated QoS policies for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QosProfile {
    pub reliability: Reliability,
    pub durability: Durability,
    pub history: History,
    pub deadline: Deadline,
    pub lifespan: Lifespan,
    pub liveliness: Liveliness,
    pub ownership: Ownership,
    pub partition: Partition,
}

impl Default for QosProfile {
    fn default() -> Self {
        Self::system_default()
    }
}

impl QosProfile {
    /// RELIABLE, VOLATILE, KEEP_LAST(10), no deadline/lifespan.
    pub fn reliable() -> Self {
        Self {
            reliability: Reliability::Reliable,
            durability: Durability::Volatile,
            history: History::KeepLast(10),
            deadline: Deadline::infinite(),
            lifespan: Lifespan::infinite(),
            liveliness: Liveliness::infinite(),
            ownership: Ownership::Shared,
            partition: Partition::default(),
        }
    }

    /// BEST_EFFORT, VOLATILE, KEEP_LAST(10).
    pub fn best_effort() -> Self {
        Self {
            reliability: Reliability::BestEffort,
            ..Self::reliable()
        }
    }

    // ------------------------------------------------------------------
    // Presets
    // ------------------------------------------------------------------

    /// High-rate sensor streams: lossy, shallow, 100 ms deadline.
    pub fn sensor_data() -> Self {
        Self {
            reliability: Reliability::BestEffort,
            durability: Durability::Volatile,
            history: History::KeepLast(5),
            deadline: Deadline::new(SimTime::from_millis(100)),
            lifespan: Lifespan::new(SimTime::from_millis(500)),
            liveliness: Liveliness::automatic(SimTime::from_secs(1)),
            ownership: Ownership::Shared,
            partition: Partition::default(),
        }
    }

    pub fn parameters() -> Self {
        Self {
            durability: Durability::TransientLocal,
            history: History::KeepLast(1000),
            ..Self::reliable()
        }
    }

    pub fn services() -> Self {
        Self::reliable()
    }

    pub fn parameter_events() -> Self {
        Self {
            history: History::KeepAll,
            ..Self::reliable()
        }
    }

    /// Log output: late joiners get the backlog, samples live 10 s.
    pub fn rosout() -> Self {
        Self {
            durability: Durability::TransientLocal,
            history: History::KeepLast(1000),
            lifespan: Lifespan::new(SimTime::from_secs(10)),
            ..Self::reliable()
        }
    }

    pub fn clock() -> Self {
        Self {
            history: History::KeepLast(1),
            ..Self::best_effort()
        }
    }

    pub fn system_default() -> Self {
        Self::reliable()
    }

    /// Latched status (last value kept for late joiners).
    pub fn action_status() -> Self {
        Self {
            durability: Durability::TransientLocal,
            history: History::KeepLast(1),
            ..Self::reliable()
        }
    }

    /// Large latched maps.
    pub fn map() -> Self {
        Self::action_status()
    }

    /// Look a preset up by name.
    pub fn preset(name: &str) -> Option<Self> {
        let profile = match name {
            "sensor_data" => Self::sensor_data(),
            "parameters" => Self::parameters(),
            "services" => Self::services(),
            "parameter_events" => Self::parameter_events(),
            "rosout" => Self::rosout(),
            "clock" => Self::clock(),
            "system_default" | "default" => Self::system_default(),
            "action_status" => Self::action_status(),
            "map" => Self::map(),
            _ => return None,
        };
        Some(profile)
    }

    // ------------------------------------------------------------------
    // Fluent setters
    // ------------------------------------------------------------------

    pub fn with_reliability(mut self, reliability: Reliability) -> Self {
        self.reliability = reliability;
        self
    }

    pub fn with_durability(mut self, durability: Durability) -> Self {
        self.durability = durability;
        self
    }

    pub fn volatile(self) -> Self {
        self.with_durability(Durability::Volatile)
    }

    pub fn transient_local(self) -> Self {
        self.with_durability(Durability::TransientLocal)
    }

    pub fn keep_last(mut self, depth: u32) -> Self {
        self.history = History::KeepLast(depth);
        self
    }

    pub fn keep_all(mut self) -> Self {
        self.history = History::KeepAll;
        self
    }

    pub fn with_deadline(mut self, period: SimTime) -> Self {
        self.deadline = Deadline::new(period);
        self
    }

    pub fn with_lifespan(mut self, duration: SimTime) -> Self {
        self.lifespan = Lifespan::new(duration);
        self
    }

    pub fn with_liveliness(mut self, liveliness: Liveliness) -> Self {
        self.liveliness = liveliness;
        self
    }

    pub fn with_ownership(mut self, ownership: Ownership) -> Self {
        self.ownership = ownership;
        self
    }

    pub fn with_partition(mut self, partition: Partition) -> Self {
        self.partition = partition;
        self
    }

    /// Reject malformed profiles.
    ///
    /// KEEP_LAST depth must be at least 1; deadline, lifespan and liveliness
    /// lease must be strictly positive (infinite is fine).
    pub fn validate(&self) -> Result<()> {
        if self.history == History::KeepLast(0) {
            return Err(Error::InvalidQos(
                "KEEP_LAST history depth must be > 0".to_string(),
            ));
        }
        if self.deadline.period.is_zero() {
            return Err(Error::InvalidQos("deadline period must be > 0".to_string()));
        }
        if self.lifespan.duration.is_zero() {
            return Err(Error::InvalidQos(
                "lifespan duration must be > 0".to_string(),
            ));
        }
        if self.liveliness.lease_duration.is_zero() {
            return Err(Error::InvalidQos(
                "liveliness lease duration must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for name in [
            "sensor_data",
            "parameters",
            "services",
            "parameter_events",
            "rosout",
            "clock",
            "system_default",
            "action_status",
            "map",
        ] {
            let profile = QosProfile::preset(name).expect("preset exists");
            assert!(profile.validate().is_ok(), "preset {} invalid", name);
        }
        assert!(QosProfile::preset("nope").is_none());
    }

    #[test]
    fn test_keep_last_zero_rejected() {
        let err = QosProfile::reliable().keep_last(0).validate();
        assert!(matches!(err, Err(Error::InvalidQos(_))));
    }

    #[test]
    fn test_zero_deadline_rejected() {
        let err = QosProfile::reliable()
            .with_deadline(SimTime::ZERO)
            .validate();
        assert!(matches!(err, Err(Error::InvalidQos(_))));
    }

    #[test]
    fn test_builder_chain() {
        let qos = QosProfile::best_effort()
            .transient_local()
            .keep_last(3)
            .with_partition(Partition::single("robot1"));
        assert_eq!(qos.reliability, Reliability::BestEffort);
        assert_eq!(qos.durability, Durability::TransientLocal);
        assert_eq!(qos.history, History::KeepLast(3));
        assert_eq!(qos.partition.names, vec!["robot1".to_string()]);
    }

    #[test]
    fn test_sensor_data_preset() {
        let qos = QosProfile::sensor_data();
        assert_eq!(qos.reliability, Reliability::BestEffort);
        assert_eq!(qos.history, History::KeepLast(5));
        assert_eq!(qos.deadline.period, SimTime::from_millis(100));
    }
}
