// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Simulation configuration.
//!
//! Single source of truth for every tunable of a run: kernel seed and
//! budgets, discovery timing, per-class transport behavior and tracing.
//! A `Simulator` takes its own copy at construction, so configuration
//! cannot change mid-run.
//!
//! # Example YAML
//!
//! ```yaml
//! kernel:
//!   seed: 7
//!   end_time: 5.0
//! discovery:
//!   discovery_period: 0.1
//!   lease_duration: 1.0
//! transport:
//!   enable_shared_memory: true
//!   classes:
//!     best_effort:
//!       latency: { min_latency: 0.0002 }
//!       loss: { kind: bernoulli, probability: 0.01 }
//! ```
//!
//! Durations are written in seconds; `.inf` means "never".

use crate::error::{Error, Result};
use crate::time::SimTime;
use crate::trace::TraceConfig;
use crate::transport::{Jitter, LatencyModel, LossModel, TransportClass};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Defaults
// ============================================================================

/// Default period between discovery announcements (100 ms).
pub const DEFAULT_DISCOVERY_PERIOD: SimTime = SimTime::from_millis(100);

/// Default heartbeat period (100 ms).
pub const DEFAULT_HEARTBEAT_PERIOD: SimTime = SimTime::from_millis(100);

/// Default participant lease (10 s).
pub const DEFAULT_LEASE_DURATION: SimTime = SimTime::from_secs(10);

/// Time spent in the initializing phase before the first announcement.
pub const DEFAULT_INIT_DELAY: SimTime = SimTime::from_millis(10);

/// Processing cost of building an announcement.
pub const DEFAULT_DISCOVERY_PROCESSING: SimTime = SimTime::from_millis(1);

/// Processing cost of building a heartbeat.
pub const DEFAULT_HEARTBEAT_PROCESSING: SimTime = SimTime::from_millis(1);

/// Processing cost of handing one sample to the transport.
pub const DEFAULT_SEND_PROCESSING: SimTime = SimTime::from_micros(100);

/// Network latency shared by the UDP-like classes (200 us, LAN).
pub const DEFAULT_LAN_LATENCY: SimTime = SimTime::from_micros(200);

/// Same-process delivery latency.
pub const DEFAULT_SHM_LATENCY: SimTime = SimTime::from_micros(1);

/// Default LAN loss rate for unreliable classes (0.1%).
pub const DEFAULT_LAN_LOSS_RATE: f64 = 0.001;

/// Default 1 Gbit/s link.
pub const DEFAULT_BANDWIDTH: u64 = 125_000_000;

/// Default number of attempts of the reliable class.
pub const DEFAULT_RELIABLE_MAX_ATTEMPTS: u32 = 5;

/// Default delay between reliable retransmissions.
pub const DEFAULT_RELIABLE_RETRY_INTERVAL: SimTime = SimTime::from_millis(10);

/// FNV-1a offset basis (64-bit).
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime (64-bit).
const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;

/// Per-component RNG seed: `seed XOR fnv1a(component)`.
///
/// Two components never share a random stream, and adding a component does
/// not shift the draws of the others.
pub fn component_seed(seed: u64, component: &str) -> u64 {
    let hash = component
        .bytes()
        .fold(FNV_OFFSET, |h, b| (h ^ u64::from(b)).wrapping_mul(FNV_PRIME));
    seed ^ hash
}

// ============================================================================
// Sections
// ============================================================================

/// Kernel settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Seed for every stochastic model.
    pub seed: u64,
    /// Virtual time budget; events after it are not processed.
    pub end_time: SimTime,
    /// Optional cap on the number of kernel steps.
    pub max_steps: Option<u64>,
    /// Keep a log of every emitted event (used by replay comparisons).
    pub record_events: bool,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            end_time: SimTime::from_secs(10),
            max_steps: None,
            record_events: false,
        }
    }
}

/// Discovery timing of every participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub domain_id: u32,
    pub discovery_period: SimTime,
    pub heartbeat_period: SimTime,
    pub lease_duration: SimTime,
    /// How often expired leases are swept.
    pub lease_check_period: SimTime,
    pub init_delay: SimTime,
    pub discovery_processing: SimTime,
    pub heartbeat_processing: SimTime,
    pub send_processing: SimTime,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            domain_id: 0,
            discovery_period: DEFAULT_DISCOVERY_PERIOD,
            heartbeat_period: DEFAULT_HEARTBEAT_PERIOD,
            lease_duration: DEFAULT_LEASE_DURATION,
            lease_check_period: DEFAULT_DISCOVERY_PERIOD,
            init_delay: DEFAULT_INIT_DELAY,
            discovery_processing: DEFAULT_DISCOVERY_PROCESSING,
            heartbeat_processing: DEFAULT_HEARTBEAT_PROCESSING,
            send_processing: DEFAULT_SEND_PROCESSING,
        }
    }
}

impl DiscoveryConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("discovery_period", self.discovery_period),
            ("heartbeat_period", self.heartbeat_period),
            ("lease_duration", self.lease_duration),
            ("lease_check_period", self.lease_check_period),
        ] {
            if value.is_zero() || value.is_infinite() {
                return Err(Error::InvalidConfig(format!(
                    "discovery.{} must be finite and > 0 (got {})",
                    name, value
                )));
            }
        }
        if self.lease_duration < self.discovery_period {
            return Err(Error::InvalidConfig(format!(
                "discovery.lease_duration ({}) shorter than discovery_period ({})",
                self.lease_duration, self.discovery_period
            )));
        }
        for (name, value) in [
            ("init_delay", self.init_delay),
            ("discovery_processing", self.discovery_processing),
            ("heartbeat_processing", self.heartbeat_processing),
            ("send_processing", self.send_processing),
        ] {
            if value.is_infinite() {
                return Err(Error::InvalidConfig(format!(
                    "discovery.{} must be finite",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Behavior of one transport class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ClassConfig {
    pub latency: LatencyModel,
    pub loss: LossModel,
}

/// Transport layer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Route same-process traffic through shared memory.
    pub enable_shared_memory: bool,
    /// Classes listed in a document replace their default; the others keep it.
    #[serde(deserialize_with = "deserialize_classes")]
    pub classes: BTreeMap<TransportClass, ClassConfig>,
}

fn deserialize_classes<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<TransportClass, ClassConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = BTreeMap::<TransportClass, ClassConfig>::deserialize(deserializer)?;
    let mut classes = TransportConfig::default().classes;
    classes.extend(overrides);
    Ok(classes)
}

impl Default for TransportConfig {
    fn default() -> Self {
        let lan = LatencyModel {
            min_latency: DEFAULT_LAN_LATENCY,
            jitter: Jitter::None,
            bandwidth_bytes_per_sec: Some(DEFAULT_BANDWIDTH),
        };
        let mut classes = BTreeMap::new();
        classes.insert(
            TransportClass::SharedMemory,
            ClassConfig {
                latency: LatencyModel::fixed(DEFAULT_SHM_LATENCY),
                loss: LossModel::None,
            },
        );
        classes.insert(
            TransportClass::Multicast,
            ClassConfig {
                latency: lan,
                loss: LossModel::Bernoulli {
                    probability: DEFAULT_LAN_LOSS_RATE,
                },
            },
        );
        classes.insert(
            TransportClass::Reliable,
            ClassConfig {
                latency: lan,
                loss: LossModel::Retransmit {
                    probability: DEFAULT_LAN_LOSS_RATE,
                    max_attempts: DEFAULT_RELIABLE_MAX_ATTEMPTS,
                    retry_interval: DEFAULT_RELIABLE_RETRY_INTERVAL,
                },
            },
        );
        classes.insert(
            TransportClass::BestEffort,
            ClassConfig {
                latency: lan,
                loss: LossModel::Bernoulli {
                    probability: DEFAULT_LAN_LOSS_RATE,
                },
            },
        );
        Self {
            enable_shared_memory: true,
            classes,
        }
    }
}

impl TransportConfig {
    /// Classes the router may select under this configuration.
    pub fn required_classes(&self) -> Vec<TransportClass> {
        TransportClass::ALL
            .into_iter()
            .filter(|c| *c != TransportClass::SharedMemory || self.enable_shared_memory)
            .collect()
    }

    pub fn class(&self, class: TransportClass) -> Result<&ClassConfig> {
        self.classes
            .get(&class)
            .ok_or(Error::UnroutableClass(class))
    }

    pub fn class_mut(&mut self, class: TransportClass) -> Option<&mut ClassConfig> {
        self.classes.get_mut(&class)
    }

    pub fn validate(&self) -> Result<()> {
        for class in self.required_classes() {
            self.class(class)?;
        }
        for (class, cfg) in &self.classes {
            cfg.latency.validate().map_err(|e| prefix_error(*class, e))?;
            cfg.loss.validate().map_err(|e| prefix_error(*class, e))?;
            match (class, cfg.loss) {
                (TransportClass::SharedMemory, LossModel::None) => {}
                (TransportClass::SharedMemory, _) => {
                    return Err(Error::InvalidConfig(
                        "transport.shared_memory must be lossless".to_string(),
                    ));
                }
                (TransportClass::Reliable, LossModel::Bernoulli { .. }) => {
                    return Err(Error::InvalidConfig(
                        "transport.reliable cannot drop silently; use a retransmit loss model"
                            .to_string(),
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn prefix_error(class: TransportClass, err: Error) -> Error {
    match err {
        Error::InvalidConfig(msg) => Error::InvalidConfig(format!("transport.{}: {}", class, msg)),
        other => other,
    }
}

// ============================================================================
// Root
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SimConfig {
    pub kernel: KernelConfig,
    pub discovery: DiscoveryConfig,
    pub transport: TransportConfig,
    pub trace: TraceConfig,
}

impl SimConfig {
    pub fn validate(&self) -> Result<()> {
        self.discovery.validate()?;
        self.transport.validate()?;
        Ok(())
    }

    /// Verbose tracing, kernel events recorded.
    pub fn development() -> Self {
        let mut config = Self::default();
        config.trace.kernel_events = true;
        config.kernel.record_events = true;
        config
    }

    /// Short leases and periods, lossless network, deterministic seed.
    pub fn testing() -> Self {
        let mut config = Self::default();
        config.kernel.seed = 1;
        config.kernel.end_time = SimTime::from_secs(5);
        config.kernel.record_events = true;
        config.discovery.lease_duration = SimTime::from_secs(1);
        for class in config.transport.classes.values_mut() {
            class.loss = match class.loss {
                LossModel::Retransmit {
                    max_attempts,
                    retry_interval,
                    ..
                } => LossModel::Retransmit {
                    probability: 0.0,
                    max_attempts,
                    retry_interval,
                },
                _ => LossModel::None,
            };
        }
        config
    }

    /// Long run, no tracing overhead.
    pub fn benchmark() -> Self {
        let mut config = Self::default();
        config.kernel.end_time = SimTime::from_secs(60);
        config.trace.capture = false;
        config.trace.forward_to_log = false;
        config
    }

    /// Production-like: tracing to `log` only, nothing kept in memory.
    pub fn production() -> Self {
        let mut config = Self::default();
        config.trace.capture = false;
        config
    }

    /// Parse and validate a YAML document.
    #[cfg(feature = "config-loaders")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: SimConfig =
            serde_yaml::from_str(yaml).map_err(|e| Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file.
    #[cfg(feature = "config-loaders")]
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::ConfigFileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Serialize to YAML.
    #[cfg(feature = "config-loaders")]
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::ConfigParse(e.to_string()))
    }
}
