// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Latency and loss models for transport channels.
//!
//! Every draw uses the channel's own seeded `ChaCha8Rng`, so a run is fully
//! reproducible from the kernel seed.

use crate::error::{Error, Result};
use crate::time::SimTime;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Random extra delay on top of the fixed latency.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Jitter {
    #[default]
    None,
    /// Uniform in `[0, max]`.
    Uniform { max: SimTime },
    /// Exponential with the given mean.
    Exponential { mean: SimTime },
}

impl Jitter {
    pub fn sample(&self, rng: &mut ChaCha8Rng) -> SimTime {
        match *self {
            Jitter::None => SimTime::ZERO,
            Jitter::Uniform { max } => {
                if max.is_zero() || max.is_infinite() {
                    return SimTime::ZERO;
                }
                SimTime::from_nanos(rng.gen_range(0..=max.as_nanos()))
            }
            Jitter::Exponential { mean } => {
                if mean.is_zero() || mean.is_infinite() {
                    return SimTime::ZERO;
                }
                // Inverse CDF; u in [0, 1) keeps ln finite.
                let u: f64 = rng.gen();
                let secs = -mean.as_secs_f64() * (1.0 - u).ln();
                SimTime::from_secs_f64(secs)
            }
        }
    }
}

/// Delivery delay: `min_latency + payload_size / bandwidth + jitter`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyModel {
    pub min_latency: SimTime,
    pub jitter: Jitter,
    /// Serialization rate; `None` means size does not matter.
    pub bandwidth_bytes_per_sec: Option<u64>,
}

impl Default for LatencyModel {
    fn default() -> Self {
        Self {
            min_latency: SimTime::from_micros(200),
            jitter: Jitter::None,
            bandwidth_bytes_per_sec: None,
        }
    }
}

impl LatencyModel {
    pub const fn fixed(min_latency: SimTime) -> Self {
        Self {
            min_latency,
            jitter: Jitter::None,
            bandwidth_bytes_per_sec: None,
        }
    }

    /// Time needed to push `payload_size` bytes onto the wire.
    pub fn serialization_delay(&self, payload_size: usize) -> SimTime {
        match self.bandwidth_bytes_per_sec {
            Some(bw) if bw > 0 => {
                let nanos = (payload_size as u128 * NANOS_PER_SEC) / u128::from(bw);
                SimTime::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX - 1))
            }
            _ => SimTime::ZERO,
        }
    }

    /// Draw one delivery delay.
    pub fn sample(&self, payload_size: usize, rng: &mut ChaCha8Rng) -> SimTime {
        self.min_latency + self.serialization_delay(payload_size) + self.jitter.sample(rng)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_latency.is_infinite() {
            return Err(Error::InvalidConfig(
                "min_latency must be finite".to_string(),
            ));
        }
        if self.bandwidth_bytes_per_sec == Some(0) {
            return Err(Error::InvalidConfig(
                "bandwidth_bytes_per_sec must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// How a channel loses messages.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LossModel {
    /// Never drops.
    #[default]
    None,
    /// Each message is dropped independently with `probability`.
    Bernoulli { probability: f64 },
    /// Each attempt fails with `probability`; failed attempts are retried
    /// every `retry_interval`, up to `max_attempts` in total.
    Retransmit {
        probability: f64,
        max_attempts: u32,
        retry_interval: SimTime,
    },
}

/// Result of running a message through a loss model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossOutcome {
    /// Delivered after `attempts` tries; `extra_delay` covers the retries.
    Delivered { attempts: u32, extra_delay: SimTime },
    /// Silently lost (best-effort classes only).
    Dropped,
    /// Every attempt failed; the sender must be told after `report_delay`.
    Failed { attempts: u32, report_delay: SimTime },
}

/// Bernoulli trial, `probability` in `[0, 1]`.
pub fn should_drop(probability: f64, rng: &mut ChaCha8Rng) -> bool {
    probability > 0.0 && rng.gen::<f64>() < probability
}

impl LossModel {
    pub fn apply(&self, rng: &mut ChaCha8Rng) -> LossOutcome {
        match *self {
            LossModel::None => LossOutcome::Delivered {
                attempts: 1,
                extra_delay: SimTime::ZERO,
            },
            LossModel::Bernoulli { probability } => {
                if should_drop(probability, rng) {
                    LossOutcome::Dropped
                } else {
                    LossOutcome::Delivered {
                        attempts: 1,
                        extra_delay: SimTime::ZERO,
                    }
                }
            }
            LossModel::Retransmit {
                probability,
                max_attempts,
                retry_interval,
            } => {
                for attempt in 1..=max_attempts {
                    if !should_drop(probability, rng) {
                        return LossOutcome::Delivered {
                            attempts: attempt,
                            extra_delay: retry_interval.saturating_mul(u64::from(attempt - 1)),
                        };
                    }
                }
                LossOutcome::Failed {
                    attempts: max_attempts,
                    report_delay: retry_interval.saturating_mul(u64::from(max_attempts)),
                }
            }
        }
    }

    /// True if this model can lose a message without telling anyone.
    pub fn is_silent(&self) -> bool {
        matches!(self, LossModel::Bernoulli { .. })
    }

    pub fn validate(&self) -> Result<()> {
        let probability = match *self {
            LossModel::None => return Ok(()),
            LossModel::Bernoulli { probability } => probability,
            LossModel::Retransmit {
                probability,
                max_attempts,
                retry_interval,
            } => {
                if max_attempts == 0 {
                    return Err(Error::InvalidConfig(
                        "retransmit max_attempts must be >= 1".to_string(),
                    ));
                }
                if retry_interval.is_infinite() {
                    return Err(Error::InvalidConfig(
                        "retransmit retry_interval must be finite".to_string(),
                    ));
                }
                probability
            }
        };
        if !(0.0..=1.0).contains(&probability) {
            return Err(Error::InvalidConfig(format!(
                "loss probability {} outside [0, 1]",
                probability
            )));
        }
        Ok(())
    }
}
