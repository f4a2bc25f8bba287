// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transport selection.
//!
//! Picks one class per message, in priority order:
//!
//! 1. shared memory, when every destination lives in the sender's process
//! 2. multicast, for discovery and heartbeat traffic
//! 3. reliable, for reliable endpoints
//! 4. best effort otherwise
//!
//! The router forwards in zero time.

use super::message::{TransportClass, TransportMessage};
use crate::event::Event;
use crate::kernel::{Context, InputBag, Model, OutputBag, PortName};
use crate::qos::Reliability;
use crate::time::SimTime;
use std::any::Any;

pub const DATA_IN: PortName = "data_in";
pub const SHM_OUT: PortName = "shm_out";
pub const MULTICAST_OUT: PortName = "multicast_out";
pub const RELIABLE_OUT: PortName = "reliable_out";
pub const BEST_EFFORT_OUT: PortName = "best_effort_out";

/// Choose the class for `msg`.
pub fn classify(msg: &TransportMessage, shm_enabled: bool) -> TransportClass {
    let local_only = !msg.destination_guids.is_empty()
        && msg
            .destination_guids
            .iter()
            .all(|dest| dest.same_process(&msg.source_guid));

    if shm_enabled && local_only {
        TransportClass::SharedMemory
    } else if msg.payload.is_discovery() {
        TransportClass::Multicast
    } else if msg.reliability == Reliability::Reliable {
        TransportClass::Reliable
    } else {
        TransportClass::BestEffort
    }
}

/// Output port serving `class`.
pub const fn port_for(class: TransportClass) -> PortName {
    match class {
        TransportClass::SharedMemory => SHM_OUT,
        TransportClass::Multicast => MULTICAST_OUT,
        TransportClass::Reliable => RELIABLE_OUT,
        TransportClass::BestEffort => BEST_EFFORT_OUT,
    }
}

#[derive(Debug, Default)]
pub struct TransportRouter {
    shm_enabled: bool,
    pending: Vec<(TransportClass, TransportMessage)>,
    routed: [u64; 4],
}

impl TransportRouter {
    pub fn new(shm_enabled: bool) -> Self {
        Self {
            shm_enabled,
            ..Self::default()
        }
    }

    /// Messages routed so far through `class`.
    pub fn routed(&self, class: TransportClass) -> u64 {
        self.routed[class as usize]
    }
}

impl Model for TransportRouter {
    fn input_ports(&self) -> &'static [PortName] {
        &[DATA_IN]
    }

    fn output_ports(&self) -> &'static [PortName] {
        &[SHM_OUT, MULTICAST_OUT, RELIABLE_OUT, BEST_EFFORT_OUT]
    }

    fn time_advance(&self) -> SimTime {
        if self.pending.is_empty() {
            SimTime::INFINITY
        } else {
            SimTime::ZERO
        }
    }

    fn output(&self, out: &mut OutputBag) {
        for (class, msg) in &self.pending {
            out.push(port_for(*class), msg.clone());
        }
    }

    fn internal_transition(&mut self, _ctx: &mut Context<'_>) {
        self.pending.clear();
    }

    fn external_transition(&mut self, _ctx: &mut Context<'_>, elapsed: SimTime, inputs: &InputBag) {
        if elapsed >= self.time_advance() {
            // Confluent step: the pending batch went out already.
            self.pending.clear();
        }
        for event in inputs.get(DATA_IN) {
            let Event::Transport(msg) = event else {
                log::warn!("[transport] router ignoring unexpected {} event", event.kind());
                continue;
            };
            let class = classify(msg, self.shm_enabled);
            log::trace!(
                "[transport] route {} -> {} ({} destinations)",
                msg.source_guid,
                class,
                msg.destination_guids.len()
            );
            self.routed[class as usize] += 1;
            self.pending.push((class, msg.clone()));
        }
    }

    fn is_instantaneous(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
