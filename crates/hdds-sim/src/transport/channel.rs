// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! One transport class as an atomic model.
//!
//! Messages entering `send_in` are run through the class loss model and
//! scheduled for delivery on `receive_out` after a sampled latency. Messages
//! that exhaust their retransmissions come back on `failure_out` once the
//! last retry would have been sent.

use super::latency::{LatencyModel, LossModel, LossOutcome};
use super::message::{DeliveryFailure, TransportClass, TransportMessage};
use crate::config::ClassConfig;
use crate::event::Event;
use crate::kernel::{Context, InputBag, Model, OutputBag, PortName};
use crate::time::SimTime;
use crate::trace::TraceRecord;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::any::Any;
use std::collections::BTreeMap;

pub const SEND_IN: PortName = "send_in";
pub const RECEIVE_OUT: PortName = "receive_out";
pub const FAILURE_OUT: PortName = "failure_out";

#[derive(Debug, Clone, PartialEq)]
enum InFlight {
    Deliver(TransportMessage),
    Failure(DeliveryFailure),
}

/// Per-channel counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    pub accepted: u64,
    pub delivered: u64,
    pub dropped: u64,
    /// Extra attempts spent by the retransmit loss model.
    pub retransmissions: u64,
    pub failures: u64,
}

pub struct TransportChannel {
    class: TransportClass,
    latency: LatencyModel,
    loss: LossModel,
    rng: ChaCha8Rng,
    clock: SimTime,
    /// (due time, admission order) -> pending delivery.
    in_flight: BTreeMap<(SimTime, u64), InFlight>,
    next_seq: u64,
    stats: ChannelStats,
}

impl TransportChannel {
    pub fn new(class: TransportClass, config: &ClassConfig, seed: u64) -> Self {
        Self {
            class,
            latency: config.latency,
            loss: config.loss,
            rng: ChaCha8Rng::seed_from_u64(seed),
            clock: SimTime::ZERO,
            in_flight: BTreeMap::new(),
            next_seq: 0,
            stats: ChannelStats::default(),
        }
    }

    pub fn class(&self) -> TransportClass {
        self.class
    }

    pub fn stats(&self) -> ChannelStats {
        self.stats
    }

    /// Messages scheduled but not yet delivered (failures included).
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    fn next_due(&self) -> Option<SimTime> {
        self.in_flight.keys().next().map(|(due, _)| *due)
    }

    fn schedule(&mut self, due: SimTime, item: InFlight) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight.insert((due, seq), item);
    }

    /// Drop everything due at or before `now`; it has been emitted already.
    fn retire_due(&mut self, now: SimTime) {
        while let Some(entry) = self.in_flight.first_entry() {
            if entry.key().0 > now {
                break;
            }
            match entry.remove() {
                InFlight::Deliver(_) => self.stats.delivered += 1,
                InFlight::Failure(_) => self.stats.failures += 1,
            }
        }
    }

    fn accept(&mut self, ctx: &mut Context<'_>, mut msg: TransportMessage) {
        let now = ctx.now();
        self.stats.accepted += 1;
        msg.transport_class = Some(self.class);

        match self.loss.apply(&mut self.rng) {
            LossOutcome::Delivered {
                attempts,
                extra_delay,
            } => {
                self.stats.retransmissions += u64::from(attempts.saturating_sub(1));
                let delay = self.latency.sample(msg.payload_size, &mut self.rng) + extra_delay;
                self.schedule(now + delay, InFlight::Deliver(msg));
            }
            LossOutcome::Dropped => {
                self.stats.dropped += 1;
                log::trace!(
                    "[transport] {} dropped message from {} ({} bytes)",
                    self.class,
                    msg.source_guid,
                    msg.payload_size
                );
                ctx.trace(
                    TraceRecord::new("message_dropped")
                        .field("class", self.class.name())
                        .field("source", msg.source_guid)
                        .field("size", msg.payload_size),
                );
            }
            LossOutcome::Failed {
                attempts,
                report_delay,
            } => {
                self.stats.retransmissions += u64::from(attempts.saturating_sub(1));
                log::debug!(
                    "[transport] {} gave up on message from {} after {} attempts",
                    self.class,
                    msg.source_guid,
                    attempts
                );
                ctx.trace(
                    TraceRecord::new("delivery_failed")
                        .field("class", self.class.name())
                        .field("source", msg.source_guid)
                        .field("attempts", attempts),
                );
                let failure = DeliveryFailure {
                    message: msg,
                    class: self.class,
                    attempts,
                };
                self.schedule(now + report_delay, InFlight::Failure(failure));
            }
        }
    }
}

impl Model for TransportChannel {
    fn input_ports(&self) -> &'static [PortName] {
        &[SEND_IN]
    }

    fn output_ports(&self) -> &'static [PortName] {
        &[RECEIVE_OUT, FAILURE_OUT]
    }

    fn time_advance(&self) -> SimTime {
        match self.next_due() {
            Some(due) => due - self.clock,
            None => SimTime::INFINITY,
        }
    }

    fn output(&self, out: &mut OutputBag) {
        let Some(due) = self.next_due() else {
            return;
        };
        for ((_, _), item) in self.in_flight.range((due, 0)..=(due, u64::MAX)) {
            match item {
                InFlight::Deliver(msg) => out.push(RECEIVE_OUT, msg.clone()),
                InFlight::Failure(failure) => {
                    out.push(FAILURE_OUT, Event::DeliveryFailure(failure.clone()))
                }
            }
        }
    }

    fn internal_transition(&mut self, ctx: &mut Context<'_>) {
        self.clock = ctx.now();
        self.retire_due(self.clock);
    }

    fn external_transition(&mut self, ctx: &mut Context<'_>, _elapsed: SimTime, inputs: &InputBag) {
        self.clock = ctx.now();
        // Entries due now were emitted in this step's output phase.
        self.retire_due(self.clock);
        for event in inputs.get(SEND_IN) {
            match event {
                Event::Transport(msg) => self.accept(ctx, msg.clone()),
                other => log::warn!(
                    "[transport] {} ignoring unexpected {} event",
                    self.class,
                    other.kind()
                ),
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
