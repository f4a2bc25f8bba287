// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Discrete-event kernel.
//!
//! One step processes every model scheduled at the earliest pending time:
//!
//! 1. imminent models emit their outputs (in path order)
//! 2. events are routed through the flattened couplings
//! 3. every imminent or receiving model transitions once
//! 4. their next event times are recomputed
//!
//! Virtual time never moves backwards and the kernel never reads a wall
//! clock, so two runs with the same models and seed are identical.

use super::coupled::{flatten, Coupled, Destination, Leaf};
use super::model::{Context, InputBag, Model, OutputBag, PortName};
use crate::config::{KernelConfig, SimConfig};
use crate::error::{Error, Result};
use crate::event::Event;
use crate::time::SimTime;
use crate::trace::{TraceConfig, TraceRecord, Tracer};
use std::collections::BTreeMap;

/// Event that left the root model through one of its output ports.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalOutput {
    pub time: SimTime,
    pub port: String,
    pub event: Event,
}

/// Entry of the optional event log.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub time: SimTime,
    /// Path of the emitting model, or `"<root>"` for injections.
    pub source: String,
    pub port: String,
    pub event: Event,
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Nothing left to do.
    Passive,
    /// The next event lies past the end time.
    TimeLimit,
    /// `max_steps` reached.
    StepLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: u64,
    pub final_time: SimTime,
    pub termination: Termination,
}

const ROOT_SOURCE: &str = "<root>";

pub struct Simulator {
    name: String,
    leaves: Vec<Leaf>,
    index_by_name: BTreeMap<String, usize>,
    /// Time of each leaf's last transition.
    last: Vec<SimTime>,
    /// Time of each leaf's next internal event.
    next: Vec<SimTime>,
    routes: BTreeMap<(usize, PortName), Vec<Destination>>,
    root_inputs: BTreeMap<String, Vec<Destination>>,
    clock: SimTime,
    injections: BTreeMap<(SimTime, u64), (String, Event)>,
    injection_seq: u64,
    outputs: Vec<ExternalOutput>,
    event_log: Vec<EventRecord>,
    tracer: Tracer,
    config: KernelConfig,
    steps: u64,
}

impl Simulator {
    /// Flatten `root` and schedule every leaf from time zero.
    pub fn new(root: Coupled, config: KernelConfig, trace: TraceConfig) -> Result<Self> {
        let name = root.name().to_string();
        let flat = flatten(root)?;

        let index_by_name = flat
            .leaves
            .iter()
            .enumerate()
            .map(|(i, leaf)| (leaf.path.clone(), i))
            .collect();
        let last = vec![SimTime::ZERO; flat.leaves.len()];
        let next = flat
            .leaves
            .iter()
            .map(|leaf| leaf.model.time_advance())
            .collect();

        log::info!(
            "[kernel] '{}' ready: {} models, {} routes, seed {}",
            name,
            flat.leaves.len(),
            flat.routes.len(),
            config.seed
        );

        Ok(Self {
            name,
            leaves: flat.leaves,
            index_by_name,
            last,
            next,
            routes: flat.routes,
            root_inputs: flat.root_inputs,
            clock: SimTime::ZERO,
            injections: BTreeMap::new(),
            injection_seq: 0,
            outputs: Vec::new(),
            event_log: Vec::new(),
            tracer: Tracer::new(trace),
            config,
            steps: 0,
        })
    }

    /// Validate `config` and build with its kernel and trace sections.
    pub fn from_config(root: Coupled, config: &SimConfig) -> Result<Self> {
        config.validate()?;
        Self::new(root, config.kernel.clone(), config.trace.clone())
    }

    pub fn now(&self) -> SimTime {
        self.clock
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Earliest pending event (model or injection); `INFINITY` if none.
    pub fn next_event_time(&self) -> SimTime {
        let models = self.next.iter().copied().min().unwrap_or(SimTime::INFINITY);
        let injected = self
            .injections
            .keys()
            .next()
            .map(|(t, _)| *t)
            .unwrap_or(SimTime::INFINITY);
        models.min(injected)
    }

    /// Schedule `event` on the root input `port` at `time`.
    pub fn inject(&mut self, time: SimTime, port: &str, event: impl Into<Event>) -> Result<()> {
        if !self.root_inputs.contains_key(port) {
            return Err(Error::UnknownPort {
                component: self.name.clone(),
                port: port.to_string(),
            });
        }
        if time < self.clock || time.is_infinite() {
            return Err(Error::InvalidState(format!(
                "cannot inject at {} (now {})",
                time, self.clock
            )));
        }
        let seq = self.injection_seq;
        self.injection_seq += 1;
        self.injections
            .insert((time, seq), (port.to_string(), event.into()));
        Ok(())
    }

    /// Process one instant. Returns its time, or `None` when passive.
    pub fn step(&mut self) -> Result<Option<SimTime>> {
        let now = self.next_event_time();
        if now.is_infinite() {
            return Ok(None);
        }
        debug_assert!(now >= self.clock, "virtual time moved backwards");

        let imminent: Vec<usize> = (0..self.leaves.len())
            .filter(|&i| self.next[i] == now)
            .collect();

        // Every output is checked before anything is consumed or routed, so a
        // failed step leaves the simulator as it was.
        let mut emitted: Vec<(usize, PortName, Event)> = Vec::new();
        for &index in &imminent {
            let leaf = &self.leaves[index];
            let mut bag = OutputBag::new();
            leaf.model.output(&mut bag);
            for (port, event) in bag.into_events() {
                if !leaf.model.output_ports().contains(&port) {
                    return Err(Error::UndeclaredOutputPort {
                        model: leaf.path.clone(),
                        port: port.to_string(),
                    });
                }
                emitted.push((index, port, event));
            }
        }

        let mut inbox: BTreeMap<usize, InputBag> = BTreeMap::new();

        // Injections first: the root precedes every model in the order.
        while let Some(entry) = self.injections.first_entry() {
            if entry.key().0 != now {
                break;
            }
            let (port, event) = entry.remove();
            let dests = self.root_inputs.get(&port).cloned().unwrap_or_default();
            self.record(now, ROOT_SOURCE, &port, &event);
            self.deliver(now, &dests, event, &mut inbox);
        }

        for (index, port, event) in emitted {
            let path = self.leaves[index].path.clone();
            self.record(now, &path, port, &event);
            let dests = self.routes.get(&(index, port)).cloned().unwrap_or_default();
            self.deliver(now, &dests, event, &mut inbox);
        }

        let mut active: Vec<usize> = imminent.clone();
        active.extend(inbox.keys().copied());
        active.sort_unstable();
        active.dedup();

        for index in active {
            let is_imminent = self.next[index] == now;
            let inputs = inbox.remove(&index);
            let elapsed = now - self.last[index];
            let leaf = &mut self.leaves[index];
            let mut ctx = Context::new(now, &leaf.path, &mut self.tracer);

            let kind = match inputs {
                Some(bag) => {
                    leaf.model.external_transition(&mut ctx, elapsed, &bag);
                    if is_imminent {
                        "confluent"
                    } else {
                        "external"
                    }
                }
                None => {
                    leaf.model.internal_transition(&mut ctx);
                    "internal"
                }
            };
            if self.tracer.kernel_events() {
                self.tracer.emit(
                    now,
                    &leaf.path,
                    TraceRecord::new("transition").field("kind", kind),
                );
            }

            self.last[index] = now;
            self.next[index] = now + leaf.model.time_advance();
        }

        self.clock = now;
        self.steps += 1;
        Ok(Some(now))
    }

    /// Step until passive, past `end`, or out of steps.
    pub fn run_until(&mut self, end: SimTime) -> Result<RunSummary> {
        let start_steps = self.steps;
        let termination = loop {
            if let Some(max) = self.config.max_steps {
                if self.steps >= max {
                    break Termination::StepLimit;
                }
            }
            let next = self.next_event_time();
            if next.is_infinite() {
                break Termination::Passive;
            }
            if next > end {
                break Termination::TimeLimit;
            }
            self.step()?;
        };

        let summary = RunSummary {
            steps: self.steps - start_steps,
            final_time: self.clock,
            termination,
        };
        log::info!(
            "[kernel] '{}' stopped at {} after {} steps ({:?})",
            self.name,
            summary.final_time,
            summary.steps,
            summary.termination
        );
        Ok(summary)
    }

    /// Run until the configured end time.
    pub fn run(&mut self) -> Result<RunSummary> {
        self.run_until(self.config.end_time)
    }

    /// Events emitted on root output ports, oldest first.
    pub fn outputs(&self) -> &[ExternalOutput] {
        &self.outputs
    }

    pub fn drain_outputs(&mut self) -> Vec<ExternalOutput> {
        std::mem::take(&mut self.outputs)
    }

    /// Every routed event, if `record_events` is set.
    pub fn event_log(&self) -> &[EventRecord] {
        &self.event_log
    }

    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    /// Paths of all atomic models, in kernel order.
    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.leaves.iter().map(|leaf| leaf.path.as_str())
    }

    /// Inspect the atomic model at `path`.
    pub fn model<T: Model>(&self, path: &str) -> Option<&T> {
        let index = *self.index_by_name.get(path)?;
        self.leaves[index].model.as_any().downcast_ref::<T>()
    }

    /// Next scheduled internal event of the model at `path`.
    pub fn model_next_time(&self, path: &str) -> Option<SimTime> {
        self.index_by_name.get(path).map(|&i| self.next[i])
    }

    /// Time of the last transition of the model at `path`.
    pub fn model_last_time(&self, path: &str) -> Option<SimTime> {
        self.index_by_name.get(path).map(|&i| self.last[i])
    }

    fn deliver(
        &mut self,
        now: SimTime,
        dests: &[Destination],
        event: Event,
        inbox: &mut BTreeMap<usize, InputBag>,
    ) {
        for dest in dests {
            match dest {
                Destination::Leaf { index, port } => {
                    inbox.entry(*index).or_default().push(*port, event.clone());
                }
                Destination::External(port) => self.outputs.push(ExternalOutput {
                    time: now,
                    port: port.clone(),
                    event: event.clone(),
                }),
            }
        }
    }

    fn record(&mut self, now: SimTime, source: &str, port: &str, event: &Event) {
        if !self.config.record_events {
            return;
        }
        self.event_log.push(EventRecord {
            time: now,
            source: source.to_string(),
            port: port.to_string(),
            event: event.clone(),
        });
    }
}
