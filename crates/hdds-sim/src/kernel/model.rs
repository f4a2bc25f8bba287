// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Atomic model interface.
//!
//! A model is a state machine driven entirely by the kernel:
//!
//! 1. `time_advance()` says how long the model stays in its current state
//!    without input (`SimTime::INFINITY` = passive).
//! 2. When that time is reached the kernel calls `output()` (read-only) and
//!    then `internal_transition()`.
//! 3. When input arrives earlier, the kernel calls `external_transition()`
//!    with the time elapsed since the model's last transition.
//! 4. When both happen at the same instant, the input wins: the kernel
//!    still emits the model's output but calls `external_transition()` with
//!    `elapsed` equal to the full time advance, and skips the internal one.
//!
//! Models never see each other; they only exchange [`Event`]s on ports.

use crate::event::Event;
use crate::time::SimTime;
use crate::trace::{TraceRecord, Tracer};
use std::any::Any;
use std::collections::BTreeMap;

/// Port identifier. Atomic models declare their ports statically.
pub type PortName = &'static str;

/// Per-call view of the kernel handed to transitions.
pub struct Context<'a> {
    now: SimTime,
    name: &'a str,
    tracer: &'a mut Tracer,
}

impl<'a> Context<'a> {
    pub(crate) fn new(now: SimTime, name: &'a str, tracer: &'a mut Tracer) -> Self {
        Self { now, name, tracer }
    }

    /// Current virtual time.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Hierarchical name of the model being stepped.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Emit a trace record stamped with `now` and this model's name.
    pub fn trace(&mut self, record: TraceRecord) {
        self.tracer.emit(self.now, self.name, record);
    }
}

/// Events produced by one `output()` call.
#[derive(Debug, Default)]
pub struct OutputBag {
    events: Vec<(PortName, Event)>,
}

impl OutputBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, port: PortName, event: impl Into<Event>) {
        self.events.push((port, event.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(PortName, Event)> {
        self.events.iter()
    }

    pub(crate) fn into_events(self) -> Vec<(PortName, Event)> {
        self.events
    }
}

/// Events delivered to one model in one step, grouped by input port.
///
/// Fan-in is preserved: several events on the same port stay in arrival
/// order (source model name order, then emission order).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InputBag {
    events: BTreeMap<PortName, Vec<Event>>,
}

impl InputBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, port: PortName, event: Event) {
        self.events.entry(port).or_default().push(event);
    }

    /// Events received on `port` (empty slice if none).
    pub fn get(&self, port: &str) -> &[Event] {
        self.events.get(port).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Total number of events across ports.
    pub fn len(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PortName, &Event)> {
        self.events
            .iter()
            .flat_map(|(port, events)| events.iter().map(move |e| (*port, e)))
    }
}

/// Behavior of an atomic model.
pub trait Model: Any {
    /// Ports accepting events.
    fn input_ports(&self) -> &'static [PortName];

    /// Ports events may be emitted on.
    fn output_ports(&self) -> &'static [PortName];

    /// Time left in the current state without input. Must be pure.
    fn time_advance(&self) -> SimTime;

    /// Events to emit when the time advance expires. Must not change state.
    fn output(&self, out: &mut OutputBag);

    fn internal_transition(&mut self, ctx: &mut Context<'_>);

    fn external_transition(&mut self, ctx: &mut Context<'_>, elapsed: SimTime, inputs: &InputBag);

    /// True if the model answers input with a zero time advance.
    ///
    /// Loops made only of such models would never let time progress and
    /// are rejected when the simulator is built.
    fn is_instantaneous(&self) -> bool {
        false
    }

    /// Downcast support for inspection (see `Simulator::model`).
    fn as_any(&self) -> &dyn Any;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_bag_fan_in_order() {
        let mut bag = InputBag::new();
        bag.push("in", Event::Signal(1));
        bag.push("in", Event::Signal(2));
        bag.push("ctl", Event::Signal(3));

        assert_eq!(bag.get("in"), &[Event::Signal(1), Event::Signal(2)]);
        assert_eq!(bag.get("missing"), &[] as &[Event]);
        assert_eq!(bag.len(), 3);

        let ports: Vec<PortName> = bag.iter().map(|(p, _)| p).collect();
        assert_eq!(ports, vec!["ctl", "in", "in"]);
    }

    #[test]
    fn test_output_bag() {
        let mut out = OutputBag::new();
        assert!(out.is_empty());
        out.push("out", Event::Signal(5));
        assert_eq!(out.len(), 1);
        assert_eq!(out.into_events(), vec![("out", Event::Signal(5))]);
    }
}
