// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scripted event source.

use super::model::{Context, InputBag, Model, OutputBag, PortName};
use crate::event::Event;
use crate::time::SimTime;
use std::any::Any;

pub const OUT: PortName = "out";

/// Emits a fixed list of events at fixed times on `out`.
///
/// Events sharing a time are emitted in the same step, in list order.
#[derive(Debug, Clone, Default)]
pub struct ScheduledSource {
    schedule: Vec<(SimTime, Event)>,
    cursor: usize,
    clock: SimTime,
}

impl ScheduledSource {
    pub fn new(mut schedule: Vec<(SimTime, Event)>) -> Self {
        // Stable: same-time events keep their relative order.
        schedule.sort_by_key(|(at, _)| *at);
        Self {
            schedule,
            cursor: 0,
            clock: SimTime::ZERO,
        }
    }

    /// Events not yet emitted.
    pub fn remaining(&self) -> usize {
        self.schedule.len() - self.cursor
    }

    fn next_at(&self) -> Option<SimTime> {
        self.schedule.get(self.cursor).map(|(at, _)| *at)
    }
}

impl Model for ScheduledSource {
    fn input_ports(&self) -> &'static [PortName] {
        &[]
    }

    fn output_ports(&self) -> &'static [PortName] {
        &[OUT]
    }

    fn time_advance(&self) -> SimTime {
        match self.next_at() {
            Some(at) => at - self.clock,
            None => SimTime::INFINITY,
        }
    }

    fn output(&self, out: &mut OutputBag) {
        let Some(at) = self.next_at() else {
            return;
        };
        for (_, event) in self.schedule[self.cursor..]
            .iter()
            .take_while(|(t, _)| *t == at)
        {
            out.push(OUT, event.clone());
        }
    }

    fn internal_transition(&mut self, ctx: &mut Context<'_>) {
        self.clock = ctx.now();
        while self.next_at().is_some_and(|at| at <= self.clock) {
            self.cursor += 1;
        }
    }

    fn external_transition(&mut self, ctx: &mut Context<'_>, _elapsed: SimTime, _inputs: &InputBag) {
        self.clock = ctx.now();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::Tracer;

    #[test]
    fn test_groups_same_time_events() {
        let mut source = ScheduledSource::new(vec![
            (SimTime::from_millis(5), Event::Signal(3)),
            (SimTime::from_millis(1), Event::Signal(1)),
            (SimTime::from_millis(1), Event::Signal(2)),
        ]);
        assert_eq!(source.time_advance(), SimTime::from_millis(1));

        let mut out = OutputBag::new();
        source.output(&mut out);
        assert_eq!(
            out.into_events(),
            vec![(OUT, Event::Signal(1)), (OUT, Event::Signal(2))]
        );

        let mut tracer = Tracer::disabled();
        let mut ctx = Context::new(SimTime::from_millis(1), "src", &mut tracer);
        source.internal_transition(&mut ctx);
        assert_eq!(source.remaining(), 1);
        assert_eq!(source.time_advance(), SimTime::from_millis(4));
    }

    #[test]
    fn test_empty_source_is_passive() {
        assert_eq!(ScheduledSource::default().time_advance(), SimTime::INFINITY);
    }
}
