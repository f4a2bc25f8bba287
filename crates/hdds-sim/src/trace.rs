// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structured simulation trace.
//!
//! Models report interesting transitions (discovery sent, endpoint matched,
//! participant expired, sample dropped...) as [`TraceRecord`]s. The
//! [`Tracer`] stamps them with virtual time and the emitting component, then
//! keeps them in memory and/or forwards them to the `log` facade.
//!
//! Tracing is write-only from the model side: nothing a model can observe
//! depends on it, so enabling or disabling capture never changes a run.

use crate::discovery::Guid;
use crate::time::SimTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Log target used when records are forwarded to `log`.
pub const TRACE_TARGET: &str = "hdds_sim::trace";

/// Value attached to a trace field.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceValue {
    U64(u64),
    I64(i64),
    F64(f64),
    Bool(bool),
    Str(String),
    Guid(Guid),
    Time(SimTime),
    List(Vec<String>),
}

impl fmt::Display for TraceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceValue::U64(v) => write!(f, "{}", v),
            TraceValue::I64(v) => write!(f, "{}", v),
            TraceValue::F64(v) => write!(f, "{}", v),
            TraceValue::Bool(v) => write!(f, "{}", v),
            TraceValue::Str(v) => write!(f, "{}", v),
            TraceValue::Guid(v) => write!(f, "{}", v),
            TraceValue::Time(v) => write!(f, "{}", v),
            TraceValue::List(v) => write!(f, "[{}]", v.join(",")),
        }
    }
}

impl From<u64> for TraceValue {
    fn from(v: u64) -> Self {
        TraceValue::U64(v)
    }
}

impl From<u32> for TraceValue {
    fn from(v: u32) -> Self {
        TraceValue::U64(u64::from(v))
    }
}

impl From<usize> for TraceValue {
    fn from(v: usize) -> Self {
        TraceValue::U64(v as u64)
    }
}

impl From<i64> for TraceValue {
    fn from(v: i64) -> Self {
        TraceValue::I64(v)
    }
}

impl From<f64> for TraceValue {
    fn from(v: f64) -> Self {
        TraceValue::F64(v)
    }
}

impl From<bool> for TraceValue {
    fn from(v: bool) -> Self {
        TraceValue::Bool(v)
    }
}

impl From<&str> for TraceValue {
    fn from(v: &str) -> Self {
        TraceValue::Str(v.to_string())
    }
}

impl From<String> for TraceValue {
    fn from(v: String) -> Self {
        TraceValue::Str(v)
    }
}

impl From<Guid> for TraceValue {
    fn from(v: Guid) -> Self {
        TraceValue::Guid(v)
    }
}

impl From<SimTime> for TraceValue {
    fn from(v: SimTime) -> Self {
        TraceValue::Time(v)
    }
}

impl From<Vec<String>> for TraceValue {
    fn from(v: Vec<String>) -> Self {
        TraceValue::List(v)
    }
}

/// One timestamped diagnostic record.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceRecord {
    pub time: SimTime,
    pub component: String,
    pub event: &'static str,
    pub fields: Vec<(&'static str, TraceValue)>,
}

impl TraceRecord {
    /// Start a record; time and component are filled in by the tracer.
    pub fn new(event: &'static str) -> Self {
        Self {
            time: SimTime::ZERO,
            component: String::new(),
            event,
            fields: Vec::new(),
        }
    }

    /// Append a field (builder style).
    pub fn field(mut self, key: &'static str, value: impl Into<TraceValue>) -> Self {
        self.fields.push((key, value.into()));
        self
    }

    /// Look up a field value by key.
    pub fn get(&self, key: &str) -> Option<&TraceValue> {
        self.fields.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={} [{}] {}", self.time, self.component, self.event)?;
        for (key, value) in &self.fields {
            write!(f, " {}={}", key, value)?;
        }
        Ok(())
    }
}

/// Trace settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Keep records in memory (see [`Tracer::records`]).
    pub capture: bool,
    /// Forward every record to `log::debug!` under [`TRACE_TARGET`].
    pub forward_to_log: bool,
    /// Also record one entry per kernel transition (verbose).
    pub kernel_events: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            capture: true,
            forward_to_log: true,
            kernel_events: false,
        }
    }
}

/// Collects trace records for one simulation run.
#[derive(Debug, Default)]
pub struct Tracer {
    config: TraceConfig,
    records: Vec<TraceRecord>,
}

impl Tracer {
    pub fn new(config: TraceConfig) -> Self {
        Self {
            config,
            records: Vec::new(),
        }
    }

    /// Tracer that drops everything.
    pub fn disabled() -> Self {
        Self::new(TraceConfig {
            capture: false,
            forward_to_log: false,
            kernel_events: false,
        })
    }

    pub fn kernel_events(&self) -> bool {
        self.config.kernel_events
    }

    /// Stamp and store/forward a record.
    pub fn emit(&mut self, time: SimTime, component: &str, mut record: TraceRecord) {
        if !self.config.capture && !self.config.forward_to_log {
            return;
        }
        record.time = time;
        record.component = component.to_string();
        if self.config.forward_to_log {
            log::debug!(target: TRACE_TARGET, "{}", record);
        }
        if self.config.capture {
            self.records.push(record);
        }
    }

    /// Captured records, in emission order.
    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    /// Captured records with the given event name.
    pub fn find<'a>(&'a self, event: &'a str) -> impl Iterator<Item = &'a TraceRecord> + 'a {
        self.records.iter().filter(move |r| r.event == event)
    }

    /// Remove and return all captured records.
    pub fn take_records(&mut self) -> Vec<TraceRecord> {
        std::mem::take(&mut self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_stamps_time_and_component() {
        let mut tracer = Tracer::new(TraceConfig::default());
        tracer.emit(
            SimTime::from_millis(100),
            "A",
            TraceRecord::new("dds_discovery_send").field("endpoints", 2usize),
        );

        let rec = &tracer.records()[0];
        assert_eq!(rec.time, SimTime::from_millis(100));
        assert_eq!(rec.component, "A");
        assert_eq!(rec.get("endpoints"), Some(&TraceValue::U64(2)));
        assert_eq!(
            rec.to_string(),
            "t=0.100000s [A] dds_discovery_send endpoints=2"
        );
    }

    #[test]
    fn test_disabled_tracer_keeps_nothing() {
        let mut tracer = Tracer::disabled();
        tracer.emit(SimTime::ZERO, "A", TraceRecord::new("x"));
        assert!(tracer.records().is_empty());
    }

    #[test]
    fn test_find_filters_by_event() {
        let mut tracer = Tracer::new(TraceConfig::default());
        tracer.emit(SimTime::ZERO, "A", TraceRecord::new("a"));
        tracer.emit(SimTime::ZERO, "B", TraceRecord::new("b"));
        tracer.emit(SimTime::ZERO, "C", TraceRecord::new("a"));
        assert_eq!(tracer.find("a").count(), 2);
        assert_eq!(tracer.take_records().len(), 3);
        assert!(tracer.records().is_empty());
    }
}
