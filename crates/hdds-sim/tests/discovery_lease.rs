// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic

//! Lease expiry between two participants.
//!
//! A and B announce every 100 ms with a 1 s lease. Once B goes quiet, A must
//! evict it more than 1.0 s but at most 1.1 s after it last heard from B.

use hdds_sim::config::SimConfig;
use hdds_sim::discovery::{Command, Control, DomainParticipant, Guid, Response};
use hdds_sim::event::Event;
use hdds_sim::kernel::Simulator;
use hdds_sim::qos::QosProfile;
use hdds_sim::system::DomainBuilder;
use hdds_sim::time::SimTime;
use hdds_sim::trace::{TraceRecord, TraceValue};

const QUIET_AT: SimTime = SimTime::from_secs(2);

fn config() -> SimConfig {
    let mut config = SimConfig::testing();
    config.trace.forward_to_log = false;
    assert_eq!(config.discovery.discovery_period, SimTime::from_millis(100));
    assert_eq!(config.discovery.lease_duration, SimTime::from_secs(1));
    config
}

/// Build A and B, make B go quiet with `control` at 2 s, run to 4 s.
fn run_with(control: Control) -> (Simulator, Guid, Guid) {
    let mut domain = DomainBuilder::new(config());
    let a = domain.add_participant("a", 1, 100).unwrap().guid();
    let b = domain.add_participant("b", 2, 200).unwrap().guid();
    domain.schedule("b", QUIET_AT, Command::Control(control)).unwrap();

    let mut sim = domain.build_simulator().unwrap();
    sim.run_until(SimTime::from_secs(4)).unwrap();
    (sim, a, b)
}

fn expiry_of<'a>(sim: &'a Simulator, observer: &str, gone: Guid) -> Option<&'a TraceRecord> {
    sim.tracer()
        .find("participant_expired")
        .find(|r| r.component == observer && r.get("participant") == Some(&TraceValue::Guid(gone)))
}

fn assert_evicted_in_window(sim: &Simulator, b: Guid) {
    let record = expiry_of(sim, "a", b).expect("b never expired in a");
    let Some(TraceValue::Time(last_seen)) = record.get("last_seen") else {
        panic!("participant_expired without last_seen: {}", record);
    };
    let silence = record.time - *last_seen;

    assert!(
        silence > SimTime::from_secs(1) && silence <= SimTime::from_millis(1100),
        "evicted after {} of silence",
        silence
    );
    // B's last message left at or before it went quiet.
    assert!(*last_seen <= QUIET_AT + SimTime::from_millis(5));
    assert!(*last_seen > QUIET_AT - SimTime::from_millis(200));

    let a: &DomainParticipant = sim.model("a").unwrap();
    assert!(!a.database().contains_participant(&b));
    assert_eq!(a.stats().participants_expired, 1);
}

#[test]
fn test_quiet_peer_evicted_within_lease_window() {
    let (sim, a, b) = run_with(Control::StopAnnouncing);

    // They did find each other first.
    assert!(sim
        .tracer()
        .find("participant_discovered")
        .any(|r| r.component == "a" && r.get("participant") == Some(&TraceValue::Guid(b))));
    assert!(sim
        .tracer()
        .find("participant_discovered")
        .any(|r| r.component == "b" && r.get("participant") == Some(&TraceValue::Guid(a))));

    assert_evicted_in_window(&sim, b);

    // B keeps hearing A, so A stays in B's database.
    let b_model: &DomainParticipant = sim.model("b").unwrap();
    assert!(b_model.database().contains_participant(&a));
    assert!(expiry_of(&sim, "b", a).is_none());
}

#[test]
fn test_shutdown_peer_evicted_within_lease_window() {
    let (sim, _a, b) = run_with(Control::Shutdown);
    assert_evicted_in_window(&sim, b);

    assert!(sim.outputs().iter().any(|o| o.port == "b.responses"
        && matches!(o.event, Event::Response(Response::ShutdownComplete))));
}

#[test]
fn test_peer_kept_while_announcing() {
    let mut domain = DomainBuilder::new(config());
    domain.add_participant("a", 1, 100).unwrap();
    let b = domain.add_participant("b", 2, 200).unwrap().guid();
    let mut sim = domain.build_simulator().unwrap();
    sim.run_until(SimTime::from_secs(4)).unwrap();

    assert!(expiry_of(&sim, "a", b).is_none());
    let a: &DomainParticipant = sim.model("a").unwrap();
    let info = a.database().participant(&b).unwrap();
    assert!(sim.now() - info.last_seen <= SimTime::from_millis(200));
}

#[test]
fn test_eviction_unmatches_endpoints() {
    let mut domain = DomainBuilder::new(config());
    let writer = domain
        .add_participant("a", 1, 100)
        .unwrap()
        .create_writer("/status", "std_msgs/String", QosProfile::default())
        .unwrap();
    let reader = domain
        .add_participant("b", 2, 200)
        .unwrap()
        .create_reader("/status", "std_msgs/String", QosProfile::default())
        .unwrap();
    domain
        .schedule("b", QUIET_AT, Command::Control(Control::StopAnnouncing))
        .unwrap();

    let mut sim = domain.build_simulator().unwrap();
    sim.run_until(SimTime::from_secs(1)).unwrap();
    {
        let a: &DomainParticipant = sim.model("a").unwrap();
        assert!(a.match_table().is_matched(&writer, &reader));
    }

    sim.run_until(SimTime::from_secs(4)).unwrap();
    let a: &DomainParticipant = sim.model("a").unwrap();
    assert!(!a.match_table().is_matched(&writer, &reader));
    assert!(sim.outputs().iter().any(|o| o.port == "a.responses"
        && o.event
            == Event::Response(Response::Unmatched {
                local: writer,
                remote: reader,
            })));
}
