// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::needless_pass_by_value)] // Test functions

//! QoS compatibility, from the checker up to discovery matching.

use hdds_sim::config::SimConfig;
use hdds_sim::discovery::{DomainParticipant, Response};
use hdds_sim::event::Event;
use hdds_sim::kernel::Simulator;
use hdds_sim::qos::{
    check, Deadline, Durability, History, Lifespan, Liveliness, Ownership, Partition, PolicyKind,
    QosProfile, Reliability,
};
use hdds_sim::system::DomainBuilder;
use hdds_sim::time::SimTime;
use hdds_sim::trace::TraceValue;
use proptest::prelude::*;

/// Writer on host 1, reader on host 2, same topic; runs 300 ms.
fn pair(topic: &str, offered: QosProfile, requested: QosProfile) -> Simulator {
    let mut config = SimConfig::testing();
    config.trace.forward_to_log = false;
    let mut domain = DomainBuilder::new(config);
    domain
        .add_participant("writer_side", 1, 100)
        .unwrap()
        .create_writer(topic, "nav_msgs/OccupancyGrid", offered)
        .unwrap();
    domain
        .add_participant("reader_side", 2, 200)
        .unwrap()
        .create_reader(topic, "nav_msgs/OccupancyGrid", requested)
        .unwrap();
    let mut sim = domain.build_simulator().unwrap();
    sim.run_until(SimTime::from_millis(300)).unwrap();
    sim
}

fn matched_count(sim: &Simulator, port: &str) -> usize {
    sim.outputs()
        .iter()
        .filter(|o| o.port == port)
        .filter(|o| matches!(o.event, Event::Response(Response::Matched { .. })))
        .count()
}

#[test]
fn test_latched_map_writer_serves_best_effort_reader() {
    let writer = QosProfile::map();
    let reader = QosProfile::best_effort().keep_last(1);
    assert_eq!(writer.reliability, Reliability::Reliable);
    assert_eq!(writer.durability, Durability::TransientLocal);
    assert_eq!(writer.history, History::KeepLast(1));

    let result = check(&writer, &reader);
    assert!(result.compatible, "{}", result.error_message());
    assert!(result.violations.is_empty());

    let sim = pair("/map", writer, reader);
    assert_eq!(matched_count(&sim, "writer_side.responses"), 1);
    assert_eq!(matched_count(&sim, "reader_side.responses"), 1);
}

#[test]
fn test_best_effort_writer_cannot_serve_reliable_reader() {
    let result = check(&QosProfile::best_effort(), &QosProfile::reliable());
    assert!(!result.compatible);
    assert_eq!(result.violations, vec![PolicyKind::Reliability]);
    assert_eq!(result.violation_names(), vec!["reliability".to_string()]);

    let sim = pair("/chatter", QosProfile::best_effort(), QosProfile::reliable());
    assert_eq!(matched_count(&sim, "writer_side.responses"), 0);
    assert_eq!(matched_count(&sim, "reader_side.responses"), 0);

    // Both sides notice, each exactly once despite repeated announcements.
    let incompatible: Vec<_> = sim.tracer().find("qos_incompatible").collect();
    assert_eq!(incompatible.len(), 2);
    for record in incompatible {
        assert_eq!(
            record.get("violations"),
            Some(&TraceValue::List(vec!["reliability".to_string()]))
        );
    }

    let writer_side: &DomainParticipant = sim.model("writer_side").unwrap();
    assert!(writer_side.match_table().is_empty());
}

#[test]
fn test_presets_by_name() {
    assert_eq!(QosProfile::preset("map"), Some(QosProfile::map()));
    assert_eq!(QosProfile::preset("default"), Some(QosProfile::system_default()));
    assert_eq!(QosProfile::preset("nope"), None);

    // Sensor streams are lossy: a reliable subscriber refuses them.
    let result = check(&QosProfile::sensor_data(), &QosProfile::reliable());
    assert!(result.violations.contains(&PolicyKind::Reliability));
}

#[test]
fn test_partitions_gate_matching_end_to_end() {
    let offered = QosProfile::reliable().with_partition(Partition::single("robot_1"));
    let requested = QosProfile::reliable().with_partition(Partition::single("robot_*"));
    let sim = pair("/odom", offered, requested);
    assert_eq!(matched_count(&sim, "reader_side.responses"), 1);

    let offered = QosProfile::reliable().with_partition(Partition::single("robot_1"));
    let requested = QosProfile::reliable().with_partition(Partition::single("drone_*"));
    let sim = pair("/odom", offered, requested);
    assert_eq!(matched_count(&sim, "reader_side.responses"), 0);
}

// ============================================================================
// Properties
// ============================================================================

fn durability() -> impl Strategy<Value = Durability> {
    prop::sample::select(Durability::ALL.to_vec())
}

fn time_or_infinite() -> impl Strategy<Value = SimTime> {
    prop_oneof![
        Just(SimTime::INFINITY),
        (1u64..10_000).prop_map(SimTime::from_millis),
    ]
}

prop_compose! {
    fn profile()(
        reliable in any::<bool>(),
        durability in durability(),
        depth in prop::option::of(1u32..100),
        deadline in time_or_infinite(),
        lifespan in time_or_infinite(),
        lease in time_or_infinite(),
        manual in any::<bool>(),
        exclusive in any::<bool>(),
        partition in prop::option::of("[a-z]{1,8}"),
    ) -> QosProfile {
        QosProfile {
            reliability: if reliable { Reliability::Reliable } else { Reliability::BestEffort },
            durability,
            history: depth.map_or(History::KeepAll, History::KeepLast),
            deadline: Deadline::new(deadline),
            lifespan: Lifespan::new(lifespan),
            liveliness: if manual {
                Liveliness::manual_by_topic(lease)
            } else {
                Liveliness::automatic(lease)
            },
            ownership: if exclusive { Ownership::Exclusive } else { Ownership::Shared },
            partition: partition.map_or_else(Partition::default, |p| Partition::single(&p)),
        }
    }
}

proptest! {
    #[test]
    fn prop_profile_compatible_with_itself(p in profile()) {
        let result = check(&p, &p);
        prop_assert!(result.compatible, "{:?}: {}", p, result.error_message());
    }

    #[test]
    fn prop_durability_violation_iff_offered_weaker(
        base in profile(),
        offered in durability(),
        requested in durability(),
    ) {
        let writer = base.clone().with_durability(offered);
        let reader = base.with_durability(requested);
        let result = check(&writer, &reader);
        prop_assert_eq!(
            result.violations.contains(&PolicyKind::Durability),
            offered.rank() < requested.rank()
        );
    }

    #[test]
    fn prop_stronger_offer_never_loses_compatibility(
        base in profile(),
        requested in durability(),
    ) {
        // Raising the writer's durability can only remove violations.
        let reader = base.clone().with_durability(requested);
        let mut previous_ok = false;
        for offered in Durability::ALL {
            let ok = check(&base.clone().with_durability(offered), &reader).compatible;
            prop_assert!(!previous_ok || ok);
            previous_ok = ok;
        }
    }

    #[test]
    fn prop_warnings_never_block(writer in profile(), reader in profile()) {
        let result = check(&writer, &reader);
        prop_assert_eq!(result.compatible, result.violations.is_empty());
    }
}
