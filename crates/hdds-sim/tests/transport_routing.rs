// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic

//! End-to-end transport class selection and failure reporting.

use hdds_sim::config::SimConfig;
use hdds_sim::discovery::{Command, Guid, Response};
use hdds_sim::error::Error;
use hdds_sim::event::Event;
use hdds_sim::kernel::{ExternalOutput, Simulator};
use hdds_sim::qos::QosProfile;
use hdds_sim::sample::SampleValue;
use hdds_sim::system::DomainBuilder;
use hdds_sim::time::SimTime;
use hdds_sim::transport::{LossModel, TransportChannel, TransportClass};

const PUBLISH_AT: SimTime = SimTime::from_millis(200);

fn quiet(mut config: SimConfig) -> SimConfig {
    config.trace.forward_to_log = false;
    config
}

fn received_by<'a>(outputs: &'a [ExternalOutput], participant: &str) -> Vec<&'a Response> {
    let port = format!("{}.responses", participant);
    outputs
        .iter()
        .filter(|o| o.port == port)
        .filter_map(|o| match &o.event {
            Event::Response(r @ Response::DataReceived { .. }) => Some(r),
            _ => None,
        })
        .collect()
}

fn channel_stats(sim: &Simulator, class: TransportClass) -> hdds_sim::transport::ChannelStats {
    sim.model::<TransportChannel>(&format!("transport.{}", class))
        .unwrap()
        .stats()
}

/// Writer in host 1 / process 100; one reader in the same process, one on host 2.
fn fan_out(config: SimConfig, qos: QosProfile) -> (Simulator, Guid, Guid, Guid) {
    let mut domain = DomainBuilder::new(quiet(config));
    let writer = domain
        .add_participant("talker", 1, 100)
        .unwrap()
        .create_writer("/imu", "sensor_msgs/Imu", qos.clone())
        .unwrap();
    let local_reader = domain
        .add_participant("local", 1, 100)
        .unwrap()
        .create_reader("/imu", "sensor_msgs/Imu", qos.clone())
        .unwrap();
    let remote_reader = domain
        .add_participant("remote", 2, 200)
        .unwrap()
        .create_reader("/imu", "sensor_msgs/Imu", qos)
        .unwrap();
    domain
        .schedule(
            "talker",
            PUBLISH_AT,
            Command::Publish {
                writer,
                value: SampleValue::Float64(9.81),
            },
        )
        .unwrap();

    let mut sim = domain.build_simulator().unwrap();
    sim.run_until(SimTime::from_millis(500)).unwrap();
    (sim, writer, local_reader, remote_reader)
}

fn lose_all_best_effort() -> SimConfig {
    let mut config = SimConfig::testing();
    config
        .transport
        .class_mut(TransportClass::BestEffort)
        .unwrap()
        .loss = LossModel::Bernoulli { probability: 1.0 };
    config
}

#[test]
fn test_same_process_delivery_ignores_best_effort_loss() {
    let (sim, writer, local_reader, _) = fan_out(lose_all_best_effort(), QosProfile::best_effort());

    let local = received_by(sim.outputs(), "local");
    assert_eq!(local.len(), 1);
    match local[0] {
        Response::DataReceived {
            reader,
            writer: from,
            sequence_number,
            value,
            source_timestamp,
            reception_timestamp,
        } => {
            assert_eq!(*reader, local_reader);
            assert_eq!(*from, writer);
            assert_eq!(*sequence_number, 1);
            assert_eq!(*value, SampleValue::Float64(9.81));
            assert!(reception_timestamp > source_timestamp);
        }
        other => panic!("unexpected {:?}", other),
    }

    // The remote copy rode best effort and was lost.
    assert!(received_by(sim.outputs(), "remote").is_empty());

    let shm = channel_stats(&sim, TransportClass::SharedMemory);
    assert_eq!(shm.accepted, 1);
    assert_eq!(shm.delivered, 1);
    let best_effort = channel_stats(&sim, TransportClass::BestEffort);
    assert_eq!(best_effort.accepted, 1);
    assert_eq!(best_effort.dropped, 1);
    assert_eq!(sim.tracer().find("message_dropped").count(), 1);
}

#[test]
fn test_without_shared_memory_same_process_uses_network() {
    let mut config = lose_all_best_effort();
    config.transport.enable_shared_memory = false;
    config.transport.classes.remove(&TransportClass::SharedMemory);
    let (sim, ..) = fan_out(config, QosProfile::best_effort());

    assert!(received_by(sim.outputs(), "local").is_empty());
    assert!(received_by(sim.outputs(), "remote").is_empty());
    assert!(sim
        .model::<TransportChannel>("transport.shared_memory")
        .is_none());
    // Both copies (same-process and remote) went best effort and were lost.
    let best_effort = channel_stats(&sim, TransportClass::BestEffort);
    assert_eq!(best_effort.accepted, 2);
    assert_eq!(best_effort.dropped, 2);
}

#[test]
fn test_reliable_class_carries_reliable_writers() {
    let (sim, ..) = fan_out(SimConfig::testing(), QosProfile::reliable());

    assert_eq!(received_by(sim.outputs(), "local").len(), 1);
    assert_eq!(received_by(sim.outputs(), "remote").len(), 1);
    assert_eq!(channel_stats(&sim, TransportClass::Reliable).delivered, 1);
    assert_eq!(channel_stats(&sim, TransportClass::BestEffort).accepted, 0);
    // Discovery went multicast, never through the data classes.
    assert!(channel_stats(&sim, TransportClass::Multicast).delivered > 0);
}

#[test]
fn test_reliable_give_up_reported_to_writer() {
    let mut config = SimConfig::testing();
    config
        .transport
        .class_mut(TransportClass::Reliable)
        .unwrap()
        .loss = LossModel::Retransmit {
        probability: 1.0,
        max_attempts: 3,
        retry_interval: SimTime::from_millis(10),
    };
    let (sim, writer, _, remote_reader) = fan_out(config, QosProfile::reliable());

    assert!(received_by(sim.outputs(), "remote").is_empty());
    // The same-process reader is unaffected.
    assert_eq!(received_by(sim.outputs(), "local").len(), 1);

    let failures: Vec<(&ExternalOutput, &Response)> = sim
        .outputs()
        .iter()
        .filter(|o| o.port == "talker.responses")
        .filter_map(|o| match &o.event {
            Event::Response(r @ Response::DeliveryFailed { .. }) => Some((o, r)),
            _ => None,
        })
        .collect();
    assert_eq!(failures.len(), 1);

    let (output, failure) = failures[0];
    assert_eq!(
        *failure,
        Response::DeliveryFailed {
            writer,
            destinations: vec![remote_reader],
            sequence_number: Some(1),
            attempts: 3,
        }
    );
    // Reported only after every retry interval has passed.
    assert!(output.time >= PUBLISH_AT + SimTime::from_millis(30));

    let stats = channel_stats(&sim, TransportClass::Reliable);
    assert_eq!(stats.failures, 1);
    assert_eq!(stats.retransmissions, 2);
}

#[test]
fn test_missing_class_is_unroutable() {
    let mut config = SimConfig::testing();
    config.transport.classes.remove(&TransportClass::Reliable);

    let mut domain = DomainBuilder::new(quiet(config));
    domain.add_participant("a", 1, 1).unwrap();
    match domain.build() {
        Err(Error::UnroutableClass(class)) => assert_eq!(class, TransportClass::Reliable),
        Err(other) => panic!("unexpected error {}", other),
        Ok(_) => panic!("built without a reliable channel"),
    }
}
