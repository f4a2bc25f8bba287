// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML configuration files driving a full run.

#![cfg(feature = "config-loaders")]

use hdds_sim::config::SimConfig;
use hdds_sim::error::Error;
use hdds_sim::system::DomainBuilder;
use hdds_sim::time::SimTime;
use hdds_sim::transport::{LossModel, TransportClass};
use std::io::Write;

#[test]
fn test_load_file_and_run() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
kernel:
  seed: 99
  end_time: 1.0
discovery:
  domain_id: 3
  lease_duration: 2.0
trace:
  forward_to_log: false
transport:
  enable_shared_memory: false
  classes:
    multicast:
      latency: {{ min_latency: 0.0002 }}
    reliable:
      latency: {{ min_latency: 0.0002 }}
      loss: {{ kind: retransmit, probability: 0.0, max_attempts: 2, retry_interval: 0.01 }}
    best_effort:
      latency: {{ min_latency: 0.0002 }}
"#
    )
    .unwrap();

    let config = SimConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(config.kernel.seed, 99);
    assert_eq!(config.discovery.domain_id, 3);
    assert_eq!(config.discovery.lease_duration, SimTime::from_secs(2));
    assert!(!config.transport.enable_shared_memory);
    assert_eq!(
        config.transport.class(TransportClass::BestEffort).unwrap().loss,
        LossModel::None
    );

    let mut domain = DomainBuilder::new(config);
    domain.add_participant("a", 1, 1).unwrap();
    domain.add_participant("b", 2, 1).unwrap();
    let mut sim = domain.build_simulator().unwrap();
    let summary = sim.run().unwrap();
    assert!(summary.final_time <= SimTime::from_secs(1));
    assert!(sim.tracer().find("participant_discovered").count() >= 2);
    assert!(sim
        .model_names()
        .all(|name| name != "transport.shared_memory"));
}

#[test]
fn test_single_class_override_keeps_other_classes() {
    let yaml = r#"
kernel:
  seed: 7
  end_time: 5.0
discovery:
  discovery_period: 0.1
  lease_duration: 1.0
transport:
  enable_shared_memory: true
  classes:
    best_effort:
      latency: { min_latency: 0.0002 }
      loss: { kind: bernoulli, probability: 0.01 }
"#;
    let mut config = SimConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(
        config.transport.class(TransportClass::BestEffort).unwrap().loss,
        LossModel::Bernoulli { probability: 0.01 }
    );
    let defaults = SimConfig::default();
    for class in TransportClass::ALL {
        if class != TransportClass::BestEffort {
            assert_eq!(
                config.transport.class(class).unwrap(),
                defaults.transport.class(class).unwrap()
            );
        }
    }

    config.trace.forward_to_log = false;
    let mut domain = DomainBuilder::new(config);
    domain.add_participant("a", 1, 1).unwrap();
    domain.add_participant("b", 1, 1).unwrap();
    let mut sim = domain.build_simulator().unwrap();
    sim.run_until(SimTime::from_millis(500)).unwrap();
    assert!(sim
        .model_names()
        .any(|name| name == "transport.shared_memory"));
}

#[test]
fn test_round_trip_through_file() {
    let original = SimConfig::testing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("testing.yaml");
    std::fs::write(&path, original.to_yaml_string().unwrap()).unwrap();

    assert_eq!(SimConfig::from_yaml_file(&path).unwrap(), original);
}

#[test]
fn test_invalid_file_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "discovery:\n  discovery_period: 1.0\n  lease_duration: 0.5").unwrap();
    assert!(matches!(
        SimConfig::from_yaml_file(file.path()),
        Err(Error::InvalidConfig(_))
    ));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "kernel: [not, a, map]").unwrap();
    assert!(matches!(
        SimConfig::from_yaml_file(file.path()),
        Err(Error::ConfigParse(_))
    ));
}
