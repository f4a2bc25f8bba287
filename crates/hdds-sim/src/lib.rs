// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # hdds-sim - Discrete-event simulator for DDS / ROS 2 middleware
//!
//! Models a DDS domain (participants, discovery, QoS matching, transports)
//! as a hierarchy of DEVS models stepped in virtual time. Runs are
//! deterministic: the same models, configuration and seed always produce
//! the same event sequence.
//!
//! ## Quick Start
//!
//! ```rust
//! use hdds_sim::config::SimConfig;
//! use hdds_sim::discovery::Command;
//! use hdds_sim::qos::QosProfile;
//! use hdds_sim::sample::SampleValue;
//! use hdds_sim::system::DomainBuilder;
//! use hdds_sim::time::SimTime;
//!
//! fn main() -> hdds_sim::Result<()> {
//!     let mut domain = DomainBuilder::new(SimConfig::testing());
//!
//!     let talker = domain.add_participant("talker", 1, 100)?;
//!     let writer = talker.create_writer("/chatter", "std_msgs/String", QosProfile::default())?;
//!
//!     let listener = domain.add_participant("listener", 2, 200)?;
//!     listener.create_reader("/chatter", "std_msgs/String", QosProfile::default())?;
//!
//!     domain.schedule("talker", SimTime::from_millis(500), Command::Publish {
//!         writer,
//!         value: SampleValue::Text("hello".into()),
//!     })?;
//!
//!     let mut sim = domain.build_simulator()?;
//!     sim.run_until(SimTime::from_secs(1))?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                   Application (scripted sources)                    |
//! |        Command -> DomainParticipant -> Response                     |
//! +---------------------------------------------------------------------+
//! |                         Discovery Layer                             |
//! |   Announcements | Heartbeats | Leases | QoS matching | Match table  |
//! +---------------------------------------------------------------------+
//! |                         Transport Layer                             |
//! |   Router -> Shared Memory | Multicast | Reliable | Best Effort      |
//! +---------------------------------------------------------------------+
//! |                       Simulation Kernel                             |
//! |   Atomic / coupled models | virtual time | deterministic ordering   |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`kernel`] - models, coupling and the simulator (start here)
//! - [`qos`] - policies, presets and the compatibility checker
//! - [`discovery`] - participants, discovery database, match table
//! - [`transport`] - router, channels, latency and loss models
//! - [`system`] - domain assembly
//! - [`config`] - run configuration (YAML with `config-loaders`)
//! - [`trace`] - structured simulation records

/// Run configuration (kernel, discovery timing, transports, tracing).
pub mod config;
/// Participant discovery, leases and endpoint matching.
pub mod discovery;
/// Crate-wide error type.
pub mod error;
/// Events carried on model ports.
pub mod event;
/// DEVS kernel: models, coupled models, simulator.
pub mod kernel;
/// `QoS` policies and compatibility checking.
pub mod qos;
/// Application data samples.
pub mod sample;
/// Domain assembly from participants, transport and applications.
pub mod system;
/// Virtual time.
pub mod time;
/// Structured trace records.
pub mod trace;
/// Simulated transport classes.
pub mod transport;

pub use config::SimConfig;
pub use error::{Error, Result};
pub use event::Event;
pub use kernel::{Coupled, Model, RunSummary, Simulator, Termination};
pub use qos::{check, Compatibility, QosProfile};
pub use system::DomainBuilder;
pub use time::SimTime;
