// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Participant discovery and endpoint matching.
//!
//! Each [`DomainParticipant`] keeps its own view of the domain:
//!
//! - [`DiscoveryDatabase`]: remote participants (with leases) and their endpoints
//! - [`MatchTable`]: which local endpoints are matched with which peers
//!
//! Views converge through periodic [`DiscoveryMessage`] announcements and
//! [`Heartbeat`]s; participants that stop announcing are evicted once their
//! lease runs out.

pub mod command;
pub mod database;
pub mod endpoint;
pub mod guid;
pub mod match_table;
pub mod message;
pub mod participant;

pub use command::{Command, Control, Response};
pub use database::{DiscoveryDatabase, DiscoveryStats, ExpiredParticipant, ParticipantInfo, TopicStats};
pub use endpoint::{EndpointInfo, EndpointKind};
pub use guid::{Guid, ENTITYID_PARTICIPANT, ENTITY_KIND_READER, ENTITY_KIND_WRITER};
pub use match_table::MatchTable;
pub use message::{DiscoveryMessage, Heartbeat};
pub use participant::{DomainParticipant, ParticipantStats, Phase};
