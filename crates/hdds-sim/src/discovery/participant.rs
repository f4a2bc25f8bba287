// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Domain participant: discovery, matching and publication as one model.
//!
//! # Phases
//!
//! ```text
//! initializing --init_delay--> active <--> discovering   (announce endpoints)
//!                                 ^   <--> heartbeat     (refresh lease)
//!                                 |   <--> sending_data  (one sample per visit)
//!                              stopped (after Shutdown, passive)
//! ```
//!
//! In `active` the participant sleeps until the earliest of its next
//! announcement, next heartbeat, next lease sweep, or queued sample. Every
//! deadline is an absolute virtual time, so a zero-delay wake-up to flush
//! responses never shifts the periodic schedule.
//!
//! # Ports
//!
//! - `command_in`: [`Command`]s from the application
//! - `transport_in`: everything the transport delivers (all participants
//!   see all traffic and filter by destination)
//! - `data_out`: [`TransportMessage`]s for the transport
//! - `response_out`: [`Response`]s for the application

use super::command::{Command, Control, Response};
use super::database::DiscoveryDatabase;
use super::endpoint::{EndpointInfo, EndpointKind};
use super::guid::Guid;
use super::match_table::MatchTable;
use super::message::{DiscoveryMessage, Heartbeat};
use crate::config::DiscoveryConfig;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::kernel::{Context, InputBag, Model, OutputBag, PortName};
use crate::qos::{self, QosProfile, Reliability};
use crate::sample::{DataSample, SampleValue};
use crate::time::SimTime;
use crate::trace::TraceRecord;
use crate::transport::{DeliveryFailure, Payload, TransportMessage};
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

pub const COMMAND_IN: PortName = "command_in";
pub const TRANSPORT_IN: PortName = "transport_in";
pub const DATA_OUT: PortName = "data_out";
pub const RESPONSE_OUT: PortName = "response_out";

/// Lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Active,
    Discovering,
    Heartbeat,
    SendingData,
    Stopped,
}

impl Phase {
    pub const fn name(self) -> &'static str {
        match self {
            Phase::Initializing => "initializing",
            Phase::Active => "active",
            Phase::Discovering => "discovering",
            Phase::Heartbeat => "heartbeat",
            Phase::SendingData => "sending_data",
            Phase::Stopped => "stopped",
        }
    }

    /// Phases that end by emitting a message.
    const fn is_action(self) -> bool {
        matches!(
            self,
            Phase::Discovering | Phase::Heartbeat | Phase::SendingData
        )
    }
}

/// Running counters of one participant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParticipantStats {
    pub announcements_sent: u64,
    pub announcements_received: u64,
    pub heartbeats_sent: u64,
    pub samples_written: u64,
    pub samples_sent: u64,
    pub samples_received: u64,
    pub samples_expired: u64,
    pub writes_without_readers: u64,
    pub delivery_failures: u64,
    pub participants_expired: u64,
}

pub struct DomainParticipant {
    guid: Guid,
    config: DiscoveryConfig,
    phase: Phase,
    /// Time of the last transition.
    clock: SimTime,
    /// End of the current timed phase.
    phase_until: SimTime,
    next_discovery_at: SimTime,
    next_heartbeat_at: SimTime,
    next_sweep_at: SimTime,
    announcing: bool,
    local: BTreeMap<Guid, EndpointInfo>,
    next_entity_key: u32,
    /// Next sequence number per local writer (starts at 1).
    sequence_numbers: BTreeMap<Guid, u64>,
    db: DiscoveryDatabase,
    matches: MatchTable,
    /// Incompatible (writer, reader) pairs already reported.
    incompatible: BTreeSet<(Guid, Guid)>,
    outbound: VecDeque<TransportMessage>,
    responses: Vec<Response>,
    /// Records produced outside a transition, flushed at the next one.
    traces: Vec<TraceRecord>,
    stats: ParticipantStats,
}

impl DomainParticipant {
    pub fn new(guid: Guid, config: &DiscoveryConfig) -> Self {
        Self {
            guid: guid.participant_guid(),
            config: config.clone(),
            phase: Phase::Initializing,
            clock: SimTime::ZERO,
            phase_until: config.init_delay,
            next_discovery_at: SimTime::INFINITY,
            next_heartbeat_at: SimTime::INFINITY,
            next_sweep_at: SimTime::INFINITY,
            announcing: true,
            local: BTreeMap::new(),
            next_entity_key: 1,
            sequence_numbers: BTreeMap::new(),
            db: DiscoveryDatabase::new(),
            matches: MatchTable::new(),
            incompatible: BTreeSet::new(),
            outbound: VecDeque::new(),
            responses: Vec::new(),
            traces: Vec::new(),
            stats: ParticipantStats::default(),
        }
    }

    pub fn guid(&self) -> Guid {
        self.guid
    }

    pub fn domain_id(&self) -> u32 {
        self.config.domain_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn database(&self) -> &DiscoveryDatabase {
        &self.db
    }

    pub fn match_table(&self) -> &MatchTable {
        &self.matches
    }

    pub fn stats(&self) -> ParticipantStats {
        self.stats
    }

    /// Local writers and readers, in GUID order.
    pub fn local_endpoints(&self) -> impl Iterator<Item = &EndpointInfo> {
        self.local.values()
    }

    pub fn local_endpoint(&self, guid: &Guid) -> Option<&EndpointInfo> {
        self.local.get(guid)
    }

    /// Responses not yet emitted.
    pub fn pending_responses(&self) -> &[Response] {
        &self.responses
    }

    /// Samples waiting for the transport.
    pub fn pending_outbound(&self) -> usize {
        self.outbound.len()
    }

    // ------------------------------------------------------------------------
    // Endpoint management
    // ------------------------------------------------------------------------

    pub fn create_writer(&mut self, topic: &str, type_name: &str, qos: QosProfile) -> Result<Guid> {
        self.create_endpoint(EndpointKind::Writer, topic, type_name, qos)
    }

    pub fn create_reader(&mut self, topic: &str, type_name: &str, qos: QosProfile) -> Result<Guid> {
        self.create_endpoint(EndpointKind::Reader, topic, type_name, qos)
    }

    fn create_endpoint(
        &mut self,
        kind: EndpointKind,
        topic: &str,
        type_name: &str,
        qos: QosProfile,
    ) -> Result<Guid> {
        if self.phase == Phase::Stopped {
            return Err(Error::InvalidState("participant is shut down".to_string()));
        }
        if topic.is_empty() {
            return Err(Error::InvalidConfig("topic name must not be empty".to_string()));
        }
        qos.validate()?;

        let guid = self.guid.endpoint(self.next_entity_key, kind.entity_kind_byte());
        self.next_entity_key += 1;
        let info = EndpointInfo::new(guid, topic, type_name, kind, qos);

        log::debug!(
            "[discovery] {} created {} {} on '{}'",
            self.guid,
            kind,
            guid,
            topic
        );
        self.traces.push(
            TraceRecord::new("endpoint_created")
                .field("endpoint", guid)
                .field("kind", kind.to_string())
                .field("topic", topic),
        );
        self.responses.push(Response::EndpointCreated {
            guid,
            kind,
            topic: topic.to_string(),
        });

        if kind == EndpointKind::Writer {
            self.sequence_numbers.insert(guid, 1);
        }
        self.local.insert(guid, info.clone());
        self.match_local(&info);
        self.request_announcement();
        Ok(guid)
    }

    /// Remove a local endpoint and every match it took part in.
    pub fn delete_endpoint(&mut self, guid: Guid) -> Result<()> {
        if self.local.remove(&guid).is_none() {
            return Err(Error::EndpointNotFound(guid.to_string()));
        }
        self.sequence_numbers.remove(&guid);
        self.responses.push(Response::EndpointDeleted { guid });
        self.traces
            .push(TraceRecord::new("endpoint_deleted").field("endpoint", guid));
        self.unmatch_endpoint(&guid, true);
        self.request_announcement();
        Ok(())
    }

    /// Publish `value` on a local writer.
    ///
    /// Returns the assigned sequence number, or `None` when no reader is
    /// matched (the write is then a logged no-op).
    pub fn publish(&mut self, writer: Guid, value: SampleValue) -> Result<Option<u64>> {
        if self.phase == Phase::Stopped {
            return Err(Error::InvalidState("participant is shut down".to_string()));
        }
        let info = match self.local.get(&writer) {
            Some(info) if info.is_writer() => info.clone(),
            _ => return Err(Error::EndpointNotFound(writer.to_string())),
        };

        let readers = self.matches.matched(&writer);
        if readers.is_empty() {
            self.stats.writes_without_readers += 1;
            log::debug!(
                "[discovery] write by {} on '{}' skipped: no matched readers",
                writer,
                info.topic_name
            );
            self.traces.push(
                TraceRecord::new("write_no_readers")
                    .field("writer", writer)
                    .field("topic", info.topic_name.as_str()),
            );
            self.responses.push(Response::WriteComplete {
                writer,
                sequence_number: None,
                matched_readers: 0,
            });
            return Ok(None);
        }

        let counter = self.sequence_numbers.entry(writer).or_insert(1);
        let sequence_number = *counter;
        *counter += 1;

        let sample = DataSample {
            writer_guid: writer,
            topic_name: info.topic_name.clone(),
            sequence_number,
            source_timestamp: self.clock,
            lifespan: info.qos.lifespan,
            value,
        };

        // Same-process readers get their own message so it can ride shared memory.
        let (same_process, remote): (Vec<Guid>, Vec<Guid>) = readers
            .iter()
            .copied()
            .partition(|reader| reader.same_process(&self.guid));
        for destinations in [same_process, remote] {
            if destinations.is_empty() {
                continue;
            }
            self.outbound.push_back(TransportMessage::new(
                writer,
                destinations,
                info.qos.reliability,
                self.clock,
                Payload::Data(sample.clone()),
            ));
        }

        self.stats.samples_written += 1;
        self.traces.push(
            TraceRecord::new("data_written")
                .field("writer", writer)
                .field("topic", info.topic_name.as_str())
                .field("sequence_number", sequence_number)
                .field("readers", readers.len()),
        );
        self.responses.push(Response::WriteComplete {
            writer,
            sequence_number: Some(sequence_number),
            matched_readers: readers.len(),
        });
        Ok(Some(sequence_number))
    }

    fn request_announcement(&mut self) {
        if self.announcing {
            self.next_discovery_at = self.next_discovery_at.min(self.clock);
        }
    }

    // ------------------------------------------------------------------------
    // Matching
    // ------------------------------------------------------------------------

    /// Match a new local endpoint against known remotes and local peers.
    fn match_local(&mut self, local: &EndpointInfo) {
        let wanted = local.kind.opposite();
        let mut candidates: Vec<EndpointInfo> = self
            .db
            .endpoints_on_topic(&local.topic_name, wanted)
            .into_iter()
            .cloned()
            .collect();
        candidates.extend(
            self.local
                .values()
                .filter(|e| e.guid != local.guid && e.kind == wanted && e.topic_name == local.topic_name)
                .cloned(),
        );
        for candidate in &candidates {
            self.match_pair(local, candidate);
        }
    }

    /// Match a remote endpoint against local endpoints of the other kind.
    fn match_remote(&mut self, remote: &EndpointInfo) {
        let wanted = remote.kind.opposite();
        let locals: Vec<EndpointInfo> = self
            .local
            .values()
            .filter(|e| e.kind == wanted && e.topic_name == remote.topic_name)
            .cloned()
            .collect();
        for local in &locals {
            self.match_pair(local, remote);
        }
    }

    fn match_pair(&mut self, a: &EndpointInfo, b: &EndpointInfo) {
        let (writer, reader) = if a.is_writer() { (a, b) } else { (b, a) };
        if self.matches.is_matched(&writer.guid, &reader.guid) {
            return;
        }

        let result = qos::check(&writer.qos, &reader.qos);
        if !result.compatible {
            if self.incompatible.insert((writer.guid, reader.guid)) {
                log::debug!(
                    "[MATCH-QOS] writer {} / reader {} on '{}': {}",
                    writer.guid,
                    reader.guid,
                    writer.topic_name,
                    result.error_message()
                );
                self.traces.push(
                    TraceRecord::new("qos_incompatible")
                        .field("writer", writer.guid)
                        .field("reader", reader.guid)
                        .field("topic", writer.topic_name.as_str())
                        .field("violations", result.violation_names()),
                );
            }
            return;
        }

        for warning in &result.warnings {
            log::debug!("[MATCH-QOS] {} -> {}: {}", writer.guid, reader.guid, warning);
        }
        self.incompatible.remove(&(writer.guid, reader.guid));
        self.matches.insert(writer.guid, reader.guid);
        log::debug!(
            "[discovery] matched writer {} -> reader {} on '{}'",
            writer.guid,
            reader.guid,
            writer.topic_name
        );
        self.traces.push(
            TraceRecord::new("endpoint_matched")
                .field("writer", writer.guid)
                .field("reader", reader.guid)
                .field("topic", writer.topic_name.as_str()),
        );
        for (local, remote) in [(writer.guid, reader.guid), (reader.guid, writer.guid)] {
            if self.local.contains_key(&local) {
                self.responses.push(Response::Matched { local, remote });
            }
        }
    }

    /// Drop every match of `guid`, notifying the local side of each pair.
    fn unmatch_endpoint(&mut self, guid: &Guid, was_local: bool) {
        self.incompatible.retain(|(w, r)| w != guid && r != guid);
        for peer in self.matches.remove_endpoint(guid) {
            self.traces.push(
                TraceRecord::new("endpoint_unmatched")
                    .field("endpoint", *guid)
                    .field("peer", peer),
            );
            if was_local {
                self.responses.push(Response::Unmatched {
                    local: *guid,
                    remote: peer,
                });
            }
            if self.local.contains_key(&peer) {
                self.responses.push(Response::Unmatched {
                    local: peer,
                    remote: *guid,
                });
            }
        }
    }

    // ------------------------------------------------------------------------
    // Discovery traffic
    // ------------------------------------------------------------------------

    /// Announcement carrying every local endpoint.
    pub fn announcement(&self, at: SimTime) -> DiscoveryMessage {
        DiscoveryMessage {
            participant_guid: self.guid,
            domain_id: self.config.domain_id,
            endpoints: self.local.values().cloned().collect(),
            lease_duration: self.config.lease_duration,
            timestamp: at,
        }
    }

    pub fn heartbeat(&self, at: SimTime) -> Heartbeat {
        let (writers, readers): (Vec<&EndpointInfo>, Vec<&EndpointInfo>) =
            self.local.values().partition(|e| e.is_writer());
        Heartbeat {
            participant_guid: self.guid,
            timestamp: at,
            alive_writers: writers.into_iter().map(|e| e.guid).collect(),
            alive_readers: readers.into_iter().map(|e| e.guid).collect(),
        }
    }

    fn broadcast(&self, at: SimTime, payload: Payload) -> TransportMessage {
        TransportMessage::new(self.guid, Vec::new(), Reliability::BestEffort, at, payload)
    }

    fn on_discovery(&mut self, msg: &DiscoveryMessage, now: SimTime) {
        if msg.participant_guid == self.guid {
            return;
        }
        if msg.domain_id != self.config.domain_id {
            log::trace!(
                "[discovery] ignoring {} from domain {} (local domain {})",
                msg.participant_guid,
                msg.domain_id,
                self.config.domain_id
            );
            return;
        }

        self.stats.announcements_received += 1;
        let remote = msg.participant_guid;
        if self
            .db
            .upsert_participant(remote, msg.domain_id, msg.lease_duration, now)
        {
            log::debug!(
                "[discovery] {} discovered participant {} (lease {})",
                self.guid,
                remote,
                msg.lease_duration
            );
            self.traces.push(
                TraceRecord::new("participant_discovered")
                    .field("participant", remote)
                    .field("lease_duration", msg.lease_duration),
            );
        }

        // Endpoints no longer advertised are gone.
        let advertised: BTreeSet<Guid> = msg.endpoints.iter().map(|e| e.guid).collect();
        let stale: Vec<Guid> = self
            .db
            .endpoints_of(&remote)
            .into_iter()
            .map(|e| e.guid)
            .filter(|guid| !advertised.contains(guid))
            .collect();
        for guid in stale {
            self.db.remove_endpoint(&guid);
            self.traces.push(
                TraceRecord::new("endpoint_removed")
                    .field("participant", remote)
                    .field("endpoint", guid),
            );
            self.unmatch_endpoint(&guid, false);
        }

        for endpoint in &msg.endpoints {
            if endpoint.participant_guid != remote {
                log::warn!(
                    "[discovery] {} advertised foreign endpoint {}, skipped",
                    remote,
                    endpoint.guid
                );
                continue;
            }
            self.db.upsert_endpoint(endpoint.clone());
            self.match_remote(endpoint);
        }
    }

    fn on_heartbeat(&mut self, heartbeat: &Heartbeat, now: SimTime) {
        if heartbeat.participant_guid == self.guid {
            return;
        }
        if !self.db.refresh_lease(&heartbeat.participant_guid, now) {
            log::trace!(
                "[discovery] heartbeat from unknown participant {}",
                heartbeat.participant_guid
            );
        }
    }

    fn on_data(&mut self, msg: &TransportMessage, sample: &DataSample, now: SimTime) {
        let readers: Vec<Guid> = msg
            .destination_guids
            .iter()
            .filter(|guid| self.local.get(*guid).is_some_and(EndpointInfo::is_reader))
            .filter(|guid| self.matches.is_matched(&sample.writer_guid, guid))
            .copied()
            .collect();
        if readers.is_empty() {
            return;
        }

        if sample.lifespan.is_expired(sample.source_timestamp, now) {
            self.stats.samples_expired += readers.len() as u64;
            self.traces.push(
                TraceRecord::new("sample_expired")
                    .field("writer", sample.writer_guid)
                    .field("sequence_number", sample.sequence_number)
                    .field("age", now - sample.source_timestamp),
            );
            return;
        }

        for reader in readers {
            self.stats.samples_received += 1;
            self.traces.push(
                TraceRecord::new("data_received")
                    .field("reader", reader)
                    .field("writer", sample.writer_guid)
                    .field("sequence_number", sample.sequence_number)
                    .field("latency", now - sample.source_timestamp),
            );
            self.responses.push(Response::DataReceived {
                reader,
                writer: sample.writer_guid,
                sequence_number: sample.sequence_number,
                value: sample.value.clone(),
                source_timestamp: sample.source_timestamp,
                reception_timestamp: now,
            });
        }
    }

    fn on_delivery_failure(&mut self, failure: &DeliveryFailure) {
        let writer = failure.message.source_guid;
        if !self.local.contains_key(&writer) {
            return;
        }
        let sequence_number = match &failure.message.payload {
            Payload::Data(sample) => Some(sample.sequence_number),
            _ => None,
        };
        self.stats.delivery_failures += 1;
        log::debug!(
            "[discovery] {} lost sample {:?} after {} attempts over {}",
            writer,
            sequence_number,
            failure.attempts,
            failure.class
        );
        self.responses.push(Response::DeliveryFailed {
            writer,
            destinations: failure.message.destination_guids.clone(),
            sequence_number,
            attempts: failure.attempts,
        });
    }

    fn on_command(&mut self, command: &Command) {
        let outcome = match command {
            Command::CreateWriter {
                topic,
                type_name,
                qos,
            } => self.create_writer(topic, type_name, qos.clone()).map(|_| ()),
            Command::CreateReader {
                topic,
                type_name,
                qos,
            } => self.create_reader(topic, type_name, qos.clone()).map(|_| ()),
            Command::DeleteEndpoint { guid } => self.delete_endpoint(*guid),
            Command::Publish { writer, value } => self.publish(*writer, value.clone()).map(|_| ()),
            Command::Control(control) => {
                self.control(*control);
                Ok(())
            }
        };
        if let Err(e) = outcome {
            log::debug!("[discovery] {} rejected command: {}", self.guid, e);
            self.responses.push(Response::Rejected {
                reason: e.to_string(),
            });
        }
    }

    fn control(&mut self, control: Control) {
        match control {
            Control::Shutdown => {
                log::info!("[discovery] participant {} shut down", self.guid);
                self.phase = Phase::Stopped;
                self.announcing = false;
                self.outbound.clear();
                self.traces.push(TraceRecord::new("participant_shutdown"));
                self.responses.push(Response::ShutdownComplete);
            }
            Control::StopAnnouncing => {
                self.announcing = false;
                self.traces.push(TraceRecord::new("announcing_stopped"));
            }
            Control::ResumeAnnouncing => {
                if !self.announcing {
                    self.announcing = true;
                    self.next_discovery_at = self.clock;
                    self.next_heartbeat_at = self.clock + self.config.heartbeat_period;
                    self.traces.push(TraceRecord::new("announcing_resumed"));
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Lease sweep
    // ------------------------------------------------------------------------

    fn sweep(&mut self, now: SimTime) {
        for expired in self.db.sweep_expired(now) {
            self.stats.participants_expired += 1;
            log::debug!(
                "[discovery] {} lease of {} expired (last seen {})",
                self.guid,
                expired.guid,
                expired.last_seen
            );
            self.traces.push(
                TraceRecord::new("participant_expired")
                    .field("participant", expired.guid)
                    .field("last_seen", expired.last_seen)
                    .field("endpoints", expired.endpoints.len()),
            );
            for endpoint in &expired.endpoints {
                self.unmatch_endpoint(endpoint, false);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Scheduling
    // ------------------------------------------------------------------------

    fn has_pending_notifications(&self) -> bool {
        !self.responses.is_empty() || !self.traces.is_empty()
    }

    fn next_active_due(&self) -> SimTime {
        let mut due = self.next_sweep_at;
        if self.announcing {
            due = due.min(self.next_discovery_at).min(self.next_heartbeat_at);
        }
        if !self.outbound.is_empty() {
            due = due.min(self.clock);
        }
        due
    }

    /// Finish whatever was due at `now`. Its output has been emitted.
    fn complete(&mut self, now: SimTime) {
        self.responses.clear();
        match self.phase {
            Phase::Initializing if now >= self.phase_until => {
                self.phase = Phase::Active;
                if self.announcing {
                    self.next_discovery_at = now;
                    self.next_heartbeat_at = now + self.config.heartbeat_period;
                }
                self.next_sweep_at = now + self.config.lease_check_period;
                log::debug!(
                    "[discovery] participant {} active in domain {}",
                    self.guid,
                    self.config.domain_id
                );
                self.traces.push(
                    TraceRecord::new("participant_created")
                        .field("participant", self.guid)
                        .field("domain_id", self.config.domain_id),
                );
            }
            Phase::Discovering if now >= self.phase_until => {
                self.stats.announcements_sent += 1;
                self.traces.push(
                    TraceRecord::new("discovery_sent").field("endpoints", self.local.len()),
                );
                self.phase = Phase::Active;
            }
            Phase::Heartbeat if now >= self.phase_until => {
                self.stats.heartbeats_sent += 1;
                self.phase = Phase::Active;
            }
            Phase::SendingData if now >= self.phase_until => {
                if let Some(msg) = self.outbound.pop_front() {
                    self.stats.samples_sent += 1;
                    self.traces.push(
                        TraceRecord::new("data_sent")
                            .field("writer", msg.source_guid)
                            .field("destinations", msg.destination_guids.len())
                            .field("size", msg.payload_size),
                    );
                }
                self.phase = Phase::Active;
            }
            Phase::Active => self.start_due_action(now),
            _ => {}
        }
    }

    fn start_due_action(&mut self, now: SimTime) {
        if self.announcing && self.next_discovery_at <= now {
            self.phase = Phase::Discovering;
            self.phase_until = now + self.config.discovery_processing;
            self.next_discovery_at = now + self.config.discovery_period;
            return;
        }
        if self.announcing && self.next_heartbeat_at <= now {
            self.phase = Phase::Heartbeat;
            self.phase_until = now + self.config.heartbeat_processing;
            self.next_heartbeat_at = now + self.config.heartbeat_period;
            return;
        }
        if self.next_sweep_at <= now {
            self.sweep(now);
            // Anchored to the schedule, not to when the sweep actually ran.
            self.next_sweep_at += self.config.lease_check_period;
            if self.next_sweep_at <= now {
                self.next_sweep_at = now + self.config.lease_check_period;
            }
        }
        if !self.outbound.is_empty() {
            self.phase = Phase::SendingData;
            self.phase_until = now + self.config.send_processing;
        }
    }

    fn flush_traces(&mut self, ctx: &mut Context<'_>) {
        for record in std::mem::take(&mut self.traces) {
            ctx.trace(record);
        }
    }
}

impl Model for DomainParticipant {
    fn input_ports(&self) -> &'static [PortName] {
        &[COMMAND_IN, TRANSPORT_IN]
    }

    fn output_ports(&self) -> &'static [PortName] {
        &[DATA_OUT, RESPONSE_OUT]
    }

    fn time_advance(&self) -> SimTime {
        if self.has_pending_notifications() {
            return SimTime::ZERO;
        }
        match self.phase {
            Phase::Stopped => SimTime::INFINITY,
            Phase::Active => self.next_active_due() - self.clock,
            Phase::Initializing | Phase::Discovering | Phase::Heartbeat | Phase::SendingData => {
                self.phase_until - self.clock
            }
        }
    }

    fn output(&self, out: &mut OutputBag) {
        for response in &self.responses {
            out.push(RESPONSE_OUT, response.clone());
        }

        let at = self.clock + self.time_advance();
        if !self.phase.is_action() || at < self.phase_until {
            return;
        }
        match self.phase {
            Phase::Discovering => {
                out.push(
                    DATA_OUT,
                    self.broadcast(at, Payload::Discovery(self.announcement(at))),
                );
            }
            Phase::Heartbeat => {
                out.push(
                    DATA_OUT,
                    self.broadcast(at, Payload::Heartbeat(self.heartbeat(at))),
                );
            }
            Phase::SendingData => {
                if let Some(msg) = self.outbound.front() {
                    out.push(DATA_OUT, msg.clone());
                }
            }
            _ => {}
        }
    }

    fn internal_transition(&mut self, ctx: &mut Context<'_>) {
        let now = ctx.now();
        self.clock = now;
        self.complete(now);
        self.flush_traces(ctx);
    }

    fn external_transition(&mut self, ctx: &mut Context<'_>, elapsed: SimTime, inputs: &InputBag) {
        let now = ctx.now();
        let confluent = elapsed >= self.time_advance();
        self.clock = now;
        if confluent {
            self.complete(now);
        }

        if self.phase == Phase::Stopped {
            if !inputs.is_empty() {
                log::trace!("[discovery] {} stopped, dropping {} inputs", self.guid, inputs.len());
            }
            self.flush_traces(ctx);
            return;
        }

        for event in inputs.get(COMMAND_IN) {
            match event {
                Event::Command(command) => self.on_command(command),
                other => log::warn!("[discovery] unexpected {} on {}", other.kind(), COMMAND_IN),
            }
        }
        for event in inputs.get(TRANSPORT_IN) {
            match event {
                Event::Transport(msg) => match &msg.payload {
                    Payload::Discovery(announcement) => self.on_discovery(announcement, now),
                    Payload::Heartbeat(heartbeat) => self.on_heartbeat(heartbeat, now),
                    Payload::Data(sample) => self.on_data(msg, sample, now),
                },
                Event::DeliveryFailure(failure) => self.on_delivery_failure(failure),
                other => log::warn!("[discovery] unexpected {} on {}", other.kind(), TRANSPORT_IN),
            }
        }
        self.flush_traces(ctx);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
