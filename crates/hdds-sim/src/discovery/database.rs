// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Discovery database: remote participants, their endpoints, and a topic index.
//!
//! Every map is ordered so iteration (and therefore matching order) does not
//! depend on hashing. Removing a participant cascades to its endpoints; the
//! caller is responsible for cascading further into the match table.

use super::endpoint::{EndpointInfo, EndpointKind};
use super::guid::Guid;
use crate::time::SimTime;
use std::collections::{BTreeMap, BTreeSet};

/// A remote participant and its lease.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantInfo {
    pub guid: Guid,
    pub domain_id: u32,
    pub lease_duration: SimTime,
    /// Absolute time after which the participant is considered gone.
    pub lease_expiry: SimTime,
    pub last_seen: SimTime,
    /// Endpoints currently advertised by this participant.
    pub endpoints: BTreeSet<Guid>,
}

impl ParticipantInfo {
    /// Strictly past the lease expiry.
    pub fn is_expired(&self, now: SimTime) -> bool {
        now > self.lease_expiry
    }

    /// Extend the lease from `now`.
    pub fn refresh(&mut self, now: SimTime) {
        self.last_seen = now;
        self.lease_expiry = now + self.lease_duration;
    }
}

/// A participant removed by a lease sweep, with the endpoints it took along.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredParticipant {
    pub guid: Guid,
    pub last_seen: SimTime,
    pub endpoints: Vec<Guid>,
}

/// Writer/reader counts for one topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TopicStats {
    pub writers: usize,
    pub readers: usize,
}

/// Snapshot of database contents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiscoveryStats {
    pub participants: usize,
    pub endpoints: usize,
    pub topics: usize,
    pub per_topic: BTreeMap<String, TopicStats>,
}

#[derive(Debug, Clone, Default)]
pub struct DiscoveryDatabase {
    participants: BTreeMap<Guid, ParticipantInfo>,
    endpoints: BTreeMap<Guid, EndpointInfo>,
    topics: BTreeMap<String, BTreeSet<Guid>>,
}

impl DiscoveryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or refresh a participant. Returns `true` if it was unknown.
    pub fn upsert_participant(
        &mut self,
        guid: Guid,
        domain_id: u32,
        lease_duration: SimTime,
        now: SimTime,
    ) -> bool {
        match self.participants.get_mut(&guid) {
            Some(info) => {
                info.domain_id = domain_id;
                info.lease_duration = lease_duration;
                info.refresh(now);
                false
            }
            None => {
                self.participants.insert(
                    guid,
                    ParticipantInfo {
                        guid,
                        domain_id,
                        lease_duration,
                        lease_expiry: now + lease_duration,
                        last_seen: now,
                        endpoints: BTreeSet::new(),
                    },
                );
                true
            }
        }
    }

    /// Refresh the lease of a known participant. Returns `false` if unknown.
    pub fn refresh_lease(&mut self, guid: &Guid, now: SimTime) -> bool {
        match self.participants.get_mut(guid) {
            Some(info) => {
                info.refresh(now);
                true
            }
            None => false,
        }
    }

    /// Insert or update an endpoint. Returns `true` if it was unknown.
    ///
    /// The owning participant must already be present; otherwise the
    /// endpoint is still stored but not attached to any lease.
    pub fn upsert_endpoint(&mut self, info: EndpointInfo) -> bool {
        let guid = info.guid;
        if let Some(participant) = self.participants.get_mut(&info.participant_guid) {
            participant.endpoints.insert(guid);
        }
        let previous = self.endpoints.insert(guid, info.clone());
        if let Some(old) = &previous {
            if old.topic_name != info.topic_name {
                self.unindex(&old.topic_name, &guid);
            }
        }
        self.topics
            .entry(info.topic_name)
            .or_default()
            .insert(guid);
        previous.is_none()
    }

    pub fn remove_endpoint(&mut self, guid: &Guid) -> Option<EndpointInfo> {
        let info = self.endpoints.remove(guid)?;
        self.unindex(&info.topic_name, guid);
        if let Some(participant) = self.participants.get_mut(&info.participant_guid) {
            participant.endpoints.remove(guid);
        }
        Some(info)
    }

    /// Remove a participant and every endpoint it advertised.
    ///
    /// Returns the removed endpoint GUIDs (empty if the participant was unknown).
    pub fn remove_participant(&mut self, guid: &Guid) -> Vec<Guid> {
        let Some(info) = self.participants.remove(guid) else {
            return Vec::new();
        };
        let mut removed = Vec::with_capacity(info.endpoints.len());
        for endpoint in &info.endpoints {
            if let Some(ep) = self.endpoints.remove(endpoint) {
                self.unindex(&ep.topic_name, endpoint);
                removed.push(*endpoint);
            }
        }
        removed
    }

    /// Remove every participant whose lease expired strictly before `now`.
    pub fn sweep_expired(&mut self, now: SimTime) -> Vec<ExpiredParticipant> {
        let expired: Vec<(Guid, SimTime)> = self
            .participants
            .values()
            .filter(|info| info.is_expired(now))
            .map(|info| (info.guid, info.last_seen))
            .collect();

        expired
            .into_iter()
            .map(|(guid, last_seen)| ExpiredParticipant {
                guid,
                last_seen,
                endpoints: self.remove_participant(&guid),
            })
            .collect()
    }

    pub fn participant(&self, guid: &Guid) -> Option<&ParticipantInfo> {
        self.participants.get(guid)
    }

    pub fn contains_participant(&self, guid: &Guid) -> bool {
        self.participants.contains_key(guid)
    }

    pub fn participants(&self) -> impl Iterator<Item = &ParticipantInfo> {
        self.participants.values()
    }

    pub fn endpoint(&self, guid: &Guid) -> Option<&EndpointInfo> {
        self.endpoints.get(guid)
    }

    /// Endpoints advertised by one participant, in GUID order.
    pub fn endpoints_of(&self, participant: &Guid) -> Vec<&EndpointInfo> {
        self.participants
            .get(participant)
            .map(|info| {
                info.endpoints
                    .iter()
                    .filter_map(|g| self.endpoints.get(g))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Endpoints of `kind` on `topic`, in GUID order.
    pub fn endpoints_on_topic(&self, topic: &str, kind: EndpointKind) -> Vec<&EndpointInfo> {
        self.topics
            .get(topic)
            .map(|guids| {
                guids
                    .iter()
                    .filter_map(|g| self.endpoints.get(g))
                    .filter(|ep| ep.kind == kind)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn writers_for_topic(&self, topic: &str) -> Vec<&EndpointInfo> {
        self.endpoints_on_topic(topic, EndpointKind::Writer)
    }

    pub fn readers_for_topic(&self, topic: &str) -> Vec<&EndpointInfo> {
        self.endpoints_on_topic(topic, EndpointKind::Reader)
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    pub fn statistics(&self) -> DiscoveryStats {
        let per_topic = self
            .topics
            .iter()
            .map(|(topic, guids)| {
                let mut stats = TopicStats::default();
                for ep in guids.iter().filter_map(|g| self.endpoints.get(g)) {
                    match ep.kind {
                        EndpointKind::Writer => stats.writers += 1,
                        EndpointKind::Reader => stats.readers += 1,
                    }
                }
                (topic.clone(), stats)
            })
            .collect();

        DiscoveryStats {
            participants: self.participants.len(),
            endpoints: self.endpoints.len(),
            topics: self.topics.len(),
            per_topic,
        }
    }

    fn unindex(&mut self, topic: &str, guid: &Guid) {
        if let Some(set) = self.topics.get_mut(topic) {
            set.remove(guid);
            if set.is_empty() {
                self.topics.remove(topic);
            }
        }
    }
}
