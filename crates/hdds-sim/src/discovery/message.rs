// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Discovery announcements and heartbeats.

use super::endpoint::EndpointInfo;
use super::guid::Guid;
use crate::time::SimTime;

/// Fixed part of an announcement (header, GUID, domain, lease, timestamp).
const ANNOUNCEMENT_HEADER_LEN: usize = 20 + 16 + 4 + 8 + 8;
const HEARTBEAT_HEADER_LEN: usize = 20 + 16 + 8 + 8;

/// Periodic participant announcement carrying its full endpoint list.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryMessage {
    pub participant_guid: Guid,
    pub domain_id: u32,
    pub endpoints: Vec<EndpointInfo>,
    pub lease_duration: SimTime,
    pub timestamp: SimTime,
}

impl DiscoveryMessage {
    pub fn encoded_len(&self) -> usize {
        ANNOUNCEMENT_HEADER_LEN
            + self
                .endpoints
                .iter()
                .map(EndpointInfo::encoded_len)
                .sum::<usize>()
    }
}

/// Liveliness assertion listing the sender's alive endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heartbeat {
    pub participant_guid: Guid,
    pub timestamp: SimTime,
    pub alive_writers: Vec<Guid>,
    pub alive_readers: Vec<Guid>,
}

impl Heartbeat {
    pub fn encoded_len(&self) -> usize {
        HEARTBEAT_HEADER_LEN + 16 * (self.alive_writers.len() + self.alive_readers.len())
    }
}
