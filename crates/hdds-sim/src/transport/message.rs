// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Messages exchanged between participants and the transport layer.

use crate::discovery::{DiscoveryMessage, Guid, Heartbeat};
use crate::qos::Reliability;
use crate::sample::DataSample;
use crate::time::SimTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Delivery class selected by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportClass {
    /// Same-process delivery, lossless.
    SharedMemory,
    /// Discovery traffic.
    Multicast,
    /// Retransmitting unicast (TCP-like).
    Reliable,
    /// Plain unicast, may drop.
    BestEffort,
}

impl TransportClass {
    pub const ALL: [TransportClass; 4] = [
        TransportClass::SharedMemory,
        TransportClass::Multicast,
        TransportClass::Reliable,
        TransportClass::BestEffort,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            TransportClass::SharedMemory => "shared_memory",
            TransportClass::Multicast => "multicast",
            TransportClass::Reliable => "reliable",
            TransportClass::BestEffort => "best_effort",
        }
    }
}

impl fmt::Display for TransportClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a transport message carries.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Discovery(DiscoveryMessage),
    Heartbeat(Heartbeat),
    Data(DataSample),
}

impl Payload {
    pub fn is_discovery(&self) -> bool {
        matches!(self, Payload::Discovery(_) | Payload::Heartbeat(_))
    }

    pub fn encoded_len(&self) -> usize {
        match self {
            Payload::Discovery(msg) => msg.encoded_len(),
            Payload::Heartbeat(hb) => hb.encoded_len(),
            Payload::Data(sample) => sample.encoded_len(),
        }
    }
}

/// Unit handed to the transport layer.
///
/// An empty `destination_guids` list means "everyone" (discovery broadcast).
#[derive(Debug, Clone, PartialEq)]
pub struct TransportMessage {
    pub source_guid: Guid,
    pub destination_guids: Vec<Guid>,
    pub payload_size: usize,
    pub reliability: Reliability,
    /// Filled in by the router.
    pub transport_class: Option<TransportClass>,
    pub timestamp: SimTime,
    pub payload: Payload,
}

impl TransportMessage {
    /// Build a message, sizing it from the payload.
    pub fn new(
        source_guid: Guid,
        destination_guids: Vec<Guid>,
        reliability: Reliability,
        timestamp: SimTime,
        payload: Payload,
    ) -> Self {
        Self {
            source_guid,
            destination_guids,
            payload_size: payload.encoded_len(),
            reliability,
            transport_class: None,
            timestamp,
            payload,
        }
    }
}

/// Report that the reliable class gave up on a message.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryFailure {
    pub message: TransportMessage,
    pub class: TransportClass,
    pub attempts: u32,
}
