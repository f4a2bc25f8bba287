// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Application-facing requests and notifications of a domain participant.

use super::endpoint::EndpointKind;
use super::guid::Guid;
use crate::qos::QosProfile;
use crate::sample::SampleValue;
use crate::time::SimTime;

/// Request sent to a participant's command port.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateWriter {
        topic: String,
        type_name: String,
        qos: QosProfile,
    },
    CreateReader {
        topic: String,
        type_name: String,
        qos: QosProfile,
    },
    DeleteEndpoint {
        guid: Guid,
    },
    Publish {
        writer: Guid,
        value: SampleValue,
    },
    Control(Control),
}

/// Lifecycle control of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Stop everything; the participant becomes passive.
    Shutdown,
    /// Keep running but stop sending discovery and heartbeats.
    StopAnnouncing,
    ResumeAnnouncing,
}

/// Notification emitted on a participant's response port.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    EndpointCreated {
        guid: Guid,
        kind: EndpointKind,
        topic: String,
    },
    EndpointDeleted {
        guid: Guid,
    },
    /// A command could not be honored (bad QoS, unknown writer...).
    Rejected {
        reason: String,
    },
    /// Outcome of a publish. `sequence_number` is `None` when no reader
    /// was matched and nothing was sent.
    WriteComplete {
        writer: Guid,
        sequence_number: Option<u64>,
        matched_readers: usize,
    },
    Matched {
        local: Guid,
        remote: Guid,
    },
    Unmatched {
        local: Guid,
        remote: Guid,
    },
    DataReceived {
        reader: Guid,
        writer: Guid,
        sequence_number: u64,
        value: SampleValue,
        source_timestamp: SimTime,
        reception_timestamp: SimTime,
    },
    /// The reliable transport gave up on a sample.
    DeliveryFailed {
        writer: Guid,
        destinations: Vec<Guid>,
        sequence_number: Option<u64>,
        attempts: u32,
    },
    ShutdownComplete,
}
