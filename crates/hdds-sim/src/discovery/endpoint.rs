// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Endpoint descriptions exchanged during discovery.

use super::guid::{Guid, ENTITY_KIND_READER, ENTITY_KIND_WRITER};
use crate::qos::{Partition, QosProfile};
use std::fmt;

/// Writer or reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EndpointKind {
    Writer,
    Reader,
}

impl EndpointKind {
    /// The kind an endpoint must have to be matched with this one.
    pub const fn opposite(self) -> Self {
        match self {
            EndpointKind::Writer => EndpointKind::Reader,
            EndpointKind::Reader => EndpointKind::Writer,
        }
    }

    pub const fn entity_kind_byte(self) -> u8 {
        match self {
            EndpointKind::Writer => ENTITY_KIND_WRITER,
            EndpointKind::Reader => ENTITY_KIND_READER,
        }
    }

    /// Infer the kind from a GUID's entity kind byte.
    pub fn from_guid(guid: &Guid) -> Option<Self> {
        match guid.entity_kind() {
            ENTITY_KIND_WRITER => Some(EndpointKind::Writer),
            ENTITY_KIND_READER => Some(EndpointKind::Reader),
            _ => None,
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointKind::Writer => write!(f, "writer"),
            EndpointKind::Reader => write!(f, "reader"),
        }
    }
}

/// A writer or reader as known to discovery.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointInfo {
    pub guid: Guid,
    pub participant_guid: Guid,
    pub topic_name: String,
    pub type_name: String,
    pub kind: EndpointKind,
    pub qos: QosProfile,
}

impl EndpointInfo {
    pub fn new(
        guid: Guid,
        topic_name: &str,
        type_name: &str,
        kind: EndpointKind,
        qos: QosProfile,
    ) -> Self {
        Self {
            guid,
            participant_guid: guid.participant_guid(),
            topic_name: topic_name.to_string(),
            type_name: type_name.to_string(),
            kind,
            qos,
        }
    }

    pub fn partitions(&self) -> &Partition {
        &self.qos.partition
    }

    pub fn is_writer(&self) -> bool {
        self.kind == EndpointKind::Writer
    }

    pub fn is_reader(&self) -> bool {
        self.kind == EndpointKind::Reader
    }

    /// Estimated wire size of this endpoint inside a discovery announcement.
    pub fn encoded_len(&self) -> usize {
        // GUID + kind + QoS block + two length-prefixed strings.
        const FIXED: usize = 16 + 4 + 64;
        let partitions: usize = self.qos.partition.names.iter().map(|n| 4 + n.len()).sum();
        FIXED + 4 + self.topic_name.len() + 4 + self.type_name.len() + partitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_guid() {
        let participant = Guid::participant(0, 1, 0);
        let writer = participant.endpoint(1, EndpointKind::Writer.entity_kind_byte());
        let reader = participant.endpoint(2, EndpointKind::Reader.entity_kind_byte());
        assert_eq!(EndpointKind::from_guid(&writer), Some(EndpointKind::Writer));
        assert_eq!(EndpointKind::from_guid(&reader), Some(EndpointKind::Reader));
        assert_eq!(EndpointKind::from_guid(&participant), None);
    }

    #[test]
    fn test_endpoint_info_derives_participant() {
        let participant = Guid::participant(0, 1, 0);
        let guid = participant.endpoint(1, ENTITY_KIND_WRITER);
        let info = EndpointInfo::new(
            guid,
            "/map",
            "nav_msgs/OccupancyGrid",
            EndpointKind::Writer,
            QosProfile::map(),
        );
        assert_eq!(info.participant_guid, participant);
        assert!(info.is_writer());
        assert!(info.partitions().is_default());
        assert!(info.encoded_len() > 16);
    }
}
