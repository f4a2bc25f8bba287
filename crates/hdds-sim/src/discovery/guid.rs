// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! GUID (Globally Unique Identifier) for simulated participants and endpoints.

use std::fmt;

/// Entity ID of a participant (RTPS `ENTITYID_PARTICIPANT`).
pub const ENTITYID_PARTICIPANT: [u8; 4] = [0x00, 0x00, 0x01, 0xC1];
/// Entity kind byte for user writers (no key).
pub const ENTITY_KIND_WRITER: u8 = 0x03;
/// Entity kind byte for user readers (no key).
pub const ENTITY_KIND_READER: u8 = 0x04;

/// 16-byte identifier: 12-byte prefix + 4-byte entity ID.
///
/// # Prefix layout
/// - bytes 0-3: host id (big-endian)
/// - bytes 4-7: process id (big-endian)
/// - bytes 8-11: participant id within the process (big-endian)
///
/// Endpoints share their participant's prefix. Two GUIDs live in the same
/// process when their host and process ids agree, which is what the
/// transport router uses to pick shared memory.
///
/// # Display Format
/// Hex with dots: "00.00.00.01.00.00.00.07.00.00.00.00.00.00.01.c1"
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Guid {
    pub prefix: [u8; 12],
    pub entity_id: [u8; 4],
}

impl Guid {
    /// Create GUID from separate prefix and entity ID.
    pub const fn new(prefix: [u8; 12], entity_id: [u8; 4]) -> Self {
        Self { prefix, entity_id }
    }

    /// Create GUID from raw bytes (16 bytes total).
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        let mut prefix = [0u8; 12];
        let mut entity_id = [0u8; 4];
        prefix.copy_from_slice(&bytes[0..12]);
        entity_id.copy_from_slice(&bytes[12..16]);
        Self { prefix, entity_id }
    }

    /// Convert GUID to 16-byte array.
    pub fn as_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[0..12].copy_from_slice(&self.prefix);
        bytes[12..16].copy_from_slice(&self.entity_id);
        bytes
    }

    /// GUID with all zeros (invalid/placeholder).
    pub const fn zero() -> Self {
        Self {
            prefix: [0; 12],
            entity_id: [0; 4],
        }
    }

    pub fn is_zero(&self) -> bool {
        self.prefix.iter().all(|&b| b == 0) && self.entity_id.iter().all(|&b| b == 0)
    }

    /// Deterministic participant GUID from its location.
    pub fn participant(host_id: u32, process_id: u32, participant_id: u32) -> Self {
        let mut prefix = [0u8; 12];
        prefix[0..4].copy_from_slice(&host_id.to_be_bytes());
        prefix[4..8].copy_from_slice(&process_id.to_be_bytes());
        prefix[8..12].copy_from_slice(&participant_id.to_be_bytes());
        Self {
            prefix,
            entity_id: ENTITYID_PARTICIPANT,
        }
    }

    /// Endpoint GUID under this GUID's prefix.
    ///
    /// `key` is a 24-bit per-participant counter; higher bits are dropped.
    pub fn endpoint(&self, key: u32, kind_byte: u8) -> Self {
        let key = key.to_be_bytes();
        Self {
            prefix: self.prefix,
            entity_id: [key[1], key[2], key[3], kind_byte],
        }
    }

    /// The participant GUID that owns this entity.
    pub fn participant_guid(&self) -> Self {
        Self {
            prefix: self.prefix,
            entity_id: ENTITYID_PARTICIPANT,
        }
    }

    pub fn is_participant(&self) -> bool {
        self.entity_id == ENTITYID_PARTICIPANT
    }

    /// Entity kind byte (last byte of the entity ID).
    pub fn entity_kind(&self) -> u8 {
        self.entity_id[3]
    }

    pub fn host_id(&self) -> u32 {
        u32::from_be_bytes([self.prefix[0], self.prefix[1], self.prefix[2], self.prefix[3]])
    }

    pub fn process_id(&self) -> u32 {
        u32::from_be_bytes([self.prefix[4], self.prefix[5], self.prefix[6], self.prefix[7]])
    }

    /// True when both entities run in the same host process.
    pub fn same_process(&self, other: &Guid) -> bool {
        self.prefix[0..8] == other.prefix[0..8]
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.prefix.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        for byte in &self.entity_id {
            write!(f, ".{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guid_roundtrip() {
        let bytes = [1, 15, 172, 16, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 1, 193];
        let guid = Guid::from_bytes(bytes);
        assert_eq!(guid.as_bytes(), bytes);
    }

    #[test]
    fn test_guid_display() {
        let guid = Guid::participant(0, 7, 0);
        assert_eq!(
            format!("{}", guid),
            "00.00.00.00.00.00.00.07.00.00.00.00.00.00.01.c1"
        );
    }

    #[test]
    fn test_guid_zero() {
        assert!(Guid::zero().is_zero());
        assert!(!Guid::participant(0, 1, 0).is_zero());
    }

    #[test]
    fn test_endpoint_shares_prefix() {
        let participant = Guid::participant(1, 2, 3);
        let writer = participant.endpoint(1, ENTITY_KIND_WRITER);
        assert_eq!(writer.prefix, participant.prefix);
        assert_eq!(writer.entity_kind(), ENTITY_KIND_WRITER);
        assert_eq!(writer.participant_guid(), participant);
        assert!(participant.is_participant());
        assert!(!writer.is_participant());
    }

    #[test]
    fn test_same_process() {
        let a = Guid::participant(1, 100, 0);
        let b = Guid::participant(1, 100, 1);
        let c = Guid::participant(1, 101, 0);
        let d = Guid::participant(2, 100, 0);
        assert!(a.same_process(&b));
        assert!(!a.same_process(&c));
        assert!(!a.same_process(&d));
        assert_eq!(a.process_id(), 100);
        assert_eq!(d.host_id(), 2);
    }
}
