// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! User data samples.
//!
//! The simulator does not serialize payloads; it only needs their encoded
//! size to drive transport latency. [`SampleValue::encoded_len`] estimates a
//! CDR encoding (4-byte encapsulation header plus the value).

use crate::discovery::Guid;
use crate::qos::Lifespan;
use crate::time::SimTime;

/// CDR encapsulation header length.
const ENCAPSULATION_LEN: usize = 4;

/// Application payload carried by a data sample.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    Bool(bool),
    Int32(i32),
    Float64(f64),
    Text(String),
    Bytes(Vec<u8>),
    /// Opaque payload of a known encoded size (e.g. a large map).
    Opaque { size: usize },
}

impl SampleValue {
    pub fn encoded_len(&self) -> usize {
        ENCAPSULATION_LEN
            + match self {
                SampleValue::Bool(_) => 1,
                SampleValue::Int32(_) => 4,
                SampleValue::Float64(_) => 8,
                // length prefix + bytes + NUL
                SampleValue::Text(s) => 4 + s.len() + 1,
                SampleValue::Bytes(b) => 4 + b.len(),
                SampleValue::Opaque { size } => *size,
            }
    }
}

/// A published sample in flight between participants.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSample {
    pub writer_guid: Guid,
    pub topic_name: String,
    pub sequence_number: u64,
    pub source_timestamp: SimTime,
    /// Writer's lifespan, checked by the receiver.
    pub lifespan: Lifespan,
    pub value: SampleValue,
}

impl DataSample {
    /// Wire size: DATA submessage header plus payload.
    pub fn encoded_len(&self) -> usize {
        const DATA_HEADER_LEN: usize = 20 + 24;
        DATA_HEADER_LEN + self.value.encoded_len()
    }
}
