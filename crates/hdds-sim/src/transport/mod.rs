// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Simulated transport layer.
//!
//! Participants hand [`TransportMessage`]s to the transport coupled model.
//! A zero-delay [`TransportRouter`] picks a [`TransportClass`] per message
//! and one [`TransportChannel`] per class applies latency and loss before
//! the message reaches every participant. Reliable messages that cannot be
//! delivered come back to the sender as a [`DeliveryFailure`].

pub mod channel;
pub mod latency;
pub mod message;
pub mod multiplexer;
pub mod router;

pub use channel::{ChannelStats, TransportChannel};
pub use latency::{should_drop, Jitter, LatencyModel, LossModel, LossOutcome};
pub use message::{DeliveryFailure, Payload, TransportClass, TransportMessage};
pub use multiplexer::{build_transport, channel_path};
pub use router::{classify, TransportRouter};
