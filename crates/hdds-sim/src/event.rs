// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Events carried on model ports.
//!
//! The set is closed: every model in the crate speaks one of these kinds, so
//! routing never needs to downcast.

use crate::discovery::{Command, Response};
use crate::transport::{DeliveryFailure, TransportMessage};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Bare integer, for simple generator/processor models.
    Signal(i64),
    /// Application -> participant.
    Command(Command),
    /// Participant -> application.
    Response(Response),
    /// Participant <-> transport.
    Transport(TransportMessage),
    /// Transport -> originating participant.
    DeliveryFailure(DeliveryFailure),
}

impl Event {
    /// Short kind name for logs and traces.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Signal(_) => "signal",
            Event::Command(_) => "command",
            Event::Response(_) => "response",
            Event::Transport(_) => "transport",
            Event::DeliveryFailure(_) => "delivery_failure",
        }
    }
}

impl From<Command> for Event {
    fn from(c: Command) -> Self {
        Event::Command(c)
    }
}

impl From<Response> for Event {
    fn from(r: Response) -> Self {
        Event::Response(r)
    }
}

impl From<TransportMessage> for Event {
    fn from(m: TransportMessage) -> Self {
        Event::Transport(m)
    }
}
