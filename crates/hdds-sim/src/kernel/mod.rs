// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DEVS-style simulation kernel.
//!
//! - [`Model`]: atomic state machine with ports
//! - [`Coupled`]: named components and the couplings between them
//! - [`Simulator`]: flattens a hierarchy and steps it in virtual time

pub mod coupled;
pub mod model;
pub mod simulator;
pub mod source;

pub use coupled::{Component, Coupled, Coupling, PortRef};
pub use model::{Context, InputBag, Model, OutputBag, PortName};
pub use simulator::{EventRecord, ExternalOutput, RunSummary, Simulator, Termination};
pub use source::ScheduledSource;
