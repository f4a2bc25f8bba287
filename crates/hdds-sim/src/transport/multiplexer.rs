// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The transport layer as a coupled model.
//!
//! ```text
//!              +--------------------------------------------+
//!  data_in --> | router --shm_out--------> shared_memory --+ | --> data_out
//!              |        --multicast_out--> multicast ------+ |
//!              |        --reliable_out---> reliable -------+ | --> failure_out
//!              |        --best_effort_out> best_effort ----+ |
//!              +--------------------------------------------+
//! ```

use super::channel::{TransportChannel, FAILURE_OUT, RECEIVE_OUT, SEND_IN};
use super::message::TransportClass;
use super::router::{self, TransportRouter};
use crate::config::{component_seed, TransportConfig};
use crate::error::Result;
use crate::kernel::Coupled;

/// Name of the transport coupled model inside a domain.
pub const TRANSPORT: &str = "transport";
/// Name of the router inside the transport model.
pub const ROUTER: &str = "router";

pub const DATA_IN: &str = "data_in";
pub const DATA_OUT: &str = "data_out";
pub const FAILURE: &str = "failure_out";

/// Build the transport layer.
///
/// Fails with `UnroutableClass` if the configuration lacks a class the
/// router may select.
pub fn build_transport(config: &TransportConfig, seed: u64) -> Result<Coupled> {
    let mut transport = Coupled::new(TRANSPORT);
    transport.add_input_port(DATA_IN);
    transport.add_output_port(DATA_OUT);
    transport.add_output_port(FAILURE);

    transport.add_model(ROUTER, TransportRouter::new(config.enable_shared_memory))?;
    transport.connect_input(DATA_IN, ROUTER, router::DATA_IN)?;

    for class in config.required_classes() {
        let class_config = config.class(class)?;
        let name = class.name();
        let path = format!("{}.{}", TRANSPORT, name);
        let channel = TransportChannel::new(class, class_config, component_seed(seed, &path));
        transport.add_model(name, channel)?;
        transport.connect(ROUTER, router::port_for(class), name, SEND_IN)?;
        transport.connect_output(name, RECEIVE_OUT, DATA_OUT)?;
        transport.connect_output(name, FAILURE_OUT, FAILURE)?;
        log::debug!("[transport] class {} ready ({:?})", class, class_config.loss);
    }

    Ok(transport)
}

/// Hierarchical path of the channel serving `class`.
pub fn channel_path(class: TransportClass) -> String {
    format!("{}.{}", TRANSPORT, class.name())
}
