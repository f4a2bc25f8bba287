// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Domain assembly.
//!
//! [`DomainBuilder`] wires participants, the transport layer and scripted
//! applications into one root coupled model named `domain`:
//!
//! ```text
//!   app_<p> --out--> <p>.command_in          <p>.commands (root input)
//!   <p>.data_out ----------------> transport.data_in
//!   transport.data_out/failure_out -> every <p>.transport_in
//!   <p>.response_out ------------> <p>.responses (root output)
//! ```
//!
//! # Example
//!
//! ```
//! use hdds_sim::config::SimConfig;
//! use hdds_sim::discovery::Command;
//! use hdds_sim::qos::QosProfile;
//! use hdds_sim::system::DomainBuilder;
//! use hdds_sim::time::SimTime;
//!
//! let mut domain = DomainBuilder::new(SimConfig::testing());
//! domain.add_participant("talker", 1, 100).unwrap();
//! domain.add_participant("listener", 2, 200).unwrap();
//! domain
//!     .schedule("listener", SimTime::ZERO, Command::CreateReader {
//!         topic: "/chatter".into(),
//!         type_name: "std_msgs/String".into(),
//!         qos: QosProfile::default(),
//!     })
//!     .unwrap();
//!
//! let mut sim = domain.build_simulator().unwrap();
//! sim.run_until(SimTime::from_millis(500)).unwrap();
//! ```

use crate::config::SimConfig;
use crate::discovery::{participant, Command, DomainParticipant, Guid};
use crate::error::{Error, Result};
use crate::event::Event;
use crate::kernel::{source, Coupled, ScheduledSource, Simulator};
use crate::time::SimTime;
use crate::transport::multiplexer::{self, build_transport};
use std::collections::BTreeMap;

/// Name of the root coupled model.
pub const DOMAIN: &str = "domain";

const APP_PREFIX: &str = "app_";

/// Root output port carrying a participant's responses.
pub fn responses_port(participant: &str) -> String {
    format!("{}.responses", participant)
}

/// Root input port feeding a participant's command port.
pub fn commands_port(participant: &str) -> String {
    format!("{}.commands", participant)
}

pub struct DomainBuilder {
    config: SimConfig,
    participants: Vec<(String, DomainParticipant)>,
    scripts: BTreeMap<String, Vec<(SimTime, Event)>>,
}

impl DomainBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            participants: Vec::new(),
            scripts: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Add a participant living in process `process_id` on host `host_id`.
    ///
    /// Returns it so endpoints can be created before the run starts.
    pub fn add_participant(
        &mut self,
        name: &str,
        host_id: u32,
        process_id: u32,
    ) -> Result<&mut DomainParticipant> {
        let participant_id = self.participants.len() as u32 + 1;
        let guid = Guid::participant(host_id, process_id, participant_id);
        self.add_participant_model(name, DomainParticipant::new(guid, &self.config.discovery))
    }

    /// Add a participant built by the caller (custom config or GUID).
    pub fn add_participant_model(
        &mut self,
        name: &str,
        participant: DomainParticipant,
    ) -> Result<&mut DomainParticipant> {
        if name.is_empty() || name.contains('.') || name.starts_with(APP_PREFIX) {
            return Err(Error::InvalidConfig(format!(
                "invalid participant name '{}'",
                name
            )));
        }
        if name == multiplexer::TRANSPORT || self.participants.iter().any(|(n, _)| n == name) {
            return Err(Error::DuplicateComponent(name.to_string()));
        }
        if self
            .participants
            .iter()
            .any(|(_, p)| p.guid() == participant.guid())
        {
            return Err(Error::InvalidConfig(format!(
                "participant GUID {} already in use",
                participant.guid()
            )));
        }
        self.participants.push((name.to_string(), participant));
        let index = self.participants.len() - 1;
        Ok(&mut self.participants[index].1)
    }

    pub fn participant_mut(&mut self, name: &str) -> Option<&mut DomainParticipant> {
        self.participants
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
    }

    /// Deliver `command` to `participant` at `at`.
    pub fn schedule(&mut self, participant: &str, at: SimTime, command: Command) -> Result<()> {
        if !self.participants.iter().any(|(n, _)| n == participant) {
            return Err(Error::UnknownComponent(participant.to_string()));
        }
        self.scripts
            .entry(participant.to_string())
            .or_default()
            .push((at, Event::Command(command)));
        Ok(())
    }

    /// Assemble the root coupled model.
    pub fn build(self) -> Result<Coupled> {
        self.config.validate()?;

        let mut root = Coupled::new(DOMAIN);
        root.add_coupled(build_transport(&self.config.transport, self.config.kernel.seed)?)?;

        for (name, participant) in self.participants {
            root.add_model(&name, participant)?;
            root.connect(&name, participant::DATA_OUT, multiplexer::TRANSPORT, multiplexer::DATA_IN)?;
            root.connect(multiplexer::TRANSPORT, multiplexer::DATA_OUT, &name, participant::TRANSPORT_IN)?;
            root.connect(multiplexer::TRANSPORT, multiplexer::FAILURE, &name, participant::TRANSPORT_IN)?;

            let responses = responses_port(&name);
            root.add_output_port(&responses);
            root.connect_output(&name, participant::RESPONSE_OUT, &responses)?;

            let commands = commands_port(&name);
            root.add_input_port(&commands);
            root.connect_input(&commands, &name, participant::COMMAND_IN)?;
        }

        for (name, script) in self.scripts {
            let app = format!("{}{}", APP_PREFIX, name);
            root.add_model(&app, ScheduledSource::new(script))?;
            root.connect(&app, source::OUT, &name, participant::COMMAND_IN)?;
        }

        log::debug!("[kernel] domain assembled");
        Ok(root)
    }

    /// Assemble and wrap in a simulator using the builder's configuration.
    pub fn build_simulator(self) -> Result<Simulator> {
        let config = self.config.clone();
        Simulator::from_config(self.build()?, &config)
    }
}
