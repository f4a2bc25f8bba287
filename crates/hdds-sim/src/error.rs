// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Crate-wide error type.
//!
//! Construction problems (bad QoS, bad config, unroutable transport classes,
//! zero-delay loops) are reported here. Protocol-level non-events such as an
//! incompatible QoS pair or a write with no matched reader are not errors;
//! they only show up in the trace.

use crate::transport::TransportClass;

/// Errors returned by simulator construction and stepping.
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// QoS policy is invalid (e.g., KEEP_LAST depth of zero).
    InvalidQos(String),
    /// Simulation configuration is invalid.
    InvalidConfig(String),
    /// Configuration file not found at specified path.
    ConfigFileNotFound(String),
    /// Configuration document could not be parsed.
    ConfigParse(String),

    // ========================================================================
    // Model Graph Errors
    // ========================================================================
    /// Two components share the same name inside one coupled model.
    DuplicateComponent(String),
    /// A coupling references a component that does not exist.
    UnknownComponent(String),
    /// A coupling references a port the component does not declare.
    UnknownPort { component: String, port: String },
    /// Instantaneous models are wired into a loop.
    ZeroDelayCycle(Vec<String>),
    /// The transport router could select a class with no channel behind it.
    UnroutableClass(TransportClass),

    // ========================================================================
    // Runtime Errors
    // ========================================================================
    /// A model emitted an event on a port it does not declare.
    UndeclaredOutputPort { model: String, port: String },
    /// Referenced endpoint does not belong to this participant.
    EndpointNotFound(String),
    /// Invalid state for the requested operation.
    InvalidState(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// I/O error with underlying cause.
    IoError(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // Configuration
            Error::InvalidQos(msg) => write!(f, "Invalid QoS: {}", msg),
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::ConfigFileNotFound(path) => write!(f, "Config file not found: {}", path),
            Error::ConfigParse(msg) => write!(f, "Config parse error: {}", msg),
            // Model graph
            Error::DuplicateComponent(name) => write!(f, "Duplicate component: {}", name),
            Error::UnknownComponent(name) => write!(f, "Unknown component: {}", name),
            Error::UnknownPort { component, port } => {
                write!(f, "Unknown port '{}' on component '{}'", port, component)
            }
            Error::ZeroDelayCycle(models) => {
                write!(f, "Zero-delay routing cycle: {}", models.join(" -> "))
            }
            Error::UnroutableClass(class) => {
                write!(f, "No channel configured for transport class {}", class)
            }
            // Runtime
            Error::UndeclaredOutputPort { model, port } => {
                write!(f, "Model '{}' emitted on undeclared port '{}'", model, port)
            }
            Error::EndpointNotFound(guid) => write!(f, "Endpoint not found: {}", guid),
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            // I/O
            Error::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e)
    }
}

/// Convenient alias for API results using the crate `Error` type.
pub type Result<T> = core::result::Result<T, Error>;
