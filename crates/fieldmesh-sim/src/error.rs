//! Error types for fieldmesh-sim.

use fieldmesh_topology::{DeviceId, TopologyError};
use thiserror::Error;

/// Result type for simulator operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or driving a simulation.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No device with this identity was ever spawned
    #[error("unknown device: {0}")]
    UnknownDevice(DeviceId),

    /// A device with this identity already exists
    #[error("device already exists: {0}")]
    DuplicateDevice(DeviceId),

    /// Links were edited on a range-based topology
    #[error("links can only be edited on an explicit topology")]
    FixedTopology,

    /// Topology error
    #[error("topology error: {0}")]
    Topology(#[from] TopologyError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
