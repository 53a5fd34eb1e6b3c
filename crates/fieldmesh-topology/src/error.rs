//! Error types for fieldmesh-topology.

use thiserror::Error;

use crate::DeviceId;

/// Result type for topology operations.
pub type Result<T> = std::result::Result<T, TopologyError>;

/// Malformed connectivity input, rejected before it reaches any round.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    /// Communication range must be finite and non-negative.
    #[error("invalid communication range: {0}")]
    InvalidRange(f64),

    /// A device cannot be its own neighbor through a link.
    #[error("device {0} cannot link to itself")]
    SelfLink(DeviceId),

    /// Link lengths must be finite and non-negative.
    #[error("invalid link length {length} between {a} and {b}")]
    InvalidLength {
        a: DeviceId,
        b: DeviceId,
        length: f64,
    },
}
