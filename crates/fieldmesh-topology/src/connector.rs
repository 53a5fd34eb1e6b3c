//! Connection rules: which devices are currently in range.

use crate::{DeviceId, LinkGraph, Position, Result, TopologyError};

/// Decides whether two devices can exchange messages right now.
#[derive(Debug, Clone, PartialEq)]
pub enum Connector {
    /// Connected iff positions are within `range` of each other.
    FixedRange { range: f64 },
    /// Connected iff explicitly linked.
    Explicit(LinkGraph),
}

impl Connector {
    /// Fixed communication radius.
    pub fn fixed_range(range: f64) -> Result<Self> {
        if !range.is_finite() || range < 0.0 {
            return Err(TopologyError::InvalidRange(range));
        }
        Ok(Self::FixedRange { range })
    }

    /// Explicit link graph.
    pub fn explicit(graph: LinkGraph) -> Self {
        Self::Explicit(graph)
    }

    /// Whether `a` (at `pa`) and `b` (at `pb`) are in communication range.
    ///
    /// A device is never its own neighbor here; the self-entry of a neighbor
    /// field comes from the device's own state, not from delivery.
    pub fn connected(&self, a: DeviceId, pa: &Position, b: DeviceId, pb: &Position) -> bool {
        if a == b {
            return false;
        }
        match self {
            Self::FixedRange { range } => pa.distance(pb) <= *range,
            Self::Explicit(graph) => graph.are_linked(a, b),
        }
    }

    /// Physical distance between two devices as seen by the distance algorithms.
    ///
    /// Explicit links use their declared length and unlinked pairs have none.
    /// Ranged connectivity uses the Euclidean distance of the positions.
    pub fn distance(&self, a: DeviceId, pa: &Position, b: DeviceId, pb: &Position) -> Option<f64> {
        match self {
            Self::Explicit(graph) => graph.length(a, b),
            Self::FixedRange { .. } => Some(pa.distance(pb)),
        }
    }

    /// Mutable access to the link graph, if connectivity is explicit.
    pub fn links_mut(&mut self) -> Option<&mut LinkGraph> {
        match self {
            Self::Explicit(graph) => Some(graph),
            Self::FixedRange { .. } => None,
        }
    }
}
