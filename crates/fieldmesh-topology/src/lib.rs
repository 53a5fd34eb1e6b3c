//! Fieldmesh Network Topology
//!
//! Who can talk to whom. Every other fieldmesh crate treats connectivity as
//! given input; this crate is where that input comes from.
//!
//! # Model
//!
//! - A [`DeviceId`] names a device for its whole lifetime and is totally
//!   ordered (it doubles as the election tie-breaker).
//! - A [`Position`] places a device in the plane; physical neighbor distance
//!   is the Euclidean distance between positions.
//! - A [`Connector`] decides which pairs of devices are in communication
//!   range: either a fixed radius over positions, or an explicit
//!   [`LinkGraph`] for hand-built topologies (lines, cliques, churn tests).
//!
//! The link graph also carries a BFS oracle ([`LinkGraph::hop_distances`],
//! [`LinkGraph::hop_diameter`]) that tests compare converged aggregate values
//! against.

mod connector;
mod error;
mod id;
mod links;
mod position;

pub use connector::Connector;
pub use error::{Result, TopologyError};
pub use id::DeviceId;
pub use links::LinkGraph;
pub use position::Position;

/// Length assigned to links created without an explicit length.
pub const UNIT_LENGTH: f64 = 1.0;
