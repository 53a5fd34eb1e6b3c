//! Leader election.
//!
//! Algorithms that need a leader only depend on [`LeaderElection`]: "tell
//! me who the network agrees on". [`GossipElection`] is the stand-alone
//! implementation: the smallest identity still heartbeating wins.

use fieldmesh_field::{DeviceId, Round, Time};
use tracing::debug;

use crate::spread::gossip_records;

/// A self-stabilizing leader election primitive.
pub trait LeaderElection {
    /// The leader as currently known by this device.
    ///
    /// Runs once per round; may hold state in the round's scopes.
    fn elect(&self, round: &mut Round<'_>) -> DeviceId;
}

/// Minimum-identity election over timestamped gossip.
///
/// Every device heartbeats its own record. The leader is the smallest
/// identity with a record younger than `threshold`, so a departed leader is
/// replaced network-wide at most `threshold` time after its last round
/// (plus propagation).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GossipElection {
    /// Age past which a heartbeat no longer counts
    pub threshold: Time,
}

impl GossipElection {
    /// Election forgetting devices silent for longer than `threshold`.
    pub fn new(threshold: Time) -> Self {
        Self { threshold }
    }
}

impl LeaderElection for GossipElection {
    fn elect(&self, round: &mut Round<'_>) -> DeviceId {
        round.call("gossip_election", |r| {
            let me = r.uid();
            let records = gossip_records(r, 0.0, self.threshold);
            let leader = records.keys().next().copied().unwrap_or(me);

            r.retain("leader", leader, |previous| {
                if previous != leader {
                    debug!(device = %me, from = %previous, to = %leader, "leader changed");
                }
                leader
            })
        })
    }
}

/// Whether this device is the elected leader.
#[track_caller]
pub fn election(round: &mut Round<'_>, elector: &impl LeaderElection) -> bool {
    round.call("election", |r| elector.elect(r) == r.uid())
}
