//! Network diameter estimation.
//!
//! Two compositions of the same idea, a distance from some source gossiped
//! to a network-wide maximum:
//!
//! - [`hop_diameter`] ("pulse"): hop distance from an elected leader,
//!   maximized with expiry. Reacts to changes within the gossip threshold
//!   plus propagation time, at the cost of transient spikes while distances
//!   reconverge.
//! - [`stable_diameter`] ("continuous"): real distance from a given source,
//!   averaged over time, low-pass filtered and max-gossiped without expiry.
//!   Smooth and never forgets.

use fieldmesh_field::{DeviceId, Real, Round, Time};

use crate::distance::{hop_distance, real_distance};
use crate::election::LeaderElection;
use crate::spread::{max_gossip, maximize};
use crate::temporal::{integrate, lowpass};

/// One device's view of a diameter computation, for the current round.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiameterEstimate {
    /// Whether this device is the distance source
    pub source: bool,
    /// This device's distance estimate
    pub distance: Real,
    /// Network-wide diameter estimate
    pub diameter: Real,
}

/// Diameter as the maximum hop distance from the elected leader.
///
/// The distance computation restarts from scratch whenever the leader
/// changes: devices following different leaders never mix distances.
#[track_caller]
pub fn hop_diameter(round: &mut Round<'_>, elector: &impl LeaderElection, threshold: Time) -> DiameterEstimate {
    round.call("hop_diameter", |r| {
        let leader: DeviceId = elector.elect(r);
        let source = leader == r.uid();
        let hops = r.call_keyed("leader", leader.value(), |r| hop_distance(r, source));
        let distance = Real::from(hops);
        let diameter = maximize(r, distance, threshold);
        DiameterEstimate {
            source,
            distance,
            diameter,
        }
    })
}

/// Diameter as the filtered historical maximum of time-averaged distances.
///
/// Unreached rounds count as distance 0 in the average. The reported
/// distance is the time-weighted average itself.
#[track_caller]
pub fn stable_diameter(round: &mut Round<'_>, source: bool) -> DiameterEstimate {
    round.call("stable_diameter", |r| {
        let d = real_distance(r, source);
        let z = if d.is_finite() { d } else { 0.0 };

        let weighted = integrate(r, z);
        let elapsed = integrate(r, 1.0);
        let average = if elapsed > 0.0 { weighted / elapsed } else { 0.0 };

        let filtered = lowpass(r, average);
        let diameter = max_gossip(r, filtered);
        DiameterEstimate {
            source,
            distance: average,
            diameter,
        }
    })
}
