//! Fieldmesh Algorithm Library
//!
//! Self-stabilizing algorithms written against the round primitives of
//! [`fieldmesh_field`]. Every function here takes the current [`Round`] and
//! opens its own scope, so it can be called any number of times from any
//! program without its state colliding with anything else.
//!
//! # Families
//!
//! | Module | Depends on | Algorithms |
//! |---|---|---|
//! | [`temporal`] | own history | low-pass filter, integrate, accumulate |
//! | [`distance`] | neighbors | hop-count and real-valued distance |
//! | [`spread`] | neighbors + time | timestamped gossip-maximize, history max |
//! | [`collective`] | neighbors + history | minimum integral, shared counter |
//! | [`election`] | gossip | leader election behind [`LeaderElection`] |
//! | [`logic`] | distance | spatial formulas behind [`SpatialLogic`] |
//! | [`diameter`] | all of the above | pulse and continuous diameter |
//!
//! # Self-stabilization
//!
//! None of these functions hold global state. After any perturbation (a
//! source moving, a device leaving, links changing) they reconverge using
//! only fresh exports: distances count up past stale values, and gossiped
//! records expire after their threshold.
//!
//! [`Round`]: fieldmesh_field::Round

pub mod collective;
pub mod diameter;
pub mod distance;
pub mod election;
pub mod logic;
pub mod spread;
pub mod temporal;

pub use collective::{min_integral, shared_count};
pub use diameter::{hop_diameter, stable_diameter, DiameterEstimate};
pub use distance::{hop_distance, real_distance};
pub use election::{election, GossipElection, LeaderElection};
pub use logic::{close_reach, Slcs, SpatialLogic};
pub use spread::{max_gossip, maximize};
pub use temporal::{accumulate, integrate, lowpass};

use fieldmesh_field::Real;

/// Hop counts.
pub type Hops = u32;

/// Largest valid hop count. Doubles as "unreached".
pub const HOPS_MAX: Hops = Hops::MAX - 1;

/// Real-valued "unreached".
pub const INF: Real = Real::INFINITY;

#[cfg(test)]
mod tests {
    use super::*;
    use fieldmesh_field::{DeviceId, Lockstep};
    use fieldmesh_topology::LinkGraph;

    #[test]
    fn unreached_values_absorb_increments() {
        assert_eq!(HOPS_MAX.saturating_add(1).min(HOPS_MAX), HOPS_MAX);
        assert_eq!(INF + 3.5, INF);
    }

    #[test]
    fn algorithms_compose_in_one_program() {
        let mut net = Lockstep::new(LinkGraph::line((1..=4).map(DeviceId)));
        let out = net.run(10, |r| {
            let source = r.uid() == DeviceId(1);
            let hops = hop_distance(r, source);
            let own = r.uid().value() as Real;
            let largest = maximize(r, own, 50.0);
            (hops, largest, accumulate(r, 1.0))
        });

        assert_eq!(out[&DeviceId(4)], (3, 4.0, 10.0));
        assert_eq!(out[&DeviceId(1)], (0, 4.0, 10.0));
    }
}
