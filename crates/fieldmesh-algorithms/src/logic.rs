//! Spatial logic over the device network.
//!
//! Formulas are evaluated per device, each round, and self-stabilize like
//! any other field computation. [`SpatialLogic`] is the interface the rest of
//! the library uses; [`Slcs`] implements its two operators with distances.

use fieldmesh_field::aggregate::{any_of, min_of};
use fieldmesh_field::Round;

use crate::distance::next_hop;
use crate::Hops;

/// Operators of the spatial logic of closure spaces.
pub trait SpatialLogic {
    /// Closure `C φ`: `φ` holds here or at a neighbor.
    fn close(&self, round: &mut Round<'_>, phi: bool) -> bool;

    /// Reachability `a R φ`: `φ` holds here, or this device satisfies `a`
    /// and a neighbor satisfies `a R φ`.
    fn reach(&self, round: &mut Round<'_>, a: bool, phi: bool) -> bool;
}

/// Distance-based evaluator.
///
/// Reachability is a hop distance from `φ`-devices that only travels through
/// `a`-devices. Paths longer than `radius` hops are treated as unreachable,
/// which bounds how long a stale `true` can survive after `φ` stops holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slcs {
    radius: Hops,
}

impl Slcs {
    /// Reach radius used by [`Slcs::default`].
    pub const DEFAULT_RADIUS: Hops = 100;

    /// Logic whose reachability gives up after `radius` hops.
    pub fn new(radius: Hops) -> Self {
        Self { radius }
    }

    /// Longest path, in hops, that still counts as reachable.
    pub fn radius(&self) -> Hops {
        self.radius
    }
}

impl Default for Slcs {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RADIUS)
    }
}

impl SpatialLogic for Slcs {
    fn close(&self, round: &mut Round<'_>, phi: bool) -> bool {
        round.call("close", |r| {
            let around = r.neighbor("phi", phi);
            any_of(&around, phi)
        })
    }

    fn reach(&self, round: &mut Round<'_>, a: bool, phi: bool) -> bool {
        let radius = self.radius;
        let hops = round.call("reach", |r| {
            r.share("hops", radius, |d| {
                if phi {
                    0
                } else if a {
                    next_hop(min_of(&d, radius)).min(radius)
                } else {
                    radius
                }
            })
        });
        hops < radius
    }
}

/// `a R (C b)`: reach, through `a`-devices, somewhere `b` holds nearby.
#[track_caller]
pub fn close_reach(round: &mut Round<'_>, logic: &impl SpatialLogic, a: bool, b: bool) -> bool {
    round.call("close_reach", |r| {
        let near = logic.close(r, b);
        logic.reach(r, a, near)
    })
}
