//! Network-wide propagation of values.
//!
//! [`maximize`] tracks the current maximum: every device heartbeats a
//! timestamped record of its own value, and records that stop being
//! refreshed expire after `threshold` time. [`max_gossip`] tracks the
//! historical maximum and never forgets.

use fieldmesh_field::aggregate::{fold, max_of};
use fieldmesh_field::gossip::{self, TimeDict};
use fieldmesh_field::{Real, Round, Time};

/// Gossip this device's `value` and return the fresh records known here.
///
/// Records older than `current_time - threshold` are dropped. The result
/// always holds this device's own record for the current round.
#[track_caller]
pub fn gossip_records(round: &mut Round<'_>, value: Real, threshold: Time) -> TimeDict {
    round.call("gossip_records", |r| {
        let now = r.current_time();
        let own = gossip::singleton(r.uid(), now, value);
        r.share("records", own.clone(), |n| {
            let known = fold(&n, gossip::merge, n.local().clone());
            gossip::expire(gossip::merge(known, &own), now - threshold)
        })
    })
}

/// Current network-wide maximum of `v`.
///
/// A device's contribution disappears everywhere within `threshold` time of
/// the last round it was gossiped in. Never below 0.
#[track_caller]
pub fn maximize(round: &mut Round<'_>, v: Real, threshold: Time) -> Real {
    round.call("maximize", |r| gossip::max_value(&gossip_records(r, v, threshold)))
}

/// Largest value of `v` ever seen anywhere in the network.
#[track_caller]
pub fn max_gossip(round: &mut Round<'_>, v: Real) -> Real {
    round.call("max_gossip", |r| r.share("max", v, |n| max_of(&n, n.local().max(v))))
}
