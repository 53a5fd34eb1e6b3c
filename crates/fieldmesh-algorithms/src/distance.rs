//! Self-stabilizing distance estimates from a set of source devices.
//!
//! Both variants follow the same recurrence: a source is at 0, anyone else is
//! one step further than its best neighbor. Values come from the neighbors'
//! latest exports, so after a change (sources moving, links breaking) the
//! estimate heals in a number of rounds proportional to the hop diameter.
//! When every source disappears, estimates climb until they hit the
//! "unreached" value instead of settling on a wrong one.

use fieldmesh_field::aggregate::min_of;
use fieldmesh_field::{Real, Round};

use crate::{Hops, HOPS_MAX, INF};

/// Hop-count distance from the nearest source.
///
/// Saturates at [`HOPS_MAX`], which also means "unreached".
#[track_caller]
pub fn hop_distance(round: &mut Round<'_>, source: bool) -> Hops {
    round.call("hop_distance", |r| {
        r.share("hops", HOPS_MAX, |d| {
            if source {
                0
            } else {
                next_hop(min_of(&d, HOPS_MAX))
            }
        })
    })
}

/// One more hop than `best`, never past the sentinel.
pub(crate) fn next_hop(best: Hops) -> Hops {
    best.saturating_add(1).min(HOPS_MAX)
}

/// Real-valued distance from the nearest source.
///
/// Each hop adds the physical distance to that neighbor as reported by the
/// delivery layer. Unreached is [`INF`]; neighbors with no reported distance
/// do not contribute.
#[track_caller]
pub fn real_distance(round: &mut Round<'_>, source: bool) -> Real {
    round.call("real_distance", |r| {
        let links = r.nbr_dist();
        r.share("distance", INF, |d| {
            if source {
                0.0
            } else {
                min_of(&d.zip_with(&links, |x, l| x + l), INF)
            }
        })
    })
}
