//! Neighbor-dependent computations that also depend on history.

use fieldmesh_field::aggregate::{max_of, min_of};
use fieldmesh_field::{Real, Round};

use crate::temporal::integrate;
use crate::INF;

/// Whether this device's integral of `v` is strictly below every neighbor's.
///
/// A device without neighbors compares against [`INF`].
#[track_caller]
pub fn min_integral(round: &mut Round<'_>, v: Real) -> bool {
    round.call("min_integral", |r| {
        let own = integrate(r, v);
        let others = r.neighbor("integral", own);
        own < min_of(&others, INF)
    })
}

/// A counter the whole network increases together.
///
/// Each round, one more than the largest count in the neighborhood (this
/// device's own previous count included).
#[track_caller]
pub fn shared_count(round: &mut Round<'_>) -> i64 {
    round.call("shared_count", |r| {
        r.share("count", 0i64, |n| max_of(&n, *n.local()).saturating_add(1))
    })
}
