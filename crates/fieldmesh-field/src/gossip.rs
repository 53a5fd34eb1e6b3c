//! Timestamped records for network-wide gossip.
//!
//! A [`TimeDict`] maps a device to the most recent `(time, value)` record
//! known for it. Merging keeps the newer record per device, which is
//! commutative, associative and idempotent per key, so a neighbor field of
//! dicts can be folded in any order. Expiry drops records older than a
//! horizon; that is the only thing that makes a departed device's
//! contribution disappear.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use fieldmesh_topology::DeviceId;
use tracing::trace;

use crate::{Real, Time};

/// A payload as last observed for one device, at the time it was produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    /// Round time of the originating device when the value was produced
    pub time: Time,
    /// The gossiped value
    pub value: Real,
}

impl Record {
    /// Create a record.
    pub const fn new(time: Time, value: Real) -> Self {
        Self { time, value }
    }
}

/// Latest known record per device.
pub type TimeDict = BTreeMap<DeviceId, Record>;

/// A dict holding only `id`'s own record.
pub fn singleton(id: DeviceId, time: Time, value: Real) -> TimeDict {
    TimeDict::from([(id, Record::new(time, value))])
}

/// Merge `y` into `x`, preferring the more recent record per device.
///
/// On equal timestamps `x`'s record is kept. Keys present on one side only
/// are kept as they are.
pub fn merge(mut x: TimeDict, y: &TimeDict) -> TimeDict {
    for (&id, &record) in y {
        match x.entry(id) {
            Entry::Occupied(mut e) => {
                if record.time > e.get().time {
                    e.insert(record);
                }
            }
            Entry::Vacant(e) => {
                e.insert(record);
            }
        }
    }
    x
}

/// Drop every record whose timestamp is strictly less than `horizon`.
pub fn expire(mut dict: TimeDict, horizon: Time) -> TimeDict {
    let before = dict.len();
    dict.retain(|_, r| r.time >= horizon);
    if dict.len() < before {
        trace!(horizon, dropped = before - dict.len(), "expired gossip records");
    }
    dict
}

/// Largest value in the dict, never below 0.
pub fn max_value(dict: &TimeDict) -> Real {
    dict.values().fold(0.0, |acc, r| acc.max(r.value))
}
