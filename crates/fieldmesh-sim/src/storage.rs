//! Per-device display storage, snapshots and aggregated summaries.

use std::collections::BTreeMap;

use fieldmesh_field::{DeviceId, Real, Time};
use fieldmesh_topology::Position;
use serde::{Deserialize, Serialize};

/// Named real-valued slots a program writes its results into.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Storage {
    slots: BTreeMap<String, Real>,
}

impl Storage {
    /// Empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a slot, replacing any previous value.
    pub fn set(&mut self, slot: &str, value: Real) {
        match self.slots.get_mut(slot) {
            Some(existing) => *existing = value,
            None => {
                self.slots.insert(slot.to_owned(), value);
            }
        }
    }

    /// Value of a slot, if written.
    pub fn get(&self, slot: &str) -> Option<Real> {
        self.slots.get(slot).copied()
    }

    /// Every slot with its value, in name order.
    pub fn slots(&self) -> impl Iterator<Item = (&str, Real)> + '_ {
        self.slots.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// One device as seen in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceReading {
    pub id: DeviceId,
    pub position: Position,
    pub running: bool,
    pub rounds: u64,
    pub storage: Storage,
}

/// The whole network at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub time: Time,
    pub devices: Vec<DeviceReading>,
}

impl Snapshot {
    /// Aggregate one slot over the running devices that have it.
    pub fn summary(&self, slot: &str) -> Option<Summary> {
        Summary::of(
            self.devices
                .iter()
                .filter(|d| d.running)
                .filter_map(|d| d.storage.get(slot)),
        )
    }
}

/// Min, max and mean of a slot across devices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub min: Real,
    pub max: Real,
    pub mean: Real,
}

impl Summary {
    /// Aggregate `values`; `None` if there are none.
    pub fn of(values: impl IntoIterator<Item = Real>) -> Option<Self> {
        let mut count = 0usize;
        let mut min = Real::INFINITY;
        let mut max = Real::NEG_INFINITY;
        let mut sum = 0.0;
        for v in values {
            count += 1;
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }
        (count > 0).then(|| Self {
            count,
            min,
            max,
            mean: sum / count as Real,
        })
    }
}

/// One line of the periodic log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRow {
    pub time: Time,
    pub running: usize,
    pub slots: BTreeMap<String, Summary>,
}

impl LogRow {
    /// Summarize `slots` of a snapshot. Slots nobody has written are left out.
    pub fn from_snapshot(snapshot: &Snapshot, slots: &[&str]) -> Self {
        Self {
            time: snapshot.time,
            running: snapshot.devices.iter().filter(|d| d.running).count(),
            slots: slots
                .iter()
                .filter_map(|&slot| snapshot.summary(slot).map(|s| (slot.to_owned(), s)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(id: u64, running: bool, value: Real) -> DeviceReading {
        let mut storage = Storage::new();
        storage.set("d", value);
        DeviceReading {
            id: DeviceId(id),
            position: Position::ORIGIN,
            running,
            rounds: 1,
            storage,
        }
    }

    #[test]
    fn storage_overwrites() {
        let mut s = Storage::new();
        s.set("x", 1.0);
        s.set("x", 2.0);
        assert_eq!(s.get("x"), Some(2.0));
        assert_eq!(s.len(), 1);
        assert_eq!(s.get("y"), None);
    }

    #[test]
    fn summary_of_values() {
        let s = Summary::of([3.0, 1.0, 2.0]).unwrap();
        assert_eq!((s.count, s.min, s.max, s.mean), (3, 1.0, 3.0, 2.0));
        assert_eq!(Summary::of([]), None);
    }

    #[test]
    fn halted_devices_excluded() {
        let snapshot = Snapshot {
            time: 4.0,
            devices: vec![reading(1, true, 1.0), reading(2, false, 100.0), reading(3, true, 3.0)],
        };
        let s = snapshot.summary("d").unwrap();
        assert_eq!(s.max, 3.0);
        assert_eq!(s.count, 2);
        assert_eq!(snapshot.summary("missing"), None);
    }

    #[test]
    fn log_row_serializes_as_json_line() {
        let snapshot = Snapshot {
            time: 2.0,
            devices: vec![reading(1, true, 5.0)],
        };
        let row = LogRow::from_snapshot(&snapshot, &["d", "missing"]);
        assert_eq!(row.running, 1);
        assert_eq!(row.slots.len(), 1);

        let json = serde_json::to_string(&row).unwrap();
        assert!(!json.contains('\n'));
        let parsed: LogRow = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, row);
    }
}
