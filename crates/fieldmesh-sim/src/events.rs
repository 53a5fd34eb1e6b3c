//! Simulation events for the run log.

use fieldmesh_field::{DeviceId, Time};
use fieldmesh_topology::Position;
use serde::{Deserialize, Serialize};

/// Changes to the network made while a simulation runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// A device joined and scheduled its first round
    DeviceSpawned {
        device: DeviceId,
        position: Position,
        time: Time,
    },

    /// A device stopped running; its messages age out of inboxes
    DeviceHalted { device: DeviceId, time: Time },

    /// A device changed position
    DeviceMoved {
        device: DeviceId,
        from: Position,
        to: Position,
        time: Time,
    },

    /// An explicit link was added
    LinkAdded {
        a: DeviceId,
        b: DeviceId,
        length: f64,
        time: Time,
    },

    /// An explicit link was removed
    LinkRemoved { a: DeviceId, b: DeviceId, time: Time },
}

impl SimEvent {
    /// Simulation time the event happened at.
    pub fn time(&self) -> Time {
        match self {
            SimEvent::DeviceSpawned { time, .. } => *time,
            SimEvent::DeviceHalted { time, .. } => *time,
            SimEvent::DeviceMoved { time, .. } => *time,
            SimEvent::LinkAdded { time, .. } => *time,
            SimEvent::LinkRemoved { time, .. } => *time,
        }
    }

    /// Devices the event is about.
    pub fn devices(&self) -> Vec<DeviceId> {
        match self {
            SimEvent::DeviceSpawned { device, .. }
            | SimEvent::DeviceHalted { device, .. }
            | SimEvent::DeviceMoved { device, .. } => vec![*device],
            SimEvent::LinkAdded { a, b, .. } | SimEvent::LinkRemoved { a, b, .. } => vec![*a, *b],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization() {
        let event = SimEvent::DeviceMoved {
            device: DeviceId(3),
            from: Position::new(1.0, 2.0),
            to: Position::new(4.0, 6.0),
            time: 12.5,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"DeviceMoved\""));
        assert!(json.contains("\"device\":3"));

        let parsed: SimEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
        assert_eq!(parsed.time(), 12.5);
    }

    #[test]
    fn link_events_name_both_ends() {
        let event = SimEvent::LinkRemoved {
            a: DeviceId(1),
            b: DeviceId(2),
            time: 0.0,
        };
        assert_eq!(event.devices(), vec![DeviceId(1), DeviceId(2)]);
    }
}
